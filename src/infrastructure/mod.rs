//! 基础设施层（Infrastructure）
//!
//! 外部协作方的能力接口及内置实现。流水线只通过这些 trait 访问外部系统，
//! 所有实现都必须可以被并发调用。
//!
//! - `ResourceResolver` - 模板是否存在
//! - `ModelTransformer` - 导出表单结构模型
//! - `DorMerger` - 把提交数据合并为 DoR 数据文档
//! - `Renderer` - 模板 + 数据 → PDF
//! - `HttpTransport` - multipart POST

pub mod merger;
pub mod model_transformer;
pub mod renderer;
pub mod resource_resolver;
pub mod transport;

pub use merger::{BoundDataMerger, DorMerger, MergeDocument};
pub use model_transformer::{FileModelTransformer, ModelExportOptions, ModelTransformer};
pub use renderer::{CommandRenderer, NoopRenderer, RenderOptions, Renderer};
pub use resource_resolver::{FsResourceResolver, MemoryResourceResolver, ResourceResolver};
pub use transport::{FormPart, HttpTransport, MultipartForm, ReqwestTransport};
