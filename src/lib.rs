//! # Form Submit
//!
//! 表单提交流水线：按语言渲染 Document of Record (DoR) PDF，
//! 并把原始数据和 DoR 一起以 multipart POST 提交到配置的远程接口。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 外部协作方接口（资源存储、模型导出、数据合并、渲染、HTTP）
//! - 每个接口都有一个内置实现，编排器只依赖 trait
//!
//! ### ② 业务能力层（Services）
//! - `TemplateResolver` - 本地化模板解析
//! - `DorDataProcessor` - 提交数据 → DoR 合并文档
//! - `DocumentRenderer` - 合并文档 → PDF
//! - `SubmissionDispatcher` - multipart 提交与响应判断
//!
//! ### ③ 编排层（Orchestration）
//! - `SubmitOrchestrator` - 一次提交的完整流程，任何失败都收敛为提交结果
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::{Config, DorFailurePolicy};
pub use error::{AppError, AppResult};
pub use models::{FormContext, RenderedAttachment, SubmissionRequest, SubmissionResult};
pub use orchestrator::{Collaborators, SubmitOrchestrator};
