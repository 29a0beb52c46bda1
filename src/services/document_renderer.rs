//! DoR 渲染服务 - 业务能力层

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::infrastructure::{RenderOptions, Renderer};

/// 内容根的协议前缀
pub const CONTENT_ROOT_PROTOCOL: &str = "crx://";

const TEMPLATE_EXTENSION: &str = ".xdp";

/// 由模板路径推导内容根
///
/// 去掉 `.xdp` 扩展名后取父路径：
/// `/content/dam/forms/tpl_en.xdp` → `crx:///content/dam/forms`
pub fn content_root(template_ref: &str) -> String {
    let without_ext = template_ref
        .rsplit_once(TEMPLATE_EXTENSION)
        .map(|(head, _)| head)
        .unwrap_or(template_ref);
    let parent = without_ext
        .rfind('/')
        .map(|idx| &without_ext[..idx])
        .unwrap_or("");
    format!("{}{}", CONTENT_ROOT_PROTOCOL, parent)
}

/// DoR 渲染服务
pub struct DocumentRenderer {
    renderer: Arc<dyn Renderer>,
}

impl DocumentRenderer {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }

    /// 渲染 PDF
    ///
    /// # 返回
    /// - `Ok(Some(bytes))`: 渲染成功
    /// - `Ok(None)`: 没有模板，或渲染器没有输出
    /// - `Err(_)`: 渲染器出错
    pub async fn render(
        &self,
        template_ref: Option<&str>,
        merged_xml: &str,
    ) -> AppResult<Option<Vec<u8>>> {
        let Some(template_ref) = template_ref.filter(|t| !t.trim().is_empty()) else {
            error!("[Submit] 没有 XDP 模板");
            return Ok(None);
        };

        let options = RenderOptions {
            content_root: content_root(template_ref),
        };
        debug!("[Submit] 渲染 {} (内容根: {})", template_ref, options.content_root);

        let rendered = self
            .renderer
            .render(template_ref, merged_xml.as_bytes(), &options)
            .await
            .map_err(|e| AppError::render_failed(template_ref, e))?;

        match rendered {
            Some(pdf) if !pdf.is_empty() => Ok(Some(pdf)),
            _ => {
                error!("[Submit] PDF 渲染失败: {} 没有输出", template_ref);
                Ok(None)
            }
        }
    }
}
