use crate::error::{AppError, AppResult};
use crate::models::form_context::FormContext;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载表单容器上下文
pub async fn load_form_context(toml_file_path: &Path) -> AppResult<FormContext> {
    let path_display = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_display, e))?;

    let context: FormContext =
        toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&path_display, e))?;

    tracing::debug!("已加载表单配置: {} ({})", context.path, path_display);

    Ok(context)
}
