//! 表单模型导出

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::FormContext;

/// 片段嵌套的最大深度
const MAX_FRAGMENT_DEPTH: usize = 8;

/// 模型导出参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelExportOptions {
    pub form_container_path: String,
    pub include_fragment_json: bool,
    pub locale: String,
}

/// 表单模型导出能力
#[async_trait]
pub trait ModelTransformer: Send + Sync {
    async fn export_model(&self, form: &FormContext, options: &ModelExportOptions) -> Result<Value>;
}

/// 从本地 JSON 文件读取表单模型
///
/// - 优先读取 `<model>.<locale>.json`，不存在时读取 `<model>.json`
/// - `include_fragment_json` 为真时，带 `fragRef` 的节点会内联片段文件的 `:items`
/// - 表单未配置模型文件时返回空对象
pub struct FileModelTransformer {
    base_dir: PathBuf,
}

impl FileModelTransformer {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl ModelTransformer for FileModelTransformer {
    async fn export_model(
        &self,
        form: &FormContext,
        options: &ModelExportOptions,
    ) -> Result<Value> {
        let Some(model_file) = form.model_file.clone() else {
            debug!("表单 {} 未配置模型文件，使用空模型", options.form_container_path);
            return Ok(Value::Object(Map::new()));
        };

        let base_dir = self.base_dir.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || load_model(&base_dir, &model_file, &options))
            .await
            .context("模型加载任务异常退出")?
    }
}

fn load_model(base_dir: &Path, model_file: &str, options: &ModelExportOptions) -> Result<Value> {
    let default_path = base_dir.join(model_file.trim_start_matches('/'));
    let localized_path = if is_safe_locale(&options.locale) {
        Some(default_path.with_extension(format!("{}.json", options.locale)))
    } else {
        if !options.locale.is_empty() {
            warn!("忽略非法的语言代码: {:?}", options.locale);
        }
        None
    };

    let path = match localized_path {
        Some(localized) if localized.is_file() => localized,
        _ => default_path,
    };

    debug!("读取表单模型: {}", path.display());
    let mut model = read_json(&path)?;

    if options.include_fragment_json {
        inline_fragments(base_dir, &mut model, 0)?;
    }

    Ok(model)
}

/// 语言代码会拼进文件名，只允许字母、数字、`-` 和 `_`
fn is_safe_locale(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取模型文件: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("无法解析模型文件: {}", path.display()))
}

/// `depth` 只统计已经内联的片段层数
fn inline_fragments(base_dir: &Path, node: &mut Value, depth: usize) -> Result<()> {
    match node {
        Value::Object(map) => {
            let mut child_depth = depth;
            let frag_ref = map.get("fragRef").and_then(Value::as_str).map(str::to_string);
            if let (Some(frag_ref), false) = (frag_ref, map.contains_key(":items")) {
                if depth >= MAX_FRAGMENT_DEPTH {
                    anyhow::bail!("片段嵌套超过 {} 层: {}", MAX_FRAGMENT_DEPTH, frag_ref);
                }
                let path = base_dir.join(format!("{}.json", frag_ref.trim_start_matches('/')));
                let fragment = read_json(&path)?;
                if let Some(items) = fragment.get(":items") {
                    map.insert(":items".to_string(), items.clone());
                }
                child_depth += 1;
            }
            for value in map.values_mut() {
                inline_fragments(base_dir, value, child_depth)?;
            }
        }
        Value::Array(items) => {
            for value in items {
                inline_fragments(base_dir, value, depth)?;
            }
        }
        _ => {}
    }

    Ok(())
}
