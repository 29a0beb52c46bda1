//! DoR 数据处理服务 - 业务能力层
//!
//! 把提交的 XML 数据转换成渲染用的合并文档。解析、模型导出、合并中的
//! 任何错误都直接返回给调用方，由编排层决定如何处理。

use std::sync::Arc;

use roxmltree::{Document, ParsingOptions};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::{DorMerger, MergeDocument, ModelExportOptions, ModelTransformer};
use crate::models::FormContext;

/// 解析不可信的提交数据
///
/// 不允许 DTD，因此不会解析任何外部实体。
pub fn parse_untrusted_xml(data: &str) -> AppResult<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: false,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(data, options)?)
}

/// DoR 数据处理服务
pub struct DorDataProcessor {
    transformer: Arc<dyn ModelTransformer>,
    merger: Arc<dyn DorMerger>,
    default_locale: String,
}

impl DorDataProcessor {
    pub fn new(
        transformer: Arc<dyn ModelTransformer>,
        merger: Arc<dyn DorMerger>,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            transformer,
            merger,
            default_locale: default_locale.into(),
        }
    }

    /// 生成合并文档
    ///
    /// # 参数
    /// - `data`: 原始提交数据（XML）
    /// - `form`: 表单容器上下文
    /// - `locale`: 提交语言，空白时使用默认语言
    ///
    /// # 返回
    /// 合并后的 XML；数据为空时返回空字符串
    pub async fn process(&self, data: &str, form: &FormContext, locale: &str) -> AppResult<String> {
        if data.trim().is_empty() {
            warn!("[Submit] DoR 处理收到空数据 ({})", form.path);
            return Ok(String::new());
        }

        let source = parse_untrusted_xml(data)?;
        let destination = MergeDocument::new();

        let options = ModelExportOptions {
            form_container_path: form.path.clone(),
            include_fragment_json: true,
            locale: self.effective_locale(locale),
        };
        debug!("[Submit] 导出表单模型: {:?}", options);

        let model = self
            .transformer
            .export_model(form, &options)
            .await
            .map_err(|e| AppError::model_export_failed(&form.path, e))?;

        self.merger
            .merge(destination, &source, &model)
            .map_err(AppError::merge_failed)
    }

    fn effective_locale(&self, locale: &str) -> String {
        let locale = locale.trim();
        if locale.is_empty() {
            self.default_locale.clone()
        } else {
            locale.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::BoundDataMerger;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// 记录调用参数的模型导出
    #[derive(Default)]
    struct RecordingTransformer {
        calls: Mutex<Vec<ModelExportOptions>>,
        fail: bool,
    }

    #[async_trait]
    impl ModelTransformer for RecordingTransformer {
        async fn export_model(
            &self,
            _form: &FormContext,
            options: &ModelExportOptions,
        ) -> anyhow::Result<Value> {
            self.calls.lock().unwrap().push(options.clone());
            if self.fail {
                anyhow::bail!("transformer offline");
            }
            Ok(json!({}))
        }
    }

    fn processor(transformer: Arc<RecordingTransformer>) -> DorDataProcessor {
        DorDataProcessor::new(transformer, Arc::new(BoundDataMerger), "en")
    }

    fn form() -> FormContext {
        FormContext::new("/content/forms/af/sample/jcr:content/guideContainer")
    }

    #[tokio::test]
    async fn test_blank_data_returns_empty() {
        let transformer = Arc::new(RecordingTransformer::default());
        let merged = processor(transformer.clone()).process("  ", &form(), "en").await.unwrap();

        assert!(merged.is_empty());
        assert!(transformer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_options() {
        let transformer = Arc::new(RecordingTransformer::default());
        let processor = processor(transformer.clone());

        processor.process("<data/>", &form(), "fr-CA").await.unwrap();
        processor.process("<data/>", &form(), "").await.unwrap();

        let calls = transformer.calls.lock().unwrap();
        assert_eq!(calls[0].locale, "fr-CA");
        assert!(calls[0].include_fragment_json);
        assert_eq!(
            calls[0].form_container_path,
            "/content/forms/af/sample/jcr:content/guideContainer"
        );
        assert_eq!(calls[1].locale, "en");
    }

    #[tokio::test]
    async fn test_merges_data() {
        let transformer = Arc::new(RecordingTransformer::default());
        let merged = processor(transformer)
            .process("<data><name>Thandi</name></data>", &form(), "en")
            .await
            .unwrap();

        assert!(merged.contains("<name>Thandi</name>"));
    }

    #[tokio::test]
    async fn test_malformed_xml_propagates() {
        let transformer = Arc::new(RecordingTransformer::default());
        let result = processor(transformer.clone()).process("<data>", &form(), "en").await;

        assert!(matches!(result, Err(AppError::Xml(_))));
        assert!(transformer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_external_entities_are_rejected() {
        let xxe = r#"<?xml version="1.0"?>
<!DOCTYPE data [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<data>&xxe;</data>"#;
        let transformer = Arc::new(RecordingTransformer::default());
        let result = processor(transformer).process(xxe, &form(), "en").await;

        assert!(matches!(result, Err(AppError::Xml(_))));
    }

    #[tokio::test]
    async fn test_transformer_failure_propagates() {
        let transformer = Arc::new(RecordingTransformer {
            fail: true,
            ..Default::default()
        });
        let result = processor(transformer).process("<data/>", &form(), "en").await;

        assert!(matches!(result, Err(AppError::Dor(_))));
    }
}
