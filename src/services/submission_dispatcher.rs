//! 远程提交服务 - 业务能力层
//!
//! 组装 multipart 请求并根据响应状态生成提交结果。
//! 任何网络错误都在这里被吸收，不会向上抛出。

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::infrastructure::{HttpTransport, MultipartForm};
use crate::models::result::REQUEST_FAILED;
use crate::models::{RenderedAttachment, SubmissionResult};

/// 存储数据字段
pub const DATA_FIELD: &str = "data";
/// 数据文档字段，内容与 `data` 相同
pub const DATA_XML_FIELD: &str = "dataXml";
/// 附件字段
pub const ATTACHMENTS_FIELD: &str = "attachments";
/// 文本字段的 Content-Type，保证非英文数据不被破坏
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

const HTTP_OK: u16 = 200;

/// 远程提交服务
pub struct SubmissionDispatcher {
    transport: Arc<dyn HttpTransport>,
}

impl SubmissionDispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// 组装请求体
    ///
    /// 原始数据同时写入 `data` 和 `dataXml`，下游可能使用其中任意一个。
    pub fn build_form(data: &str, attachment: Option<&RenderedAttachment>) -> MultipartForm {
        let form = MultipartForm::new()
            .text(DATA_FIELD, data, TEXT_CONTENT_TYPE)
            .text(DATA_XML_FIELD, data, TEXT_CONTENT_TYPE);

        match attachment {
            Some(file) => form.file(
                ATTACHMENTS_FIELD,
                &file.file_name,
                file.content.clone(),
                &format!("{}; charset=UTF-8", file.content_type),
            ),
            None => form,
        }
    }

    /// 提交到远程接口
    ///
    /// # 参数
    /// - `post_url`: 提交地址，空表示不需要远程提交
    /// - `data`: 原始表单数据
    /// - `attachment`: DoR 附件
    pub async fn dispatch(
        &self,
        post_url: Option<&str>,
        data: &str,
        attachment: Option<&RenderedAttachment>,
    ) -> SubmissionResult {
        let Some(url) = post_url.map(str::trim).filter(|u| !u.is_empty()) else {
            debug!("[Submit] 未配置提交地址，跳过远程提交");
            return SubmissionResult::complete();
        };

        if attachment.is_none() {
            debug!("[Submit] 没有 DoR 附件: {}", url);
        }
        let form = Self::build_form(data, attachment);

        match self.transport.post_multipart(url, form).await {
            Ok(HTTP_OK) => {
                info!("✓ [Submit] 提交成功: {}", url);
                SubmissionResult::complete()
            }
            Ok(status) => {
                warn!("⚠️ [Submit] 提交失败: {} 返回 {}", url, status);
                SubmissionResult::failed(REQUEST_FAILED)
            }
            Err(e) => {
                error!("❌ [Submit] 远程调用失败 {}: {:?}", url, e);
                SubmissionResult::failed(format!("{}: {}", REQUEST_FAILED, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 固定返回状态码的通道
    struct StubTransport {
        status: u16,
        fail: bool,
        sent: Mutex<Vec<(String, MultipartForm)>>,
    }

    impl StubTransport {
        fn returning(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                fail: false,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn post_multipart(&self, url: &str, form: MultipartForm) -> anyhow::Result<u16> {
            self.sent.lock().unwrap().push((url.to_string(), form));
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok(self.status)
        }
    }

    #[tokio::test]
    async fn test_blank_url_is_complete_without_call() {
        let transport = StubTransport::returning(500);
        let dispatcher = SubmissionDispatcher::new(transport.clone());

        assert!(dispatcher.dispatch(None, "<data/>", None).await.is_complete());
        assert!(dispatcher.dispatch(Some("  "), "<data/>", None).await.is_complete());
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ok_status() {
        let transport = StubTransport::returning(200);
        let result = SubmissionDispatcher::new(transport)
            .dispatch(Some("https://example.org/submit"), "<data/>", None)
            .await;

        assert_eq!(result, SubmissionResult::complete());
    }

    #[tokio::test]
    async fn test_non_ok_status() {
        for status in [201, 404, 503] {
            let transport = StubTransport::returning(status);
            let result = SubmissionDispatcher::new(transport)
                .dispatch(Some("https://example.org/submit"), "<data/>", None)
                .await;

            assert!(!result.form_submission_complete);
            assert_eq!(result.error.as_deref(), Some("request failed"));
        }
    }

    #[tokio::test]
    async fn test_network_error_is_contained() {
        let transport = Arc::new(StubTransport {
            status: 200,
            fail: true,
            sent: Mutex::new(Vec::new()),
        });
        let result = SubmissionDispatcher::new(transport)
            .dispatch(Some("https://example.org/submit"), "<data/>", None)
            .await;

        assert!(!result.form_submission_complete);
        assert!(result.error.unwrap().starts_with("request failed"));
    }

    #[test]
    fn test_form_fields() {
        let data = "<data><naam>Zoë</naam></data>";
        let pdf = RenderedAttachment::dor_pdf("af", b"%PDF".to_vec());
        let form = SubmissionDispatcher::build_form(data, Some(&pdf));

        assert_eq!(form.part(DATA_FIELD).unwrap().content, data.as_bytes());
        assert_eq!(form.part(DATA_XML_FIELD).unwrap().content, data.as_bytes());
        assert_eq!(form.part(DATA_FIELD).unwrap().content_type, TEXT_CONTENT_TYPE);

        let attachment = form.part(ATTACHMENTS_FIELD).unwrap();
        assert_eq!(attachment.file_name.as_deref(), Some("dor_af.pdf"));
        assert_eq!(attachment.content_type, "application/pdf; charset=UTF-8");
        assert_eq!(attachment.content, b"%PDF".to_vec());
    }

    #[test]
    fn test_form_without_attachment() {
        let form = SubmissionDispatcher::build_form("", None);
        assert_eq!(form.parts.len(), 2);
        assert!(form.part(ATTACHMENTS_FIELD).is_none());
    }
}
