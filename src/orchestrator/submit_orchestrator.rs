//! 表单提交编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **DoR 判断**：`dorType` 为 `select` 且模板存在时才渲染
//! 2. **DoR 生成**：数据处理 → PDF 渲染 → 生成附件
//! 3. **远程提交**：把数据和附件交给 SubmissionDispatcher
//! 4. **失败收敛**：保证每次调用都返回一个完整的 SubmissionResult

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::config::{Config, DorFailurePolicy};
use crate::error::AppResult;
use crate::infrastructure::{DorMerger, HttpTransport, ModelTransformer, Renderer, ResourceResolver};
use crate::models::{RenderedAttachment, SubmissionRequest, SubmissionResult};
use crate::services::{DocumentRenderer, DorDataProcessor, SubmissionDispatcher, TemplateResolver};
use crate::utils::locale::language_subtag;
use crate::utils::logging::truncate_text;

/// 外部协作方
///
/// 都是共享的只读服务，可被多个提交并发使用。
#[derive(Clone)]
pub struct Collaborators {
    pub resources: Arc<dyn ResourceResolver>,
    pub transformer: Arc<dyn ModelTransformer>,
    pub merger: Arc<dyn DorMerger>,
    pub renderer: Arc<dyn Renderer>,
    pub transport: Arc<dyn HttpTransport>,
}

/// 表单提交编排器
///
/// - 不保存任何提交相关的状态，可以在多个任务间共享
/// - 每次 `submit` 都返回一个新的结果，永远不会返回错误或 panic
pub struct SubmitOrchestrator {
    template_resolver: TemplateResolver,
    resources: Arc<dyn ResourceResolver>,
    processor: DorDataProcessor,
    renderer: DocumentRenderer,
    dispatcher: SubmissionDispatcher,
    default_locale: String,
    dor_failure_policy: DorFailurePolicy,
}

impl SubmitOrchestrator {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        Self {
            template_resolver: TemplateResolver::new(),
            resources: collaborators.resources,
            processor: DorDataProcessor::new(
                collaborators.transformer,
                collaborators.merger,
                config.default_locale.clone(),
            ),
            renderer: DocumentRenderer::new(collaborators.renderer),
            dispatcher: SubmissionDispatcher::new(collaborators.transport),
            default_locale: config.default_locale.clone(),
            dor_failure_policy: config.dor_failure_policy,
        }
    }

    /// 提交表单
    pub async fn submit(&self, request: &SubmissionRequest) -> SubmissionResult {
        info!("{} 📤 开始提交", request);
        debug!("{} 数据: {}", request, truncate_text(&request.data, 200));

        let outcome = AssertUnwindSafe(self.try_submit(request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    "{} 提交结束: formSubmissionComplete={}",
                    request, result.form_submission_complete
                );
                result
            }
            Ok(Err(e)) => {
                error!("{} ❌ 表单提交失败: {:?}", request, e);
                SubmissionResult::failed(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(&*panic);
                error!("{} ❌ 表单提交异常终止: {}", request, message);
                SubmissionResult::failed(message)
            }
        }
    }

    async fn try_submit(&self, request: &SubmissionRequest) -> AppResult<SubmissionResult> {
        let attachment = match self.prepare_dor(request).await {
            Ok(attachment) => attachment,
            Err(e) => match self.dor_failure_policy {
                DorFailurePolicy::Continue => {
                    warn!("{} ⚠️ DoR 生成失败，不带附件继续提交: {:?}", request, e);
                    None
                }
                DorFailurePolicy::Abort => return Err(e),
            },
        };

        Ok(self
            .dispatcher
            .dispatch(request.form.post_url(), &request.data, attachment.as_ref())
            .await)
    }

    /// 生成 DoR 附件；不需要或无法生成时返回 None
    async fn prepare_dor(
        &self,
        request: &SubmissionRequest,
    ) -> AppResult<Option<RenderedAttachment>> {
        let form = &request.form;
        if !form.dor_selected() {
            debug!("{} dorType={:?}，不生成 DoR", request, form.dor_type);
            return Ok(None);
        }

        let Some(template) = self.resolve_template(request) else {
            info!("{} 没有可用的 DoR 模板，跳过渲染", request);
            return Ok(None);
        };

        let merged = self
            .processor
            .process(&request.data, form, &request.locale)
            .await?;
        if merged.is_empty() {
            info!("{} 没有 DoR 数据，跳过渲染", request);
            return Ok(None);
        }

        let pdf = self.renderer.render(Some(template.as_str()), &merged).await?;
        Ok(pdf.map(|content| {
            let language = self.attachment_language(request);
            let attachment = RenderedAttachment::dor_pdf(&language, content);
            info!(
                "{} ✓ DoR 已生成: {} ({} 字节)",
                request,
                attachment.file_name,
                attachment.content.len()
            );
            attachment
        }))
    }

    fn resolve_template(&self, request: &SubmissionRequest) -> Option<String> {
        let default_ref = request.form.dor_template_ref()?;
        self.template_resolver.resolve(
            default_ref,
            &request.locale,
            request.form.base_locale().as_deref(),
            self.resources.as_ref(),
        )
    }

    fn attachment_language(&self, request: &SubmissionRequest) -> String {
        language_subtag(&request.locale)
            .or_else(|| language_subtag(&self.default_locale))
            .unwrap_or_else(|| "en".to_string())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic during submission".to_string()
    }
}
