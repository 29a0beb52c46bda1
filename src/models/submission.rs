use std::fmt::Display;

use crate::models::form_context::FormContext;

/// 一次表单提交
///
/// 只属于一次提交调用，不会被任何组件保留。
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// 原始表单数据（XML）
    pub data: String,
    /// 目标语言，如 `en`、`fr-CA`
    pub locale: String,
    pub form: FormContext,
}

impl SubmissionRequest {
    pub fn new(data: impl Into<String>, locale: impl Into<String>, form: FormContext) -> Self {
        Self {
            data: data.into(),
            locale: locale.into(),
            form,
        }
    }
}

impl Display for SubmissionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[表单 {} 语言 {}]", self.form.path, self.locale)
    }
}
