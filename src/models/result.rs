//! 提交结果
//!
//! 对外边界上的键名保持不变：`formSubmissionComplete` 与 `error`。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 远程接口返回非 200 时的错误信息
pub const REQUEST_FAILED: &str = "request failed";

/// 提交结果，每次调用新建
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(rename = "formSubmissionComplete")]
    pub form_submission_complete: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResult {
    pub fn complete() -> Self {
        Self {
            form_submission_complete: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            form_submission_complete: false,
            error: Some(error.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.form_submission_complete
    }

    /// 以键值对的形式返回
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "formSubmissionComplete".to_string(),
            Value::Bool(self.form_submission_complete),
        );
        if let Some(error) = &self.error {
            map.insert("error".to_string(), Value::String(error.clone()));
        }
        map
    }
}
