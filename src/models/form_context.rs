//! 表单容器上下文
//!
//! 描述一个表单容器的提交配置：DoR 类型、DoR 模板、提交地址，
//! 以及父节点声明的默认语言。

use serde::{Deserialize, Serialize};

/// 未声明语言时的基础语言
pub const DEFAULT_BASE_LOCALE: &str = "en";

/// 触发 DoR 生成的 dorType 取值
pub const DOR_TYPE_SELECT: &str = "select";

/// 表单容器的父节点
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerParent {
    pub path: String,

    /// 父节点声明的语言（`jcr:language`）
    #[serde(rename = "jcr:language", default)]
    pub language: Option<String>,
}

/// 表单容器上下文
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContext {
    /// 表单容器路径，同时作为模型导出的参数
    pub path: String,

    #[serde(default)]
    pub dor_type: Option<String>,

    /// DoR 模板路径，可包含语言片段（如 `_en`）
    #[serde(default)]
    pub dor_template_ref: Option<String>,

    /// 远程提交地址
    #[serde(default)]
    pub post_url: Option<String>,

    /// 表单模型文件（FileModelTransformer 使用）
    #[serde(default)]
    pub model_file: Option<String>,

    #[serde(default)]
    pub parent: Option<ContainerParent>,
}

impl FormContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// 是否请求了 DoR 生成（`dorType` 忽略大小写等于 `select`）
    pub fn dor_selected(&self) -> bool {
        self.dor_type
            .as_deref()
            .map(|t| t.trim().eq_ignore_ascii_case(DOR_TYPE_SELECT))
            .unwrap_or(false)
    }

    /// 父节点声明的基础语言
    ///
    /// 没有父节点时返回 `None`；父节点未声明语言时为 `en`。
    pub fn base_locale(&self) -> Option<String> {
        let parent = self.parent.as_ref()?;
        let language = parent
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_BASE_LOCALE);
        Some(language.to_string())
    }

    /// 非空白的提交地址
    pub fn post_url(&self) -> Option<&str> {
        non_blank(self.post_url.as_deref())
    }

    /// 非空白的 DoR 模板路径
    pub fn dor_template_ref(&self) -> Option<&str> {
        non_blank(self.dor_template_ref.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
