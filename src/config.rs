use std::time::Duration;

/// DoR 步骤失败时的处理策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DorFailurePolicy {
    /// 记录日志，不带附件继续提交
    Continue,
    /// 整个提交失败，不再调用远程接口
    Abort,
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 远程提交超时时间（秒）
    pub http_timeout_secs: u64,
    /// 请求的 User-Agent
    pub user_agent: String,
    /// 提交未指定语言时使用的默认语言
    pub default_locale: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 模板所在的内容根目录（FsResourceResolver 使用）
    pub content_root_dir: String,
    /// 外部渲染命令（CommandRenderer 使用）
    pub render_command: Option<String>,
    /// 单次渲染的超时时间（秒）
    pub render_timeout_secs: u64,
    /// DoR 失败时的处理策略
    pub dor_failure_policy: DorFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            user_agent: concat!("form-submit/", env!("CARGO_PKG_VERSION")).to_string(),
            default_locale: "en".to_string(),
            verbose_logging: false,
            content_root_dir: "content".to_string(),
            render_command: None,
            render_timeout_secs: 120,
            dor_failure_policy: DorFailurePolicy::Continue,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let strict_dor = std::env::var("SUBMIT_STRICT_DOR").ok().and_then(|v| v.parse::<bool>().ok()).unwrap_or(false);
        Self {
            http_timeout_secs: std::env::var("SUBMIT_HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.http_timeout_secs),
            user_agent: std::env::var("SUBMIT_USER_AGENT").unwrap_or(default.user_agent),
            default_locale: std::env::var("SUBMIT_DEFAULT_LOCALE").unwrap_or(default.default_locale),
            verbose_logging: std::env::var("SUBMIT_VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            content_root_dir: std::env::var("SUBMIT_CONTENT_ROOT_DIR").unwrap_or(default.content_root_dir),
            render_command: std::env::var("SUBMIT_RENDER_COMMAND").ok().filter(|v| !v.trim().is_empty()),
            render_timeout_secs: std::env::var("SUBMIT_RENDER_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_timeout_secs),
            dor_failure_policy: if strict_dor { DorFailurePolicy::Abort } else { DorFailurePolicy::Continue },
        }
    }

    /// 远程提交超时
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// 渲染超时
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }
}
