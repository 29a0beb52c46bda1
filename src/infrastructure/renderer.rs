//! PDF 渲染能力

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// 默认渲染超时
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(120);

/// 渲染参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// 模板内相对引用的解析根
    pub content_root: String,
}

/// 模板 + 数据 → PDF
#[async_trait]
pub trait Renderer: Send + Sync {
    /// 没有输出时返回 `Ok(None)`
    async fn render(
        &self,
        template: &str,
        data: &[u8],
        options: &RenderOptions,
    ) -> Result<Option<Vec<u8>>>;
}

/// 调用外部渲染命令
///
/// 命令行追加 `--content-root <root> --template <template>`，
/// 数据 XML 从 stdin 传入，PDF 从 stdout 读取。
/// 写入 stdin 与读取输出同时进行；超时后子进程会被杀掉。
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    /// 按空白拆分命令行，例如 `"render-pdf --flatten"`
    pub fn new(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout: DEFAULT_RENDER_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn render(
        &self,
        template: &str,
        data: &[u8],
        options: &RenderOptions,
    ) -> Result<Option<Vec<u8>>> {
        debug!("调用渲染命令: {} (模板: {})", self.program, template);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--content-root")
            .arg(&options.content_root)
            .arg("--template")
            .arg(template)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("无法启动渲染命令: {}", self.program))?;

        let mut stdin = child.stdin.take().context("无法获取渲染命令的 stdin")?;
        let feed = async move {
            let written = stdin.write_all(data).await;
            // 关闭 stdin，渲染命令才能读到 EOF
            drop(stdin);
            written
        };

        // child 在超时后随 future 一起被 drop，kill_on_drop 负责杀掉进程
        let (written, output) = tokio::time::timeout(self.timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| anyhow::anyhow!("渲染命令超时 ({:?}): {}", self.timeout, self.program))?;

        let output = output.context("等待渲染命令失败")?;

        if !output.status.success() {
            anyhow::bail!(
                "渲染命令退出码 {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        match written {
            Ok(()) => {}
            // 命令没有读完输入就正常退出，以它的输出为准
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                warn!("渲染命令未读取全部输入: {}", self.program);
            }
            Err(e) => return Err(e).context("写入渲染数据失败"),
        }

        if output.stdout.is_empty() {
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }
}

/// 未配置渲染命令时使用，总是没有输出
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(
        &self,
        template: &str,
        _data: &[u8],
        _options: &RenderOptions,
    ) -> Result<Option<Vec<u8>>> {
        debug!("未配置渲染命令，跳过 {}", template);
        Ok(None)
    }
}
