use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use form_submit::error::ConfigError;
use form_submit::infrastructure::{
    BoundDataMerger, CommandRenderer, FileModelTransformer, FsResourceResolver, NoopRenderer,
    Renderer, ReqwestTransport,
};
use form_submit::models::load_form_context;
use form_submit::utils::logging;
use form_submit::{AppError, Collaborators, Config, SubmissionRequest, SubmitOrchestrator};
use tracing::warn;

/// 用法: form-submit <表单配置.toml> <数据.xml> [语言]
#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(&config);
    logging::log_startup(&config);

    let mut args = std::env::args().skip(1);
    let form_file = args.next().ok_or_else(|| missing("表单配置文件"))?;
    let data_file = args.next().ok_or_else(|| missing("数据文件"))?;
    let locale = args.next().unwrap_or_else(|| config.default_locale.clone());

    let form = load_form_context(Path::new(&form_file)).await?;
    let data = tokio::fs::read_to_string(&data_file)
        .await
        .with_context(|| format!("无法读取数据文件: {}", data_file))?;

    let model_dir = Path::new(&form_file)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let orchestrator = SubmitOrchestrator::new(&config, collaborators(&config, model_dir));

    let result = orchestrator
        .submit(&SubmissionRequest::new(data, locale, form))
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}

fn collaborators(config: &Config, model_dir: std::path::PathBuf) -> Collaborators {
    let renderer: Arc<dyn Renderer> = match config
        .render_command
        .as_deref()
        .and_then(CommandRenderer::new)
    {
        Some(command) => Arc::new(command.with_timeout(config.render_timeout())),
        None => {
            warn!("⚠️ 未配置 SUBMIT_RENDER_COMMAND，不会生成 DoR");
            Arc::new(NoopRenderer)
        }
    };

    Collaborators {
        resources: Arc::new(FsResourceResolver::new(&config.content_root_dir)),
        transformer: Arc::new(FileModelTransformer::new(model_dir)),
        merger: Arc::new(BoundDataMerger),
        renderer,
        transport: Arc::new(ReqwestTransport::new(config)),
    }
}

fn missing(name: &str) -> AppError {
    AppError::Config(ConfigError::Missing {
        name: name.to_string(),
    })
}
