pub mod cli;
pub mod errors;
pub mod loader;
pub mod preview;

use std::fs;
use std::path::PathBuf;

use cli::{QuoteReport, dispatch_cli_command};
use errors::FrontendError;
use fabquote_config::AppConfig;
use fabquote_engine::{
    command::{CommandBus, CommandContext, CommandRequest},
    pricing::Selection,
    session::QuoteSession,
};
use loader::{QuotePipeline, load_rate_table};
use preview::{PreviewHost, PreviewOptions, PreviewScene};
use tracing::{info, warn};

/// 一次命令行报价请求。
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub file: PathBuf,
    pub selection: Selection,
    pub rates: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

/// 读取图纸、测量、报价；指定 `svg` 时同时输出预览。
pub fn run_quote(config: &AppConfig, request: &QuoteRequest) -> Result<QuoteReport, FrontendError> {
    let rates = load_rate_table(&config.pricing, request.rates.as_deref())?;
    let pipeline = QuotePipeline::from_config(config);
    let analysis = pipeline.analyze(&request.file)?;

    if let Some(svg_path) = &request.svg {
        let mut host = PreviewHost::new();
        let options = PreviewOptions::from_config(&config.preview);
        match PreviewScene::from_model(&analysis.model, &options) {
            Some(scene) => {
                host.show(analysis.file.display().to_string(), &scene);
                fs::write(svg_path, scene.to_svg()).map_err(|source| FrontendError::Output {
                    path: svg_path.clone(),
                    source,
                })?;
                info!(path = %svg_path.display(), "预览 SVG 已写出");
            }
            None => warn!(path = %svg_path.display(), "模型为空，未生成预览"),
        }
    }

    let quote = pipeline.quote(&rates, &request.selection);
    Ok(QuoteReport::new(&analysis, quote))
}

/// 列出价格表中可选的材料、厚度、表面处理与服务。
pub fn run_rates(config: &AppConfig, rates: Option<PathBuf>) -> Result<String, FrontendError> {
    let table = load_rate_table(&config.pricing, rates.as_deref())?;
    let session = QuoteSession::new();
    let bus = CommandBus::new();
    let context = CommandContext {
        session: &session,
        rates: Some(&table),
    };
    let request = CommandRequest::new("catalog", Vec::<String>::new());
    Ok(
        dispatch_cli_command(&bus, &request, &context).unwrap_or_else(|message| {
            warn!(message = %message, "catalog 命令失败");
            String::new()
        }),
    )
}
