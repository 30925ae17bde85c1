use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fabquote_config::{AppConfig, ConfigError};
use fabquote_engine::pricing::Selection;
use fabquote_frontend::QuoteRequest;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Sheet-metal part quoting from DXF drawings
#[derive(Parser, Debug)]
#[command(name = "fabquote", author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure a drawing and price it
    Quote {
        /// DXF file of the part
        file: PathBuf,
        /// Material label, e.g. "Mild Steel"
        #[arg(long)]
        material: Option<String>,
        /// Thickness label, e.g. 0.048"
        #[arg(long)]
        thickness: Option<String>,
        /// Finish label, e.g. "Powder Coat"
        #[arg(long)]
        finish: Option<String>,
        /// Additional service (repeatable)
        #[arg(long = "service")]
        services: Vec<String>,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
        /// Rate table (JSON or TOML), overrides the configured one
        #[arg(long)]
        rates: Option<PathBuf>,
        /// Write an SVG preview of the part
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the options offered by the rate table
    Rates {
        #[arg(long)]
        rates: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = load_configuration(cli.config.clone());
    init_logging(&config);
    info!("启动 fabquote");

    match cli.command {
        Command::Quote {
            file,
            material,
            thickness,
            finish,
            services,
            quantity,
            rates,
            svg,
            json,
        } => {
            let request = QuoteRequest {
                file,
                selection: Selection {
                    material,
                    thickness,
                    finish,
                    services: services.into_iter().collect::<BTreeSet<_>>(),
                    quantity,
                },
                rates,
                svg,
            };
            let report = match fabquote_frontend::run_quote(&config, &request) {
                Ok(report) => report,
                Err(err) => fail(&err),
            };
            if json {
                match report.to_json() {
                    Ok(text) => println!("{text}"),
                    Err(err) => fail(&err),
                }
            } else {
                print!("{}", report.render_text());
            }
        }
        Command::Rates { rates } => match fabquote_frontend::run_rates(&config, rates) {
            Ok(text) => println!("{text}"),
            Err(err) => fail(&err),
        },
    }
}

fn fail(err: &dyn std::error::Error) -> ! {
    error!(error = %err, "执行失败");
    eprintln!("error: {err}");
    std::process::exit(1);
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } | ConfigError::Invalid { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
