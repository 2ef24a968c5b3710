use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dxf2mod_config::{AppConfig, ConfigError};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod convert;
mod errors;

use convert::ConvertSettings;

/// 把 DXF 中的线段与圆弧拼接为闭合多边形，输出 KiCad 封装（.kicad_mod）。
#[derive(Debug, Parser)]
#[command(name = "dxf2mod", version)]
struct Cli {
    /// 输入的 DXF 文件
    input: PathBuf,
    /// 配置文件路径，缺省时按 DXF2MOD_CONFIG 或 ./config/default.toml 查找
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 端点相接容差，覆盖配置文件
    #[arg(long)]
    tolerance: Option<f64>,
    /// 多个图元交于同一点时按输入顺序取第一个，而不是报错
    #[arg(long)]
    allow_ambiguous_junctions: bool,
    /// 封装名称，覆盖配置文件
    #[arg(long)]
    module_name: Option<String>,
    /// 输出文件，缺省写到标准输出
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_error) = load_configuration(cli.config.clone());
    init_logging(&config);
    if let Some(err) = config_error {
        warn!(error = %err, "加载配置失败，使用内建默认值");
    }
    info!(input = %cli.input.display(), "启动 dxf2mod");

    let settings = apply_overrides(ConvertSettings::from_config(&config), &cli);
    match convert::run(&cli.input, cli.output.as_deref(), &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "转换失败");
            eprintln!("错误: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> (AppConfig, Option<ConfigError>) {
    let loaded = match override_path {
        Some(path) => AppConfig::from_file(&path),
        None => AppConfig::discover(),
    };
    match loaded {
        Ok(cfg) => (cfg, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

fn apply_overrides(mut settings: ConvertSettings, cli: &Cli) -> ConvertSettings {
    if let Some(tolerance) = cli.tolerance {
        settings.stitch.tolerance = tolerance;
    }
    if cli.allow_ambiguous_junctions {
        settings.stitch.reject_ambiguous_junctions = false;
    }
    if let Some(name) = &cli.module_name {
        settings.output.module_name = name.clone();
    }
    settings
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    // 标准输出留给封装文本
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
