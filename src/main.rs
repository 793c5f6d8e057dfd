use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use opstd::{
    build_schema, check, render_env, render_failure, render_summary, render_tiers, tier_listing,
    CheckOutcome, CliSettings, PrintFormat, SettingsOverrides,
};
use opstd_env_validator::{ProcessEnv, ValidatedEnv};
use opstd_logger::{init_subscriber, Logger, LoggerConfig};

const SERVICE_NAME: &str = "opstd-env";

/// OPSTD 环境变量校验工具
#[derive(Parser, Debug)]
#[command(name = "opstd-env")]
#[command(version)]
#[command(about = "OPSTD 环境变量加载与校验工具")]
#[command(long_about = "按优先级加载 .env 分层文件，按 schema 校验并输出最终配置")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径 (默认读取当前目录下的 opstd-env.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 基础 .env 文件路径
    #[arg(long, value_name = "PATH")]
    env_path: Option<PathBuf>,

    /// 服务变量前缀, 例如 AUTH_
    #[arg(long, value_name = "PREFIX")]
    service_prefix: Option<String>,

    /// 运行模式 (development, production, test, staging)
    #[arg(long, value_name = "MODE")]
    app_mode: Option<String>,

    /// 输出调试日志
    #[arg(long)]
    debug: bool,

    /// 日志级别
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// 日志格式 (json, pretty, compact)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 校验环境变量
    Check(SchemaArgs),
    /// 输出校验后的环境变量
    Print {
        #[command(flatten)]
        schema: SchemaArgs,
        /// 输出格式
        #[arg(short, long, value_enum, default_value_t = PrintFormat::Dotenv)]
        format: PrintFormat,
    },
    /// 列出分层 .env 文件
    Files,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// 启用数据库连接 schema
    #[arg(long)]
    database: bool,

    /// 必填的变量名, 可重复
    #[arg(short, long = "require", value_name = "KEY")]
    require: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            env_path: self.env_path.clone(),
            service_prefix: self.service_prefix.clone(),
            app_mode: self.app_mode.clone(),
            debug: self.debug,
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = CliSettings::load(cli.config.as_deref(), &cli.overrides())
        .context("加载配置失败")?;

    // 初始化日志系统
    let mut log_level = settings.parsed_log_level()?;
    if settings.debug {
        log_level = log_level.min(opstd_logger::LogLevel::Debug);
    }
    let logger_config = LoggerConfig::new(SERVICE_NAME, "development").with_level(log_level);
    init_subscriber(&logger_config, settings.parsed_log_format()?)
        .context("初始化日志系统失败")?;

    debug!("配置: {settings:?}");
    let options = settings.validator_options()?;

    match cli.command {
        Commands::Check(args) => {
            let schema = build_schema(args.database, &args.require);
            match check(ProcessEnv, schema, options)? {
                CheckOutcome::Passed { env, load } => {
                    announce(&env, log_level);
                    println!("{}", render_summary(&env, &load));
                    Ok(ExitCode::SUCCESS)
                }
                CheckOutcome::Failed(error) => {
                    eprintln!("{}", render_failure(&error));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Print { schema, format } => {
            let extension = build_schema(schema.database, &schema.require);
            match check(ProcessEnv, extension, options)? {
                CheckOutcome::Passed { env, .. } => {
                    println!("{}", render_env(&env, format)?);
                    Ok(ExitCode::SUCCESS)
                }
                CheckOutcome::Failed(error) => {
                    eprintln!("{}", render_failure(&error));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Files => {
            println!("{}", render_tiers(&tier_listing(&ProcessEnv, &options)));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log the validated service identity through the service logger
fn announce(env: &ValidatedEnv, log_level: opstd_logger::LogLevel) {
    let service = env.app_name().unwrap_or(SERVICE_NAME);
    let environment = env.get_str("NODE_ENV").unwrap_or("development");
    let logger = Logger::new(LoggerConfig::new(service, environment).with_level(log_level));
    logger.info("环境变量校验通过");
    info!(keys = env.len(), "校验完成");
}
