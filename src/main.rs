//! 通用字符浏览器 - 命令行入口
//!
//! Usage:
//!   char-viewer [OPTIONS] <FILE>
//!
//! 解码后的文本输出到 stdout，状态栏信息与日志输出到 stderr。

use char_viewer::{AppError, EncodingChoice, EncodingStatus, FollowSession, ViewerConfig};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    path: PathBuf,
    encoding: Option<String>,
    follow: bool,
    config: Option<PathBuf>,
    json: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Run(CliArgs),
    Help,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args)? {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Run(cli) => cli,
    };

    let config = ViewerConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    info!("Char Viewer v{} - starting", env!("CARGO_PKG_VERSION"));

    let choice: EncodingChoice = match cli.encoding.as_deref() {
        Some(label) => label.parse()?,
        None => config.default_choice()?,
    };

    let resolver = Arc::new(config.build_resolver());
    let (mut session, result) = FollowSession::open(&cli.path, resolver, choice)?;

    write_text(&result.text)?;
    eprintln!("{}", EncodingStatus::from(&result));
    if cli.json {
        eprintln!("{}", serde_json::to_string(&result).map_err(AppError::from)?);
    }

    if !cli.follow {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(config.poll_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        file = %session.path().display(),
        interval_ms = config.poll_interval_ms,
        "Following file"
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(text) = session.poll()? {
                    write_text(&text)?;
                }
            }
            _ = &mut shutdown => {
                info!(offset = session.offset(), "Stopping follow mode");
                break;
            }
        }
    }

    Ok(())
}

/// 初始化日志：优先使用 `RUST_LOG`，否则使用配置中的级别
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_text(text: &str) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Command, AppError> {
    let mut cli = CliArgs::default();
    let mut path: Option<PathBuf> = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => return Ok(Command::Help),
            "-f" | "--follow" => cli.follow = true,
            "--json" => cli.json = true,
            "-e" | "--encoding" => {
                let value = iter
                    .next()
                    .ok_or_else(|| AppError::validation_error("--encoding requires a value"))?;
                cli.encoding = Some(value.clone());
            }
            "-c" | "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| AppError::validation_error("--config requires a value"))?;
                cli.config = Some(PathBuf::from(value));
            }
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(AppError::validation_error(format!("Unknown option: {}", other)));
            }
            other => {
                if path.is_some() {
                    return Err(AppError::validation_error(format!(
                        "Unexpected argument: {}",
                        other
                    )));
                }
                path = Some(PathBuf::from(other));
            }
        }
    }

    cli.path = path.ok_or_else(|| AppError::validation_error("Missing <FILE> argument"))?;
    Ok(Command::Run(cli))
}

fn print_usage() {
    eprintln!(
        r#"Char Viewer - encoding-aware text and log viewer

USAGE:
    char-viewer [OPTIONS] <FILE>

OPTIONS:
    -e, --encoding <NAME>   Encoding choice: auto, utf-8, utf-8-sig, gbk, gb18030, cp936,
                            big5, shift_jis, cp949, utf-16, utf-16-le, utf-16-be, latin1
    -f, --follow            Keep printing content appended to the file (Ctrl-C to stop)
    -c, --config <FILE>     TOML configuration file
        --json              Print resolution details as JSON to stderr
    -h, --help              Print this help

ENVIRONMENT:
    RUST_LOG                Log filter (overrides log_level)
    CHAR_VIEWER_*           Overrides any configuration key, e.g. CHAR_VIEWER_SAMPLE_SIZE=8192"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let command = parse_args(&args(&["-e", "gbk", "--follow", "-c", "viewer.toml", "app.log"]))
            .unwrap();
        assert_eq!(
            command,
            Command::Run(CliArgs {
                path: PathBuf::from("app.log"),
                encoding: Some("gbk".to_string()),
                follow: true,
                config: Some(PathBuf::from("viewer.toml")),
                json: false,
            })
        );
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--encoding"])).is_err());
        assert!(parse_args(&args(&["--bogus", "a.log"])).is_err());
        assert!(parse_args(&args(&["a.log", "b.log"])).is_err());
    }
}
