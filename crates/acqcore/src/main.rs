mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "acqcore", version, about = "Camera acquisition core CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "ACQCORE_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "ACQCORE_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "acqcore",
            "run",
            "--count",
            "10",
            "--interval",
            "50ms",
            "--stop-on-overflow",
        ])
        .expect("run args should parse");

        assert!(matches!(cli.command, Command::Run(_)));
    }

    #[test]
    fn rejects_count_with_continuous() {
        let err = Cli::try_parse_from(["acqcore", "run", "--count", "5", "--continuous"])
            .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_snap_subcommand() {
        let cli = Cli::try_parse_from(["acqcore", "snap", "--width", "32", "--height", "32"])
            .expect("snap args should parse");
        assert!(matches!(cli.command, Command::Snap(_)));
    }

    #[test]
    fn parses_info_subcommand() {
        let cli = Cli::try_parse_from(["acqcore", "info", "--footprint", "1048576"])
            .expect("info args should parse");
        assert!(matches!(cli.command, Command::Info(_)));
    }
}
