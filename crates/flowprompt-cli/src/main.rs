//! Flowprompt CLI entry point.

use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use miette::{Diagnostic, GraphicalReportHandler};

use flowprompt::FlowError;
use flowprompt_cli::{Args, ErrorAdapter};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(args:?; "Parsed arguments");

    match flowprompt_cli::run(&args) {
        Ok(()) => {
            info!(input = args.input; "Finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", render_report(&err));
            ExitCode::FAILURE
        }
    }
}

/// Sets up `env_logger`, honoring `RUST_LOG` on top of `--log-level`.
fn init_logging(requested: &str) {
    let (level, rejected) = match LevelFilter::from_str(requested) {
        Ok(level) => (level, false),
        Err(_) => (LevelFilter::Warn, true),
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_env(env_logger::Env::default())
        .init();

    if rejected {
        warn!(requested; "Unknown log level, using warn");
    }
}

/// Diagnostic text for a failed run; plain `Display` if miette cannot render.
fn render_report(err: &FlowError) -> String {
    let adapter = ErrorAdapter(err);
    let mut report = String::new();
    match GraphicalReportHandler::new().render_report(&mut report, &adapter) {
        Ok(()) => report,
        Err(_) => match adapter.code() {
            Some(code) => format!("{code}: {err}"),
            None => err.to_string(),
        },
    }
}
