//! Flowprompt CLI library
//!
//! This module contains the core CLI logic for the flowprompt tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};
pub use error_adapter::ErrorAdapter;

use std::{
    fs,
    io::{self, Write},
};

use log::info;

use flowprompt::{FlowError, PromptBuilder};

/// Run the flowprompt CLI application
///
/// This function loads the input snapshot, produces the requested output
/// format and writes it to the output file, or to standard output when no
/// output path is given.
///
/// # Errors
///
/// Returns `FlowError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed snapshots
/// - Compiling an empty flowchart
pub fn run(args: &Args) -> Result<(), FlowError> {
    info!(
        input_path = args.input,
        output_path:? = args.output,
        format:? = args.format;
        "Processing flowchart"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let json = fs::read_to_string(&args.input)?;

    let builder = PromptBuilder::new(app_config);
    let store = builder.load(&json)?;
    let output = match args.format {
        OutputFormat::Prompt => builder.compile(&store)?,
        OutputFormat::Svg => builder.render_svg(&store)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            info!(output_file:% = path; "Output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{output}")?;
            stdout.flush()?;
        }
    }

    Ok(())
}
