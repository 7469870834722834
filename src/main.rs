use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use std::process;

use vajra_validate::config::{Config, OutputFormat, USAGE};
use vajra_validate::logging::{log_fatal, log_run_summary};
use vajra_validate::report::{exit_code, render_json, render_text, EXIT_LOAD_FAILED, EXIT_OK};
use vajra_validate::{data, validate_loaded};

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            log_fatal(&format!("{:#}", err));
            eprintln!("vajra-validate: {:#}", err);
            process::exit(EXIT_LOAD_FAILED);
        }
    }
}

fn run() -> Result<i32> {
    let cfg = Config::from_env()
        .with_args(env::args().skip(1))
        .map_err(anyhow::Error::msg)
        .context("invalid arguments")?;
    if cfg.show_help {
        println!("{}", USAGE);
        return Ok(EXIT_OK);
    }

    let loaded = match &cfg.dataset_path {
        Some(path) => data::load_path(Path::new(path))?,
        None => data::builtin()?,
    };
    let report = validate_loaded(&loaded, &cfg.tolerances);

    let rendered = match cfg.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => render_json(&report)?,
    };
    println!("{}", rendered);

    let code = exit_code(&report, cfg.fail_on_warnings);
    log_run_summary(
        report.errors.len(),
        report.warnings.len(),
        report.schema_errors.len(),
        code,
    );
    Ok(code)
}
