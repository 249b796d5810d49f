//! # SVG Commander CLI
//!
//! Usage:
//!   svg-commander <command> [arguments]
//!   svg-commander within drawing.svg 0 0 100 100
//!   svg-commander --shell < commands.txt

use std::fs::File;
use std::io::{self, BufReader};
use std::process;

use clap::Parser;
use svg_commander::cli::CliConfig;
use svg_commander::logger;
use svg_commander::shell::{Session, USAGE};
use svg_commander::SvgError;

fn main() {
    let config = CliConfig::parse();
    logger::init_cli_logger(config.verbose);
    tracing::debug!(?config, "starting");

    match run(&config) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run(config: &CliConfig) -> Result<i32, SvgError> {
    if !config.is_scripted() && config.command.is_empty() {
        println!("{}", USAGE);
        return Ok(0);
    }

    let mut session = Session::new(config.settings(), io::stdout().lock());

    if config.is_scripted() {
        let report = |line: usize, e: &SvgError| eprintln!("Error (line {}): {}", line, e);
        let outcome = match &config.script {
            Some(path) => {
                let file = File::open(path).map_err(|e| SvgError::io(path, e))?;
                session.run_script(BufReader::new(file), report)?
            }
            None => session.run_script(io::stdin().lock(), report)?,
        };
        session.finish()?;
        return Ok(if outcome.failed > 0 { 1 } else { 0 });
    }

    // `exit` and a normal return both end the process with status 0.
    session.run_words(config.command.as_slice())?;
    session.finish()?;
    Ok(0)
}
