//! Command-line configuration.
//!
//! Options come before the command words; everything from the first
//! command word on is passed through untouched so negative offsets such as
//! `translate a.svg logo -5 0` survive.

use std::path::PathBuf;

use clap::Parser;

use crate::shell::Settings;

#[derive(Debug, Clone, Parser)]
#[command(name = "svg-commander", version)]
#[command(about = "Open, edit and query SVG drawings from the command line")]
pub struct CliConfig {
    /// Enable debug logging
    #[arg(short, long, env = "SVG_COMMANDER_VERBOSE")]
    pub verbose: bool,

    /// Print region query results as JSON
    #[arg(long, env = "SVG_COMMANDER_JSON")]
    pub json: bool,

    /// Decimal places for coordinates written by translate
    #[arg(
        long,
        default_value_t = 3,
        env = "SVG_COMMANDER_PRECISION",
        value_parser = clap::value_parser!(u8).range(0..=12)
    )]
    pub precision: u8,

    /// Leave modified documents unsaved unless `save` is given
    #[arg(long)]
    pub no_autosave: bool,

    /// Read commands line by line from standard input
    #[arg(long, conflicts_with = "script")]
    pub shell: bool,

    /// Read commands line by line from a file
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Command and its arguments, e.g. `within drawing.svg 0 0 100 100`
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl CliConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            json: self.json,
            precision: usize::from(self.precision),
            autosave: !self.no_autosave,
        }
    }

    /// Whether commands come from a stream rather than the argument list.
    pub fn is_scripted(&self) -> bool {
        self.shell || self.script.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_words_keep_negative_numbers() {
        let cfg =
            CliConfig::try_parse_from(["svg-commander", "translate", "a.svg", "logo", "-5", "-2.5"])
                .unwrap();
        assert_eq!(cfg.command, vec!["translate", "a.svg", "logo", "-5", "-2.5"]);
        assert!(!cfg.is_scripted());
    }

    #[test]
    fn test_options_before_command() {
        let cfg = CliConfig::try_parse_from([
            "svg-commander",
            "--json",
            "--precision",
            "1",
            "--no-autosave",
            "within",
            "a.svg",
            "0",
            "0",
            "5",
            "5",
        ])
        .unwrap();
        let settings = cfg.settings();
        assert!(settings.json);
        assert_eq!(settings.precision, 1);
        assert!(!settings.autosave);
        assert_eq!(cfg.command[0], "within");
    }

    #[test]
    fn test_no_arguments_is_not_an_error() {
        let cfg = CliConfig::try_parse_from(["svg-commander"]).unwrap();
        assert!(cfg.command.is_empty());
        assert_eq!(cfg.settings(), Settings::default());
    }

    #[test]
    fn test_shell_and_script_conflict() {
        assert!(
            CliConfig::try_parse_from(["svg-commander", "--shell", "--script", "cmds.txt"]).is_err()
        );
    }
}
