//! Command words → [`Command`].

use std::path::PathBuf;

use crate::error::{Result, SvgError};
use crate::figures::RegionMode;
use crate::geometry::BoundingBox;

/// Default size of a drawing made by `create` without explicit dimensions.
pub const DEFAULT_CANVAS_SIZE: f64 = 100.0;

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open {
        path: PathBuf,
    },
    Close {
        path: PathBuf,
    },
    Save {
        path: PathBuf,
    },
    SaveAs {
        path: PathBuf,
        target: PathBuf,
    },
    Print {
        path: PathBuf,
    },
    Create {
        path: PathBuf,
        width: f64,
        height: f64,
    },
    Erase {
        path: PathBuf,
        id: String,
    },
    Translate {
        path: PathBuf,
        target: TranslateTarget,
        dx: f64,
        dy: f64,
    },
    Within {
        path: PathBuf,
        region: BoundingBox,
        mode: RegionMode,
    },
    Help,
    Exit,
    /// An unrecognized command word.
    Invalid(String),
}

/// What `translate` moves.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateTarget {
    Figure(String),
    /// `*`: every top-level figure.
    All,
}

impl Command {
    /// Parse a command from its words, e.g. `["erase", "a.svg", "logo"]`.
    ///
    /// `save as` may arrive as two words or, from a quoted shell line, as one.
    /// An empty word list is not a command; callers print usage instead.
    pub fn parse<S: AsRef<str>>(words: &[S]) -> Result<Command> {
        let words: Vec<&str> = words.iter().map(|w| w.as_ref()).collect();
        let Some((&first, rest)) = words.split_first() else {
            return Ok(Command::Invalid(String::new()));
        };

        if first == "save as" {
            return parse_save_as(rest);
        }
        if first == "save" && rest.first() == Some(&"as") {
            return parse_save_as(&rest[1..]);
        }

        let args = Args {
            command: command_name(first),
            words: rest,
        };
        let cmd = match first {
            "open" => Command::Open {
                path: args.path(0)?,
            },
            "close" => Command::Close {
                path: args.path(0)?,
            },
            "save" => Command::Save {
                path: args.path(0)?,
            },
            "print" => Command::Print {
                path: args.path(0)?,
            },
            "create" => {
                let path = args.path(0)?;
                let (width, height) = match args.words.get(1) {
                    None => (DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE),
                    Some(_) => (args.positive(1, "width")?, args.positive(2, "height")?),
                };
                Command::Create {
                    path,
                    width,
                    height,
                }
            }
            "erase" => Command::Erase {
                path: args.path(0)?,
                id: args.word(1, "id")?.to_string(),
            },
            "translate" => {
                let path = args.path(0)?;
                let target = match args.word(1, "id")? {
                    "*" => TranslateTarget::All,
                    id => TranslateTarget::Figure(id.to_string()),
                };
                Command::Translate {
                    path,
                    target,
                    dx: args.number(2, "dx")?,
                    dy: args.number(3, "dy")?,
                }
            }
            "within" => {
                let path = args.path(0)?;
                let x = args.number(1, "x")?;
                let y = args.number(2, "y")?;
                let w = args.number(3, "width")?;
                let h = args.number(4, "height")?;
                let mode = match args.words.get(5).copied() {
                    None | Some("contained") => RegionMode::Contained,
                    Some("intersects") => RegionMode::Intersects,
                    Some(other) => {
                        return Err(SvgError::InvalidArgument {
                            argument: "mode",
                            value: other.to_string(),
                            reason: "expected 'contained' or 'intersects'".to_string(),
                        })
                    }
                };
                Command::Within {
                    path,
                    region: BoundingBox::from_rect(x, y, w, h),
                    mode,
                }
            }
            "help" => Command::Help,
            "exit" => Command::Exit,
            other => Command::Invalid(other.to_string()),
        };
        Ok(cmd)
    }
}

fn parse_save_as(rest: &[&str]) -> Result<Command> {
    let args = Args {
        command: "save as",
        words: rest,
    };
    Ok(Command::SaveAs {
        path: args.path(0)?,
        target: PathBuf::from(args.word(1, "new-file")?),
    })
}

/// Static name for error messages; unknown words never reach argument
/// parsing.
fn command_name(word: &str) -> &'static str {
    match word {
        "open" => "open",
        "close" => "close",
        "save" => "save",
        "print" => "print",
        "create" => "create",
        "erase" => "erase",
        "translate" => "translate",
        "within" => "within",
        "help" => "help",
        "exit" => "exit",
        _ => "command",
    }
}

struct Args<'a> {
    command: &'static str,
    words: &'a [&'a str],
}

impl<'a> Args<'a> {
    fn word(&self, index: usize, argument: &'static str) -> Result<&'a str> {
        self.words
            .get(index)
            .copied()
            .filter(|w| !w.is_empty())
            .ok_or(SvgError::MissingArgument {
                command: self.command,
                argument,
            })
    }

    fn path(&self, index: usize) -> Result<PathBuf> {
        self.word(index, "file").map(PathBuf::from)
    }

    fn number(&self, index: usize, argument: &'static str) -> Result<f64> {
        let raw = self.word(index, argument)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(SvgError::InvalidArgument {
                argument,
                value: raw.to_string(),
                reason: "expected a finite number".to_string(),
            }),
        }
    }

    fn positive(&self, index: usize, argument: &'static str) -> Result<f64> {
        let v = self.number(index, argument)?;
        if v > 0.0 {
            Ok(v)
        } else {
            Err(SvgError::InvalidArgument {
                argument,
                value: self.words[index].to_string(),
                reason: "must be greater than zero".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_commands() {
        assert_eq!(
            Command::parse(&["open", "a.svg"]).unwrap(),
            Command::Open {
                path: PathBuf::from("a.svg")
            }
        );
        assert_eq!(
            Command::parse(&["print", "a.svg"]).unwrap(),
            Command::Print {
                path: PathBuf::from("a.svg")
            }
        );
    }

    #[test]
    fn test_missing_file_is_rejected() {
        for name in ["open", "close", "save", "print", "create", "erase", "translate", "within"] {
            let err = Command::parse(&[name]).unwrap_err();
            assert!(
                matches!(err, SvgError::MissingArgument { command, argument: "file" } if command == name),
                "{} should require a file",
                name
            );
        }
    }

    #[test]
    fn test_save_as_forms() {
        let expected = Command::SaveAs {
            path: PathBuf::from("a.svg"),
            target: PathBuf::from("b.svg"),
        };
        assert_eq!(Command::parse(&["save", "as", "a.svg", "b.svg"]).unwrap(), expected);
        assert_eq!(Command::parse(&["save as", "a.svg", "b.svg"]).unwrap(), expected);
        assert!(matches!(
            Command::parse(&["save", "as", "a.svg"]),
            Err(SvgError::MissingArgument {
                command: "save as",
                argument: "new-file"
            })
        ));
    }

    #[test]
    fn test_create_default_and_explicit_size() {
        assert_eq!(
            Command::parse(&["create", "n.svg"]).unwrap(),
            Command::Create {
                path: PathBuf::from("n.svg"),
                width: 100.0,
                height: 100.0
            }
        );
        assert_eq!(
            Command::parse(&["create", "n.svg", "640", "480"]).unwrap(),
            Command::Create {
                path: PathBuf::from("n.svg"),
                width: 640.0,
                height: 480.0
            }
        );
        assert!(matches!(
            Command::parse(&["create", "n.svg", "640"]),
            Err(SvgError::MissingArgument { argument: "height", .. })
        ));
        assert!(matches!(
            Command::parse(&["create", "n.svg", "0", "10"]),
            Err(SvgError::InvalidArgument { argument: "width", .. })
        ));
    }

    #[test]
    fn test_translate_targets() {
        assert_eq!(
            Command::parse(&["translate", "a.svg", "*", "-5", "2.5"]).unwrap(),
            Command::Translate {
                path: PathBuf::from("a.svg"),
                target: TranslateTarget::All,
                dx: -5.0,
                dy: 2.5
            }
        );
        assert!(matches!(
            Command::parse(&["translate", "a.svg", "logo", "x", "1"]),
            Err(SvgError::InvalidArgument { argument: "dx", .. })
        ));
        assert!(matches!(
            Command::parse(&["translate", "a.svg", "logo", "NaN", "1"]),
            Err(SvgError::InvalidArgument { argument: "dx", .. })
        ));
    }

    #[test]
    fn test_within_modes() {
        match Command::parse(&["within", "a.svg", "0", "0", "10", "20"]).unwrap() {
            Command::Within { region, mode, .. } => {
                assert_eq!(region, BoundingBox::from_rect(0.0, 0.0, 10.0, 20.0));
                assert_eq!(mode, RegionMode::Contained);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            Command::parse(&["within", "a.svg", "0", "0", "10", "20", "intersects"]).unwrap(),
            Command::Within {
                mode: RegionMode::Intersects,
                ..
            }
        ));
        assert!(Command::parse(&["within", "a.svg", "0", "0", "10", "20", "near"]).is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse(&["draw", "a.svg"]).unwrap(),
            Command::Invalid("draw".to_string())
        );
    }

    #[test]
    fn test_help_and_exit_take_no_arguments() {
        assert_eq!(Command::parse(&["help"]).unwrap(), Command::Help);
        assert_eq!(Command::parse(&["exit"]).unwrap(), Command::Exit);
    }
}
