//! Command-line parsing for the interactive loop.
//!
//! One whitespace-tokenized command per input line. Parsing is local and
//! side-effect free; dispatch happens in `main`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        host: String,
        port: u16,
        user: String,
        password: String,
    },
    Join {
        channel: String,
    },
    /// Leave a channel. Ending the session is `logout`, never `exit`.
    Exit {
        channel: String,
    },
    Report {
        path: PathBuf,
    },
    Logout,
    Summary {
        channel: String,
        reporter: String,
        output: PathBuf,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    Usage(&'static str),
    BadAddress(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Unknown(cmd) => write!(f, "unknown command: {}", cmd),
            Self::Usage(usage) => write!(f, "usage: {}", usage),
            Self::BadAddress(addr) => {
                write!(f, "invalid server address '{}', expected host:port", addr)
            }
        }
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = tokens.split_first() else {
            return Err(CommandError::Empty);
        };

        match name {
            "login" => {
                let &[address, user, password] = args else {
                    return Err(CommandError::Usage("login <host:port> <user> <password>"));
                };
                let (host, port) = parse_address(address)?;
                Ok(Command::Login {
                    host,
                    port,
                    user: user.to_string(),
                    password: password.to_string(),
                })
            }
            "join" => {
                let &[channel] = args else {
                    return Err(CommandError::Usage("join <channel>"));
                };
                Ok(Command::Join {
                    channel: channel.to_string(),
                })
            }
            "exit" => {
                let &[channel] = args else {
                    return Err(CommandError::Usage("exit <channel>"));
                };
                Ok(Command::Exit {
                    channel: channel.to_string(),
                })
            }
            "report" => {
                let &[path] = args else {
                    return Err(CommandError::Usage("report <events file>"));
                };
                Ok(Command::Report {
                    path: PathBuf::from(path),
                })
            }
            "logout" => {
                if !args.is_empty() {
                    return Err(CommandError::Usage("logout"));
                }
                Ok(Command::Logout)
            }
            "summary" => {
                let &[channel, reporter, output] = args else {
                    return Err(CommandError::Usage(
                        "summary <channel> <reporter> <output file>",
                    ));
                };
                Ok(Command::Summary {
                    channel: channel.to_string(),
                    reporter: reporter.to_string(),
                    output: PathBuf::from(output),
                })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_address(address: &str) -> Result<(String, u16), CommandError> {
    let bad = || CommandError::BadAddress(address.to_string());
    let (host, port) = address.split_once(':').ok_or_else(bad)?;
    if host.is_empty() {
        return Err(bad());
    }
    let port = port.parse().map_err(|_| bad())?;
    Ok((host.to_string(), port))
}

/// Write a summary report, replacing any previous file at the path.
pub fn write_summary(path: &Path, text: &str) -> io::Result<()> {
    fs::write(path, text)
}
