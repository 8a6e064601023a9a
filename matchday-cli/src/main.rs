//! Interactive matchday client.
//!
//! Reads commands from standard input and drives one session at a time.
//! Asynchronous notifications (receipts, server errors, lost connections)
//! print from the session's receiver thread as they arrive.

mod commands;
mod config;

use std::fs::File;
use std::io::{self, BufRead};

use log::{info, warn};

use matchday_net::client::{ConnectOptions, Session};
use matchday_net::protocol::SessionEvent;
use matchday_types::load_match_file;

use commands::{Command, CommandError};
use config::Config;

fn init_logging(verbose: bool) {
    use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("matchday")
        .join("matchday.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path).unwrap_or_else(|_| {
        File::create("/tmp/matchday.log").expect("Cannot create log file")
    });

    WriteLogger::init(log_level, LogConfig::default(), log_file)
        .expect("Failed to initialize logger");

    log::info!("matchday starting (log level: {:?})", log_level);
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");

    let config = Config::load();
    init_logging(verbose || config.verbose());

    let stdin = io::stdin();
    run(stdin.lock(), &config)
}

fn run<R: BufRead>(input: R, config: &Config) -> io::Result<()> {
    let mut session: Option<Session> = None;

    for line in input.lines() {
        let line = line?;

        // Reap a session that terminated asynchronously since the last
        // command: close the transport and join the receiver.
        if let Some(live) = session.take() {
            if live.is_terminated() {
                live.shutdown();
            } else {
                session = Some(live);
            }
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Login { host, port, user, password } => {
                if session.is_some() {
                    println!("The client is already logged in, log out before trying again");
                    continue;
                }
                let options = ConnectOptions {
                    host,
                    port,
                    vhost: config.vhost().unwrap_or_default().to_string(),
                    accept_version: config.accept_version().to_string(),
                };
                match Session::connect(&options, &user, &password, |event| print_event(&event)) {
                    Ok(live) => session = Some(live),
                    Err(e) => {
                        warn!("connect to {}:{} failed: {}", options.host, options.port, e);
                        println!("Could not connect to server");
                    }
                }
            }
            command => {
                let Some(live) = session.as_mut() else {
                    println!("Please log in first");
                    continue;
                };
                if let Err(e) = dispatch(live, command) {
                    warn!("send failed: {}", e);
                    println!("Connection to server lost");
                    if let Some(dead) = session.take() {
                        dead.shutdown();
                    }
                }
            }
        }
    }

    if let Some(live) = session.take() {
        live.shutdown();
    }
    Ok(())
}

/// Run one connected-state command. An `Err` means the transport failed
/// mid-send and the session must be torn down.
fn dispatch(session: &mut Session, command: Command) -> io::Result<()> {
    match command {
        // Handled by the run loop before dispatch.
        Command::Login { .. } => {}
        Command::Join { channel } => {
            if session.join(&channel)? {
                info!("subscribe sent for {}", channel);
            } else {
                println!("Already joined channel {}", channel);
            }
        }
        Command::Exit { channel } => {
            if session.leave(&channel)? {
                info!("unsubscribe sent for {}", channel);
            } else {
                println!("Not joined to channel {}", channel);
            }
        }
        Command::Report { path } => match load_match_file(&path) {
            Ok(report) => {
                let sent = session.report(&report)?;
                info!("sent {} report frames from {}", sent, path.display());
            }
            Err(e) => println!("Could not load events file {}: {}", path.display(), e),
        },
        Command::Logout => session.logout()?,
        Command::Summary { channel, reporter, output } => {
            match session.summary(&channel, &reporter) {
                Some(text) => {
                    if let Err(e) = commands::write_summary(&output, &text) {
                        println!("Could not write summary file {}: {}", output.display(), e);
                    }
                }
                None => println!("No reports received for {} from {}", channel, reporter),
            }
        }
    }
    Ok(())
}

/// Runs on the receiver thread; everything user-visible goes to stdout.
fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::LoginSuccessful => println!("Login successful"),
        SessionEvent::JoinedChannel(channel) => println!("Joined channel {}", channel),
        SessionEvent::ExitedChannel(channel) => println!("Exited channel {}", channel),
        SessionEvent::LogoutComplete => println!("Logged out"),
        SessionEvent::ProtocolError(detail) => println!("Error: {}", detail),
        SessionEvent::ConnectionLost => println!("Disconnected from server"),
    }
}
