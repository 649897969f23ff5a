//! WeekKey license tool
//!
//! Issues the rotating weekly tokens for an app's keyword set and inspects or
//! changes the license state of a local installation.
//!
//! Usage:
//!   weekkey --config app-license.json token
//!   weekkey --store-dir ./state activate WORD3-WORD4-WORD5-WORD6
//!
//! Issuing needs only the config; the other commands read and write the
//! app's license store.

use std::{path::PathBuf, process::ExitCode, sync::Arc};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;
use weekkey_cli::{load_config, open_engine, StatusReport};
use weekkey_license::{iso_week, Clock, SystemClock, TokenScheme};

#[derive(Parser, Debug)]
#[command(name = "weekkey")]
#[command(about = "Issue and check WeekKey license tokens")]
struct Args {
    /// JSON file with the app's license constants
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the license store (defaults to the app's config dir)
    #[arg(short, long)]
    store_dir: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token for the ISO week containing a date
    Token {
        /// Date in YYYY-MM-DD form (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Print the tokens accepted right now
    ValidTokens,
    /// Print the keyword pool in rotation order
    Keywords,
    /// Print the installation's license status
    Status {
        /// Print a JSON object instead of text
        #[arg(long)]
        json: bool,
    },
    /// Exit 0 if the app may be used, 1 otherwise
    Check,
    /// Activate a license key
    Activate {
        /// The key to activate
        key: String,
    },
    /// Remove the stored license key
    Deactivate,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(args.config.as_deref())?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match args.command {
        Command::Token { date } => {
            let scheme = TokenScheme::from_config(&config)?;
            let date = date.unwrap_or_else(|| clock.local(Utc::now()).date());
            debug!(%date, week = iso_week(date), "Issuing token");
            println!("{}", scheme.token_for_date(date));
        }
        Command::ValidTokens => {
            let scheme = TokenScheme::from_config(&config)?;
            let week = iso_week(clock.local(clock.now()).date());
            for token in scheme.valid_tokens_for_week(week) {
                println!("{token}");
            }
        }
        Command::Keywords => {
            let scheme = TokenScheme::from_config(&config)?;
            for (index, word) in scheme.keywords().iter().enumerate() {
                println!("{:>2} {word}", index + 1);
            }
        }
        Command::Status { json } => {
            let engine = open_engine(&config, args.store_dir.as_deref(), clock)?;
            if json {
                let report = StatusReport::capture(&engine);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", engine.status_text());
            }
        }
        Command::Check => {
            let engine = open_engine(&config, args.store_dir.as_deref(), clock)?;
            if !engine.can_use_app() {
                println!("{}", engine.status_text());
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Activate { key } => {
            let engine = open_engine(&config, args.store_dir.as_deref(), clock)?;
            if !engine.activate(&key) {
                eprintln!("Invalid license key");
                return Ok(ExitCode::FAILURE);
            }
            println!("License activated!");
        }
        Command::Deactivate => {
            let engine = open_engine(&config, args.store_dir.as_deref(), clock)?;
            engine.deactivate();
            println!("{}", engine.status_text());
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_token_date() {
        let args = Args::try_parse_from(["weekkey", "token", "--date", "2026-03-02"]).unwrap();
        match args.command {
            Command::Token { date } => assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 2)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_keywords() {
        let args = Args::try_parse_from(["weekkey", "keywords"]).unwrap();
        assert!(matches!(args.command, Command::Keywords));
    }
}
