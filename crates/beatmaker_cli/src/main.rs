//! `beatmaker` command-line entry point.
//!
//! Thin shell over `beatmaker_core`: loads config, opens the database, runs
//! one service call and prints the result as JSON.

mod cli;

use beatmaker_core::db::open_db;
use beatmaker_core::{
    decode_beat_string, encode_beat_string, init_logging, load_config, BeatCandidate,
    BeatRules, BeatService, NewUser, SqliteBeatRepository, SqliteUserRepository, User,
    UserRepository,
};
use clap::Parser;
use cli::{BeatArgs, Cli, Commands, StorageCommand};
use std::path::PathBuf;
use log::error;
use std::error::Error;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Verify { beat_string } => {
            let decoded = decode_beat_string(&beat_string)?;
            print_json(&serde_json::json!({
                "valid": true,
                "payload": decoded.payload,
                "checksum": decoded.checksum,
            }))
        }
        Commands::Encode { payload } => {
            println!("{}", encode_beat_string(&payload)?);
            Ok(())
        }
        Commands::Storage(command) => run_with_storage(cli.config, cli.db, command),
    }
}

fn run_with_storage(
    config_path: Option<PathBuf>,
    db_override: Option<PathBuf>,
    command: StorageCommand,
) -> CliResult<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(db) = db_override {
        config.db_path = db;
    }
    if let Some(log_dir) = config.log_dir.as_deref() {
        let log_dir = log_dir.to_string_lossy();
        init_logging(config.log_level, &log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let users = SqliteUserRepository::try_new(&conn)?;
    let service = BeatService::new(SqliteBeatRepository::try_new(&conn)?, &users, BeatRules);

    match command {
        StorageCommand::AddUser { username, email } => {
            print_json(&users.create_user(&NewUser::new(username, email))?)
        }
        StorageCommand::UpdateUser {
            id,
            username,
            email,
        } => print_json(&users.update_user(&User {
            id,
            username,
            email,
        })?),
        StorageCommand::DeleteUser { user } => {
            users.delete_user(&user)?;
            print_json(&serde_json::json!({ "deleted_user": user }))
        }
        StorageCommand::Create(args) => print_json(&service.create_beat(&candidate(args))?),
        StorageCommand::Update { id, beat } => {
            print_json(&service.update_beat(&candidate(beat).with_id(id))?)
        }
        StorageCommand::Delete { id, owner } => {
            let target = BeatCandidate {
                id: Some(id),
                user_email: owner,
                ..BeatCandidate::default()
            };
            service.delete_beat(&target)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        StorageCommand::List { owner } => print_json(&service.list_beats_for_user(&owner)?),
    }
}

fn candidate(args: BeatArgs) -> BeatCandidate {
    BeatCandidate::new(args.title, args.beat_string, args.owner)
}

fn print_json(value: &impl serde::Serialize) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
