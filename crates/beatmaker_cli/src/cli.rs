//! Command-line definitions for the `beatmaker` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "beatmaker", about = "Store and verify checksum-guarded beats", version)]
pub struct Cli {
    /// TOML config file (db_path, log_level, log_dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file; overrides config and BEATMAKER_DB_PATH
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check an encoded beat string and explain why it fails
    Verify { beat_string: String },
    /// Append the checksum to a raw payload
    Encode { payload: String },
    #[command(flatten)]
    Storage(StorageCommand),
}

/// Commands that open the database.
#[derive(Subcommand)]
pub enum StorageCommand {
    /// Register a beat owner
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Change username and email of an existing user
    UpdateUser {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Remove a user and every beat they own
    DeleteUser {
        /// Email or username
        user: String,
    },
    /// Store a new beat
    Create(BeatArgs),
    /// Replace an existing beat
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        beat: BeatArgs,
    },
    /// Delete a beat owned by the given user
    Delete {
        #[arg(long)]
        id: i64,
        /// Owner email or username
        #[arg(long)]
        owner: String,
    },
    /// List every beat of one user
    List {
        /// Owner email or username
        owner: String,
    },
}

#[derive(Args)]
pub struct BeatArgs {
    /// Owner email or username
    #[arg(long)]
    pub owner: String,
    #[arg(long)]
    pub title: String,
    /// Encoded beat string, e.g. `AB12:6`
    #[arg(long = "beat")]
    pub beat_string: String,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, StorageCommand};
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn codec_commands_stay_outside_storage() {
        let cli = Cli::try_parse_from(["beatmaker", "verify", "AB12:6"]).unwrap();
        assert!(matches!(cli.command, Commands::Verify { ref beat_string } if beat_string == "AB12:6"));

        let cli = Cli::try_parse_from(["beatmaker", "encode", "AB12"]).unwrap();
        assert!(matches!(cli.command, Commands::Encode { .. }));
    }

    #[test]
    fn storage_commands_route_to_storage_enum() {
        let cli = Cli::try_parse_from([
            "beatmaker", "--db", "/tmp/beats.db", "update", "--id", "4", "--owner", "casper",
            "--title", "Groove", "--beat", "AB12:6",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/beats.db")));
        match cli.command {
            Commands::Storage(StorageCommand::Update { id, beat }) => {
                assert_eq!(id, 4);
                assert_eq!(beat.beat_string, "AB12:6");
            }
            _ => panic!("expected storage update"),
        }

        let cli = Cli::try_parse_from(["beatmaker", "delete-user", "casper@example.org"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Storage(StorageCommand::DeleteUser { ref user }) if user == "casper@example.org"
        ));
    }
}
