//! Beat repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the storage collaborator used by `BeatService`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Update and delete are owner-scoped: a beat id only matches rows that
//!   also carry the same `owner_id`.
//! - `beat_string` is written and read back byte-for-byte.
//! - Repositories never verify checksums; callers decide what reaches them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::beat::{Beat, BeatId};
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BEAT_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    beat_string
FROM beats";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for beat and user persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No beat with this id belongs to the requested owner.
    NotFound(BeatId),
    /// Update/delete was called on a beat without an id.
    MissingId,
    /// Username or email is already registered.
    UserConflict(String),
    /// No user matches this id, email or username.
    UserNotFound(String),
    InvalidData(String),
    /// Connection has not been migrated to the expected schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "beat not found: {id}"),
            Self::MissingId => write!(f, "beat id is required"),
            Self::UserConflict(value) => write!(f, "user already exists: {value}"),
            Self::UserNotFound(value) => write!(f, "user not found: {value}"),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator for beats.
pub trait BeatRepository {
    /// Inserts a beat and returns it with the storage-assigned id.
    fn create_beat(&self, beat: &Beat) -> RepoResult<Beat>;
    /// Fully replaces an existing beat owned by `beat.owner_id`.
    fn update_beat(&self, beat: &Beat) -> RepoResult<Beat>;
    /// Removes an existing beat owned by `beat.owner_id`.
    fn delete_beat(&self, beat: &Beat) -> RepoResult<()>;
    /// Lists every beat of one owner in id order.
    fn get_all_beats_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<Beat>>;
}

impl<R: BeatRepository + ?Sized> BeatRepository for &R {
    fn create_beat(&self, beat: &Beat) -> RepoResult<Beat> {
        (**self).create_beat(beat)
    }

    fn update_beat(&self, beat: &Beat) -> RepoResult<Beat> {
        (**self).update_beat(beat)
    }

    fn delete_beat(&self, beat: &Beat) -> RepoResult<()> {
        (**self).delete_beat(beat)
    }

    fn get_all_beats_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<Beat>> {
        (**self).get_all_beats_for_owner(owner_id)
    }
}

/// SQLite-backed beat repository.
pub struct SqliteBeatRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBeatRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "beats")?;
        Ok(Self { conn })
    }
}

impl BeatRepository for SqliteBeatRepository<'_> {
    fn create_beat(&self, beat: &Beat) -> RepoResult<Beat> {
        self.conn.execute(
            "INSERT INTO beats (owner_id, title, beat_string) VALUES (?1, ?2, ?3);",
            params![beat.owner_id, beat.title.as_str(), beat.beat_string.as_str()],
        )?;

        Ok(Beat {
            id: Some(self.conn.last_insert_rowid()),
            ..beat.clone()
        })
    }

    fn update_beat(&self, beat: &Beat) -> RepoResult<Beat> {
        let id = beat.id.ok_or(RepoError::MissingId)?;
        let changed = self.conn.execute(
            "UPDATE beats
             SET
                title = ?1,
                beat_string = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3
               AND owner_id = ?4;",
            params![beat.title.as_str(), beat.beat_string.as_str(), id, beat.owner_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(beat.clone())
    }

    fn delete_beat(&self, beat: &Beat) -> RepoResult<()> {
        let id = beat.id.ok_or(RepoError::MissingId)?;
        let changed = self.conn.execute(
            "DELETE FROM beats WHERE id = ?1 AND owner_id = ?2;",
            params![id, beat.owner_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_all_beats_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<Beat>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BEAT_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([owner_id])?;
        let mut beats = Vec::new();
        while let Some(row) = rows.next()? {
            beats.push(parse_beat_row(row)?);
        }

        Ok(beats)
    }
}

fn parse_beat_row(row: &Row<'_>) -> RepoResult<Beat> {
    Ok(Beat {
        id: Some(row.get("id")?),
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        beat_string: row.get("beat_string")?,
    })
}

/// Rejects connections that skipped `open_db` bootstrap.
pub(crate) fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    Ok(())
}
