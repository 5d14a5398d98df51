//! User repository.
//!
//! # Responsibility
//! - Resolve beat owners by email or username.
//! - Register, rename and remove users.
//!
//! # Invariants
//! - Emails always contain `@` and usernames never do, so one lookup key can
//!   only ever name one user.
//! - Email matching is case-insensitive; username matching is exact.
//! - An email match outranks a username match for the same key.
//! - Deleting a user removes their beats (`ON DELETE CASCADE`).

use crate::model::user::{NewUser, User, UserId};
use crate::repo::beat_repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, username, email FROM users";

/// User-lookup and user-management collaborator.
pub trait UserRepository {
    /// Returns the user whose email or username equals `email_or_username`.
    fn get_user_by_email_or_username(&self, email_or_username: &str)
        -> RepoResult<Option<User>>;
    /// Registers one user and returns it with the storage-assigned id.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    /// Replaces username and email of the user with `user.id`.
    fn update_user(&self, user: &User) -> RepoResult<User>;
    /// Removes the user named by email or username, together with their beats.
    fn delete_user(&self, email_or_username: &str) -> RepoResult<()>;
}

impl<R: UserRepository + ?Sized> UserRepository for &R {
    fn get_user_by_email_or_username(
        &self,
        email_or_username: &str,
    ) -> RepoResult<Option<User>> {
        (**self).get_user_by_email_or_username(email_or_username)
    }

    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        (**self).create_user(user)
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        (**self).update_user(user)
    }

    fn delete_user(&self, email_or_username: &str) -> RepoResult<()> {
        (**self).delete_user(email_or_username)
    }
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users")?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_user_by_email_or_username(
        &self,
        email_or_username: &str,
    ) -> RepoResult<Option<User>> {
        let needle = email_or_username.trim();
        let user = self
            .conn
            .query_row(
                &format!(
                    "{USER_SELECT_SQL}
                     WHERE email = ?1 COLLATE NOCASE
                        OR username = ?1
                     ORDER BY (email = ?1 COLLATE NOCASE) DESC, id ASC
                     LIMIT 1;"
                ),
                [needle],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let (username, email) = normalize_identity(&user.username, &user.email)?;

        let inserted = self.conn.execute(
            "INSERT INTO users (username, email) VALUES (?1, ?2);",
            params![username, email],
        );
        map_conflict(inserted, username)?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        let (username, email) = normalize_identity(&user.username, &user.email)?;

        let changed = self.conn.execute(
            "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3;",
            params![username, email, user.id],
        );
        if map_conflict(changed, username)? == 0 {
            return Err(RepoError::UserNotFound(user_id_label(user.id)));
        }

        Ok(User {
            id: user.id,
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    fn delete_user(&self, email_or_username: &str) -> RepoResult<()> {
        let user = self
            .get_user_by_email_or_username(email_or_username)?
            .ok_or_else(|| RepoError::UserNotFound(email_or_username.trim().to_string()))?;

        self.conn
            .execute("DELETE FROM users WHERE id = ?1;", [user.id])?;
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
    })
}

fn normalize_identity<'a>(username: &'a str, email: &'a str) -> RepoResult<(&'a str, &'a str)> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(RepoError::InvalidData(
            "username and email must not be blank".to_string(),
        ));
    }
    if username.contains('@') {
        return Err(RepoError::InvalidData(format!(
            "username `{username}` must not contain `@`"
        )));
    }
    if !email.contains('@') {
        return Err(RepoError::InvalidData(
            "email must contain `@`".to_string(),
        ));
    }
    Ok((username, email))
}

fn map_conflict(result: rusqlite::Result<usize>, username: &str) -> RepoResult<usize> {
    match result {
        Ok(changed) => Ok(changed),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            Err(RepoError::UserConflict(username.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

fn user_id_label(id: UserId) -> String {
    format!("id {id}")
}
