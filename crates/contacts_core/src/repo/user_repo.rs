//! User repository contracts and SQLite implementation.
//!
//! The contacts core never mutates users during contact operations; this
//! repository exists for the identity lookup that precedes every request and
//! for account removal, whose cascade clears the owned contacts.

use crate::model::user::{NewUser, User, UserId};
use crate::repo::contact_repo::{DuplicateField, RepoError, RepoResult};
use crate::repo::schema_guard::ensure_schema_ready;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    password,
    avatar,
    refresh_token,
    created_at
FROM users";

const USER_COLUMNS: &[&str] = &[
    "id",
    "username",
    "email",
    "password",
    "avatar",
    "refresh_token",
    "created_at",
];

/// Repository interface for user rows.
pub trait UserRepository {
    /// Inserts a user; a taken email yields `RepoError::Conflict(Email)`.
    fn create_user(&self, new_user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Deletes a user and, through the foreign key, every owned contact.
    ///
    /// Returns `false` when no such user existed.
    fn delete_user(&self, id: UserId) -> RepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &[("users", USER_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, new_user: &NewUser) -> RepoResult<User> {
        if self.find_user_by_email(&new_user.email)?.is_some() {
            return Err(RepoError::Conflict(DuplicateField::Email));
        }

        self.conn.execute(
            "INSERT INTO users (
                username,
                email,
                password,
                avatar
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                new_user.username.as_deref(),
                new_user.email.as_str(),
                new_user.password_hash.as_str(),
                new_user.avatar.as_deref(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("created user {id} missing in read-back")))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
                [email],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password")?,
        avatar: row.get("avatar")?,
        refresh_token: row.get("refresh_token")?,
        created_at: row.get("created_at")?,
    })
}
