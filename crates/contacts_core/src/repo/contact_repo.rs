//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own every read and write of `contacts` rows.
//! - Enforce per-user ownership and the insert-time dedup check.
//! - Implement exact, partial-match and birthday-window searches.
//!
//! # Invariants
//! - Every statement filters by `user_id` before any other predicate; a
//!   foreign row is indistinguishable from a missing one.
//! - `create_contact` checks email, then phone, then (name, last_name) and
//!   performs no insert when any of them already exists for the caller.
//! - `update_contact` never touches `birthday`.
//! - Not-found is reported as `Ok(None)`, never as an error.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactInput};
use crate::model::user::User;
use crate::repo::page::{Page, PageRequest};
use crate::repo::schema_guard::ensure_schema_ready;
use crate::search::birthday::BirthdayWindow;
use chrono::NaiveDate;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    last_name,
    email,
    phone,
    birthday,
    description,
    user_id
FROM contacts";

const CONTACT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "last_name",
    "email",
    "phone",
    "birthday",
    "description",
    "user_id",
];

const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

// Reads month and day from the `MM-DD` tail so signed or five-digit years
// (`+10000-06-01`, `-0044-03-15`) still produce a key.
const BIRTHDAY_KEY_SQL: &str = "(CAST(substr(birthday, -5, 2) AS INTEGER) * 100
    + CAST(substr(birthday, -2) AS INTEGER))";

/// Name of the case-insensitive substring SQL function.
pub const CONTAINS_CI_FN: &str = "contains_ci";

pub type RepoResult<T> = Result<T, RepoError>;

/// Field that collided during the create-time dedup check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Email,
    Phone,
    /// The (name, last_name) pair.
    FullName,
}

impl Display for DuplicateField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Phone => f.write_str("phone"),
            Self::FullName => f.write_str("name and last_name"),
        }
    }
}

/// Repository error for contact and user persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Store-level failure, not handled locally.
    Db(DbError),
    /// Duplicate data for the calling user; nothing was written.
    Conflict(DuplicateField),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be decoded.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(field) => write!(f, "duplicate data: {field} already exists"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
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

/// Text column targeted by exact and partial-match searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    LastName,
    Email,
    /// Matched against the decimal string of the stored number.
    Phone,
}

impl ContactField {
    fn text_expr(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "CAST(phone AS TEXT)",
        }
    }
}

/// Repository interface for owner-scoped contact operations.
pub trait ContactRepository {
    /// Lists the caller's contacts ordered by name.
    fn list_contacts(&self, user: &User, page: PageRequest) -> RepoResult<Page<Contact>>;
    fn get_contact(&self, user: &User, contact_id: ContactId) -> RepoResult<Option<Contact>>;
    /// Inserts after the dedup check; fails with `RepoError::Conflict`.
    fn create_contact(&self, user: &User, input: &ContactInput) -> RepoResult<Contact>;
    /// Overwrites name, last name, email, phone and description.
    fn update_contact(
        &self,
        user: &User,
        contact_id: ContactId,
        input: &ContactInput,
    ) -> RepoResult<Option<Contact>>;
    fn rename_contact(
        &self,
        user: &User,
        contact_id: ContactId,
        new_name: &str,
    ) -> RepoResult<Option<Contact>>;
    /// Hard-deletes and returns the last known values.
    fn remove_contact(&self, user: &User, contact_id: ContactId) -> RepoResult<Option<Contact>>;
    /// First owned contact whose `field` equals `value` exactly.
    fn find_by_field(
        &self,
        user: &User,
        field: ContactField,
        value: &str,
    ) -> RepoResult<Option<Contact>>;
    fn find_by_phone(&self, user: &User, phone: i64) -> RepoResult<Option<Contact>>;
    /// Owned contacts whose `field` contains `fragment`, ignoring case.
    fn find_by_field_contains(
        &self,
        user: &User,
        field: ContactField,
        fragment: &str,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>>;
    /// Owned contacts with a birthday in `[today, today + days]` by month/day.
    fn find_birthdays_within_days(
        &self,
        user: &User,
        days: u32,
        today: NaiveDate,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>>;
}

/// SQLite-backed contact repository.
///
/// Works over a plain `Connection` (autocommit per statement) or over the
/// transaction handed out by `db::unit_of_work`.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &[("contacts", CONTACT_COLUMNS)])?;
        register_search_functions(conn)?;
        Ok(Self { conn })
    }

    fn find_first(
        &self,
        predicate: &str,
        params: impl Params,
    ) -> RepoResult<Option<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             WHERE user_id = ?1
               AND {predicate}
             ORDER BY id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn owned_row_exists(&self, predicate: &str, params: impl Params) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1
                    FROM contacts
                    WHERE user_id = ?1
                      AND {predicate}
                );"
            ),
            params,
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_duplicate(
        &self,
        user: &User,
        input: &ContactInput,
    ) -> RepoResult<Option<DuplicateField>> {
        if self.owned_row_exists("email = ?2", params![user.id, input.email])? {
            return Ok(Some(DuplicateField::Email));
        }
        if self.owned_row_exists("phone = ?2", params![user.id, input.phone])? {
            return Ok(Some(DuplicateField::Phone));
        }
        if self.owned_row_exists(
            "name = ?2 AND last_name = ?3",
            params![user.id, input.name, input.last_name],
        )? {
            return Ok(Some(DuplicateField::FullName));
        }
        Ok(None)
    }

    fn query_page(
        &self,
        user: &User,
        filter: PageFilter<'_>,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>> {
        let page = page.normalized();
        let mut where_sql = String::from(" WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(user.id)];
        filter.push_predicate(&mut where_sql, &mut bind_values);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM contacts{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let offset = i64::try_from(page.offset()).map_err(|_| {
            RepoError::InvalidData(format!("page offset {} out of range", page.offset()))
        })?;
        let sql =
            format!("{CONTACT_SELECT_SQL}{where_sql} ORDER BY name ASC, id ASC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(page.size)));
        bind_values.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_contact_row(row)?);
        }

        Ok(Page::new(items, u64::try_from(total).unwrap_or(0), page))
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn list_contacts(&self, user: &User, page: PageRequest) -> RepoResult<Page<Contact>> {
        self.query_page(user, PageFilter::All, page)
    }

    fn get_contact(&self, user: &User, contact_id: ContactId) -> RepoResult<Option<Contact>> {
        self.find_first("id = ?2", params![user.id, contact_id])
    }

    fn create_contact(&self, user: &User, input: &ContactInput) -> RepoResult<Contact> {
        if let Some(field) = self.find_duplicate(user, input)? {
            return Err(RepoError::Conflict(field));
        }

        self.conn.execute(
            "INSERT INTO contacts (
                name,
                last_name,
                email,
                phone,
                birthday,
                description,
                user_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                input.name.as_str(),
                input.last_name.as_str(),
                input.email.as_str(),
                input.phone,
                input.birthday.format(BIRTHDAY_FORMAT).to_string(),
                input.description.as_deref(),
                user.id,
            ],
        )?;

        let contact_id = self.conn.last_insert_rowid();
        self.get_contact(user, contact_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created contact {contact_id} missing in read-back"))
        })
    }

    fn update_contact(
        &self,
        user: &User,
        contact_id: ContactId,
        input: &ContactInput,
    ) -> RepoResult<Option<Contact>> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                name = ?3,
                last_name = ?4,
                email = ?5,
                phone = ?6,
                description = ?7
             WHERE user_id = ?1
               AND id = ?2;",
            params![
                user.id,
                contact_id,
                input.name.as_str(),
                input.last_name.as_str(),
                input.email.as_str(),
                input.phone,
                input.description.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_contact(user, contact_id)
    }

    fn rename_contact(
        &self,
        user: &User,
        contact_id: ContactId,
        new_name: &str,
    ) -> RepoResult<Option<Contact>> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET name = ?3
             WHERE user_id = ?1
               AND id = ?2;",
            params![user.id, contact_id, new_name],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_contact(user, contact_id)
    }

    fn remove_contact(&self, user: &User, contact_id: ContactId) -> RepoResult<Option<Contact>> {
        let Some(snapshot) = self.get_contact(user, contact_id)? else {
            return Ok(None);
        };

        self.conn.execute(
            "DELETE FROM contacts
             WHERE user_id = ?1
               AND id = ?2;",
            params![user.id, contact_id],
        )?;

        Ok(Some(snapshot))
    }

    fn find_by_field(
        &self,
        user: &User,
        field: ContactField,
        value: &str,
    ) -> RepoResult<Option<Contact>> {
        self.find_first(
            &format!("{} = ?2", field.text_expr()),
            params![user.id, value],
        )
    }

    fn find_by_phone(&self, user: &User, phone: i64) -> RepoResult<Option<Contact>> {
        self.find_first("phone = ?2", params![user.id, phone])
    }

    fn find_by_field_contains(
        &self,
        user: &User,
        field: ContactField,
        fragment: &str,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>> {
        self.query_page(user, PageFilter::Contains(field, fragment), page)
    }

    fn find_birthdays_within_days(
        &self,
        user: &User,
        days: u32,
        today: NaiveDate,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>> {
        let window = BirthdayWindow::new(today, days);
        self.query_page(user, PageFilter::Birthdays(window), page)
    }
}

enum PageFilter<'a> {
    All,
    Contains(ContactField, &'a str),
    Birthdays(BirthdayWindow),
}

impl PageFilter<'_> {
    fn push_predicate(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        match self {
            Self::All => {}
            Self::Contains(field, fragment) => {
                sql.push_str(&format!(
                    " AND {CONTAINS_CI_FN}({}, ?) = 1",
                    field.text_expr()
                ));
                bind_values.push(Value::Text((*fragment).to_string()));
            }
            Self::Birthdays(window) if window.covers_full_year() => {}
            Self::Birthdays(window) => {
                if window.wraps() {
                    sql.push_str(&format!(
                        " AND ({BIRTHDAY_KEY_SQL} >= ? OR {BIRTHDAY_KEY_SQL} <= ?)"
                    ));
                } else {
                    sql.push_str(&format!(" AND {BIRTHDAY_KEY_SQL} BETWEEN ? AND ?"));
                }
                bind_values.push(Value::Integer(i64::from(window.start().key())));
                bind_values.push(Value::Integer(i64::from(window.end().key())));
            }
        }
    }
}

/// Registers `contains_ci(haystack, needle)` on `conn`.
///
/// SQLite `LIKE`/`lower()` fold ASCII only; this folds full Unicode so
/// Cyrillic and accented names match regardless of case.
pub fn register_search_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_CI_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<Option<String>>(1)?;
            Ok(match (haystack, needle) {
                (Some(haystack), Some(needle)) => contains_ignore_case(&haystack, &needle),
                _ => false,
            })
        },
    )
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let birthday_text: String = row.get("birthday")?;
    let birthday = NaiveDate::parse_from_str(&birthday_text, BIRTHDAY_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid birthday value `{birthday_text}` in contacts.birthday"
        ))
    })?;

    Ok(Contact {
        id: row.get("id")?,
        name: row.get("name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        birthday,
        description: row.get("description")?,
        user_id: row.get("user_id")?,
    })
}
