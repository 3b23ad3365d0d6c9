//! Core domain logic for per-user contact books.
//! This crate is the single source of truth for ownership and dedup invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use db::{open_db, open_db_in_memory, unit_of_work, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::contact::{Contact, ContactId, ContactInput, ContactValidationError};
pub use model::user::{NewUser, User, UserId};
pub use repo::contact_repo::{
    ContactField, ContactRepository, DuplicateField, RepoError, RepoResult,
    SqliteContactRepository,
};
pub use repo::page::{Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use search::birthday::{BirthdayWindow, MonthDay};
pub use service::contact_service::{
    ContactService, ContactServiceError, ServiceResult, NOT_FOUND_STATUS,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
