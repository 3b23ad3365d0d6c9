//! Contact use-case service.
//!
//! # Responsibility
//! - Validate client payloads before they reach persistence.
//! - Delegate owner-scoped operations to a `ContactRepository`.
//! - Emit metadata-only log events and map failures to routing statuses.
//!
//! # Invariants
//! - Not-found stays `Ok(None)` all the way to the caller.
//! - Logs carry ids and counts only, never contact field values.

use crate::db::DbError;
use crate::model::contact::{
    validate_name, Contact, ContactId, ContactInput, ContactValidationError,
};
use crate::model::user::User;
use crate::repo::contact_repo::{ContactField, ContactRepository, DuplicateField, RepoError};
use crate::repo::page::{Page, PageRequest};
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Status the routing layer reports for an absent contact.
pub const NOT_FOUND_STATUS: u16 = 404;

pub type ServiceResult<T> = Result<T, ContactServiceError>;

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ContactServiceError {
    /// Payload failed shape validation; nothing was read or written.
    Validation(ContactValidationError),
    /// Create-time duplicate for the calling user.
    Conflict(DuplicateField),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ContactServiceError {
    /// HTTP-style status the routing layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::Conflict(_) => 409,
            Self::Repo(_) => 500,
        }
    }
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict(field) => write!(f, "duplicate data: {field} already exists"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Conflict(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ContactServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(field) => Self::Conflict(field),
            other => Self::Repo(other),
        }
    }
}

impl From<ContactValidationError> for ContactServiceError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for ContactServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the caller's contacts ordered by name.
    pub fn list(&self, user: &User, page: PageRequest) -> ServiceResult<Page<Contact>> {
        let result = self.repo.list_contacts(user, page)?;
        debug!(
            "event=contact_list module=service status=ok user_id={} total={}",
            user.id, result.total
        );
        Ok(result)
    }

    pub fn get(&self, user: &User, contact_id: ContactId) -> ServiceResult<Option<Contact>> {
        Ok(self.repo.get_contact(user, contact_id)?)
    }

    /// Validates and inserts one contact owned by `user`.
    ///
    /// # Errors
    /// - `Validation` for malformed payloads.
    /// - `Conflict` when email, phone or full name already exist for `user`.
    pub fn create(&self, user: &User, input: &ContactInput) -> ServiceResult<Contact> {
        if let Err(err) = input.validate() {
            warn!(
                "event=contact_create module=service status=invalid user_id={} error={}",
                user.id, err
            );
            return Err(err.into());
        }

        match self.repo.create_contact(user, input) {
            Ok(contact) => {
                info!(
                    "event=contact_create module=service status=ok user_id={} contact_id={}",
                    user.id, contact.id
                );
                Ok(contact)
            }
            Err(RepoError::Conflict(field)) => {
                info!(
                    "event=contact_create module=service status=conflict user_id={} field={}",
                    user.id,
                    conflict_code(field)
                );
                Err(ContactServiceError::Conflict(field))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces name, last name, email, phone and description.
    ///
    /// `input.birthday` is validated but not written; birthdays are set at
    /// creation only.
    pub fn update(
        &self,
        user: &User,
        contact_id: ContactId,
        input: &ContactInput,
    ) -> ServiceResult<Option<Contact>> {
        input.validate()?;
        let updated = self.repo.update_contact(user, contact_id, input)?;
        log_mutation("contact_update", user, contact_id, updated.is_some());
        Ok(updated)
    }

    /// Changes only the name.
    pub fn rename(
        &self,
        user: &User,
        contact_id: ContactId,
        new_name: &str,
    ) -> ServiceResult<Option<Contact>> {
        validate_name("name", new_name)?;
        let renamed = self.repo.rename_contact(user, contact_id, new_name)?;
        log_mutation("contact_rename", user, contact_id, renamed.is_some());
        Ok(renamed)
    }

    /// Hard-deletes and returns the removed contact's last values.
    pub fn remove(&self, user: &User, contact_id: ContactId) -> ServiceResult<Option<Contact>> {
        let removed = self.repo.remove_contact(user, contact_id)?;
        log_mutation("contact_remove", user, contact_id, removed.is_some());
        Ok(removed)
    }

    pub fn find_by_name(&self, user: &User, name: &str) -> ServiceResult<Option<Contact>> {
        Ok(self.repo.find_by_field(user, ContactField::Name, name)?)
    }

    pub fn find_by_last_name(
        &self,
        user: &User,
        last_name: &str,
    ) -> ServiceResult<Option<Contact>> {
        Ok(self
            .repo
            .find_by_field(user, ContactField::LastName, last_name)?)
    }

    pub fn find_by_email(&self, user: &User, email: &str) -> ServiceResult<Option<Contact>> {
        Ok(self.repo.find_by_field(user, ContactField::Email, email)?)
    }

    pub fn find_by_phone(&self, user: &User, phone: i64) -> ServiceResult<Option<Contact>> {
        Ok(self.repo.find_by_phone(user, phone)?)
    }

    pub fn find_by_name_contains(
        &self,
        user: &User,
        fragment: &str,
        page: PageRequest,
    ) -> ServiceResult<Page<Contact>> {
        self.search(user, ContactField::Name, fragment, page)
    }

    pub fn find_by_last_name_contains(
        &self,
        user: &User,
        fragment: &str,
        page: PageRequest,
    ) -> ServiceResult<Page<Contact>> {
        self.search(user, ContactField::LastName, fragment, page)
    }

    pub fn find_by_email_contains(
        &self,
        user: &User,
        fragment: &str,
        page: PageRequest,
    ) -> ServiceResult<Page<Contact>> {
        self.search(user, ContactField::Email, fragment, page)
    }

    /// Matches `fragment` anywhere in the phone number's digits.
    pub fn find_by_phone_contains(
        &self,
        user: &User,
        fragment: &str,
        page: PageRequest,
    ) -> ServiceResult<Page<Contact>> {
        self.search(user, ContactField::Phone, fragment, page)
    }

    /// Contacts whose birthday falls within `days` days from the local date.
    pub fn birthdays_within_days(
        &self,
        user: &User,
        days: u32,
        page: PageRequest,
    ) -> ServiceResult<Page<Contact>> {
        self.birthdays_within_days_on(user, days, Local::now().date_naive(), page)
    }

    /// Same as `birthdays_within_days` with an explicit reference date.
    pub fn birthdays_within_days_on(
        &self,
        user: &User,
        days: u32,
        today: NaiveDate,
        page: PageRequest,
    ) -> ServiceResult<Page<Contact>> {
        let result = self
            .repo
            .find_birthdays_within_days(user, days, today, page)?;
        debug!(
            "event=contact_birthdays module=service status=ok user_id={} days={} total={}",
            user.id, days, result.total
        );
        Ok(result)
    }

    fn search(
        &self,
        user: &User,
        field: ContactField,
        fragment: &str,
        page: PageRequest,
    ) -> ServiceResult<Page<Contact>> {
        let result = self
            .repo
            .find_by_field_contains(user, field, fragment, page)?;
        debug!(
            "event=contact_search module=service status=ok user_id={} field={:?} total={}",
            user.id, field, result.total
        );
        Ok(result)
    }
}

fn log_mutation(event: &str, user: &User, contact_id: ContactId, found: bool) {
    let status = if found { "ok" } else { "not_found" };
    info!(
        "event={event} module=service status={status} user_id={} contact_id={contact_id}",
        user.id
    );
}

fn conflict_code(field: DuplicateField) -> &'static str {
    match field {
        DuplicateField::Email => "email",
        DuplicateField::Phone => "phone",
        DuplicateField::FullName => "full_name",
    }
}
