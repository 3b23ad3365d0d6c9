//! Command-line driver for the contacts core.
//!
//! # Responsibility
//! - Resolve configuration from flags and `CONTACTS_*` environment variables.
//! - Resolve the calling user by email before any contact operation.
//! - Run each command inside one unit of work and print JSON.
//!
//! # Invariants
//! - Absent contacts print a 404 envelope; service failures print their
//!   own status (409 duplicate, 422 invalid, 500 store).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use contacts_core::{
    core_version, default_log_level, init_logging, logging_status, open_db, unit_of_work,
    Contact, ContactId, ContactInput, ContactRepository, ContactService, ContactServiceError,
    NewUser, Page, PageRequest, RepoError, ServiceResult, SqliteContactRepository,
    SqliteUserRepository, User, UserRepository, DEFAULT_PAGE_SIZE, NOT_FOUND_STATUS,
};
use log::{debug, info};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "contacts", version, about = "Per-user contact book backed by SQLite")]
struct Cli {
    /// SQLite database file; created and migrated on first use.
    #[arg(long, env = "CONTACTS_DB", default_value = "contacts.sqlite3")]
    db: PathBuf,
    /// Email of the calling user.
    #[arg(long, env = "CONTACTS_USER")]
    user: Option<String>,
    #[arg(long, env = "CONTACTS_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "CONTACTS_LOG_DIR")]
    log_dir: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    size: u32,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Registers a local user.
    AddUser {
        email: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password_hash: String,
    },
    /// Deletes the calling user together with all of their contacts.
    DeleteUser,
    #[command(flatten)]
    Contacts(ContactCommand),
}

#[derive(Debug, Subcommand)]
enum ContactCommand {
    List,
    Get {
        id: ContactId,
    },
    Add(ContactArgs),
    /// Replaces name, last name, email, phone and description.
    Update {
        id: ContactId,
        #[command(flatten)]
        contact: ContactArgs,
    },
    Rename {
        id: ContactId,
        name: String,
    },
    Remove {
        id: ContactId,
    },
    /// Exact match, first hit only.
    Find {
        field: FieldArg,
        value: String,
    },
    /// Case-insensitive substring match.
    Search {
        field: FieldArg,
        fragment: String,
    },
    /// Birthdays within the next N days.
    Birthdays {
        days: u32,
        /// Reference date instead of the local calendar date.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Debug, Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: i64,
    #[arg(long)]
    birthday: NaiveDate,
    #[arg(long)]
    description: Option<String>,
}

impl From<ContactArgs> for ContactInput {
    fn from(value: ContactArgs) -> Self {
        Self {
            name: value.name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            birthday: value.birthday,
            description: value.description,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FieldArg {
    Name,
    LastName,
    Email,
    Phone,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Reply {
    Contact(Option<Contact>),
    Page(Page<Contact>),
    User(User),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    detail: String,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            bail!("failed to initialize logging: {err}");
        }
        if let Some((level, dir)) = logging_status() {
            debug!(
                "event=cli_logging module=cli status=ok level={level} log_dir={}",
                dir.display()
            );
        }
    }
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );

    let mut conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let page = PageRequest::new(cli.page, cli.size);

    let command = match cli.command {
        Command::AddUser {
            email,
            username,
            password_hash,
        } => {
            let mut new_user = NewUser::new(email, password_hash);
            new_user.username = username;
            let repo = SqliteUserRepository::try_new(&conn)?;
            return match repo.create_user(&new_user) {
                Ok(user) => print_reply(&Reply::User(user)),
                Err(err @ RepoError::Conflict(_)) => print_error(409, err.to_string()),
                Err(err) => Err(err.into()),
            };
        }
        Command::DeleteUser => {
            let user = resolve_user(&conn, cli.user.as_deref())?;
            SqliteUserRepository::try_new(&conn)?.delete_user(user.id)?;
            return print_reply(&Reply::User(user));
        }
        Command::Contacts(command) => command,
    };

    let user = resolve_user(&conn, cli.user.as_deref())?;
    let outcome = unit_of_work(&mut conn, |tx| -> ServiceResult<Reply> {
        let service = ContactService::new(SqliteContactRepository::try_new(tx)?);
        dispatch(&service, &user, command, page)
    });

    match outcome {
        Ok(Reply::Contact(None)) => {
            print_error(NOT_FOUND_STATUS, "Contact Not Found".to_string())
        }
        Ok(Reply::Page(page)) if page.is_empty() => {
            debug!(
                "event=cli_page module=cli status=empty page={} total={}",
                page.page, page.total
            );
            print_reply(&Reply::Page(page))
        }
        Ok(reply) => print_reply(&reply),
        Err(ContactServiceError::Repo(err)) => Err(err.into()),
        Err(err) => print_error(err.status_code(), err.to_string()),
    }
}

fn dispatch<R: ContactRepository>(
    service: &ContactService<R>,
    user: &User,
    command: ContactCommand,
    page: PageRequest,
) -> ServiceResult<Reply> {
    let reply = match command {
        ContactCommand::List => Reply::Page(service.list(user, page)?),
        ContactCommand::Get { id } => Reply::Contact(service.get(user, id)?),
        ContactCommand::Add(contact) => {
            Reply::Contact(Some(service.create(user, &contact.into())?))
        }
        ContactCommand::Update { id, contact } => {
            Reply::Contact(service.update(user, id, &contact.into())?)
        }
        ContactCommand::Rename { id, name } => Reply::Contact(service.rename(user, id, &name)?),
        ContactCommand::Remove { id } => Reply::Contact(service.remove(user, id)?),
        ContactCommand::Find { field, value } => Reply::Contact(match field {
            FieldArg::Name => service.find_by_name(user, &value)?,
            FieldArg::LastName => service.find_by_last_name(user, &value)?,
            FieldArg::Email => service.find_by_email(user, &value)?,
            FieldArg::Phone => match value.parse::<i64>() {
                Ok(phone) => service.find_by_phone(user, phone)?,
                Err(_) => None,
            },
        }),
        ContactCommand::Search { field, fragment } => Reply::Page(match field {
            FieldArg::Name => service.find_by_name_contains(user, &fragment, page)?,
            FieldArg::LastName => service.find_by_last_name_contains(user, &fragment, page)?,
            FieldArg::Email => service.find_by_email_contains(user, &fragment, page)?,
            FieldArg::Phone => service.find_by_phone_contains(user, &fragment, page)?,
        }),
        ContactCommand::Birthdays { days, today } => Reply::Page(match today {
            Some(today) => service.birthdays_within_days_on(user, days, today, page)?,
            None => service.birthdays_within_days(user, days, page)?,
        }),
    };
    Ok(reply)
}

fn resolve_user(conn: &Connection, email: Option<&str>) -> Result<User> {
    let Some(email) = email else {
        bail!("--user (or CONTACTS_USER) is required for this command");
    };
    SqliteUserRepository::try_new(conn)?
        .find_user_by_email(email)?
        .with_context(|| format!("unknown user `{email}`"))
}

fn print_reply(reply: &Reply) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(reply)?);
    Ok(ExitCode::SUCCESS)
}

fn print_error(status: u16, detail: String) -> Result<ExitCode> {
    let body = ErrorBody { status, detail };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(ExitCode::FAILURE)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ContactCommand};
    use clap::{CommandFactory, Parser};
    use contacts_core::DEFAULT_PAGE_SIZE;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn page_size_defaults_to_core_default() {
        let cli = Cli::try_parse_from(["contacts", "list"]).unwrap();
        assert_eq!(cli.size, DEFAULT_PAGE_SIZE);
        assert_eq!(cli.page, 1);
        assert!(matches!(cli.command, Command::Contacts(ContactCommand::List)));
    }
}
