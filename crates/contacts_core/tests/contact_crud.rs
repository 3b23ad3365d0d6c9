use chrono::NaiveDate;
use contacts_core::db::open_db_in_memory;
use contacts_core::{
    ContactInput, ContactRepository, DuplicateField, NewUser, PageRequest, RepoError,
    SqliteContactRepository, SqliteUserRepository, User, UserRepository,
};
use rusqlite::Connection;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let created = repo
        .create_contact(&user, &input("Taras", "Shevchenko", "taras@example.com", 380501112233))
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.user_id, user.id);

    let loaded = repo.get_contact(&user, created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.birthday, date(1990, 3, 9));
    assert_eq!(loaded.description.as_deref(), Some("met at a conference"));
}

#[test]
fn get_missing_contact_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    assert!(repo.get_contact(&user, 9999).unwrap().is_none());
}

#[test]
fn list_is_ordered_by_name_and_paginated() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    for (index, name) in ["Mykola", "Anna", "Yulia", "Bohdan", "Iryna"].iter().enumerate() {
        let phone = 1000 + index as i64;
        repo.create_contact(
            &user,
            &input(name, "Test", &format!("{name}@example.com"), phone),
        )
        .unwrap();
    }

    let first = repo.list_contacts(&user, PageRequest::new(1, 2)).unwrap();
    assert_eq!(first.total, 5);
    assert_eq!(first.pages, 3);
    assert_eq!(names(&first.items), vec!["Anna", "Bohdan"]);

    let last = repo.list_contacts(&user, PageRequest::new(3, 2)).unwrap();
    assert_eq!(names(&last.items), vec!["Yulia"]);

    let beyond = repo.list_contacts(&user, PageRequest::new(4, 2)).unwrap();
    assert!(beyond.is_empty());
    assert_eq!(beyond.total, 5);
}

#[test]
fn duplicate_email_phone_and_full_name_are_rejected_in_that_order() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    repo.create_contact(&user, &input("Lesya", "Ukrainka", "lesya@example.com", 111))
        .unwrap();

    let all_collide = input("Lesya", "Ukrainka", "lesya@example.com", 111);
    assert!(matches!(
        repo.create_contact(&user, &all_collide),
        Err(RepoError::Conflict(DuplicateField::Email))
    ));

    let phone_and_name = input("Lesya", "Ukrainka", "other@example.com", 111);
    assert!(matches!(
        repo.create_contact(&user, &phone_and_name),
        Err(RepoError::Conflict(DuplicateField::Phone))
    ));

    let name_only = input("Lesya", "Ukrainka", "third@example.com", 222);
    assert!(matches!(
        repo.create_contact(&user, &name_only),
        Err(RepoError::Conflict(DuplicateField::FullName))
    ));

    assert_eq!(contact_rows(&conn), 1);
}

#[test]
fn same_first_name_with_different_last_name_is_not_a_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    repo.create_contact(&user, &input("Ivan", "Franko", "ivan@example.com", 1))
        .unwrap();

    repo.create_contact(&user, &input("Ivan", "Bahrianyi", "bahrianyi@example.com", 2))
        .unwrap();
    assert_eq!(contact_rows(&conn), 2);
}

#[test]
fn update_replaces_fields_but_keeps_birthday() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let created = repo
        .create_contact(&user, &input("Old", "Name", "old@example.com", 100))
        .unwrap();

    let mut replacement = input("New", "Surname", "new@example.com", 200);
    replacement.birthday = date(2001, 12, 25);
    replacement.description = None;

    let updated = repo
        .update_contact(&user, created.id, &replacement)
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(updated.last_name, "Surname");
    assert_eq!(updated.email, "new@example.com");
    assert_eq!(updated.phone, 200);
    assert_eq!(updated.description, None);
    assert_eq!(updated.birthday, created.birthday);
}

#[test]
fn update_missing_contact_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let result = repo
        .update_contact(&user, 12345, &input("A", "B", "a@b.cd", 1))
        .unwrap();
    assert!(result.is_none());
    assert_eq!(contact_rows(&conn), 0);
}

#[test]
fn rename_changes_only_name() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let created = repo
        .create_contact(&user, &input("Volodymyr", "Sosiura", "vs@example.com", 77))
        .unwrap();

    let renamed = repo
        .rename_contact(&user, created.id, "Volodia")
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Volodia");
    assert_eq!(
        renamed,
        contacts_core::Contact {
            name: "Volodia".to_string(),
            ..created
        }
    );

    assert!(repo.rename_contact(&user, 4242, "Nobody").unwrap().is_none());
}

#[test]
fn remove_returns_snapshot_and_hard_deletes() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let created = repo
        .create_contact(&user, &input("Marusia", "Churai", "mc@example.com", 5))
        .unwrap();

    let removed = repo.remove_contact(&user, created.id).unwrap().unwrap();
    assert_eq!(removed, created);
    assert!(repo.get_contact(&user, created.id).unwrap().is_none());
    assert_eq!(contact_rows(&conn), 0);

    assert!(repo.remove_contact(&user, created.id).unwrap().is_none());
}

#[test]
fn removed_contact_data_can_be_created_again() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let payload = input("Hryhorii", "Skovoroda", "hs@example.com", 1722);
    let created = repo.create_contact(&user, &payload).unwrap();
    repo.remove_contact(&user, created.id).unwrap();

    let recreated = repo.create_contact(&user, &payload).unwrap();
    assert_ne!(recreated.id, created.id);
}

fn register(conn: &Connection, email: &str) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&NewUser::new(email, "argon2-hash"))
        .unwrap()
}

fn input(name: &str, last_name: &str, email: &str, phone: i64) -> ContactInput {
    ContactInput {
        name: name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone,
        birthday: date(1990, 3, 9),
        description: Some("met at a conference".to_string()),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn names(items: &[contacts_core::Contact]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

fn contact_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))
        .unwrap()
}
