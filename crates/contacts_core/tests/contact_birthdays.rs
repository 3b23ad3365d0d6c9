use chrono::NaiveDate;
use contacts_core::db::open_db_in_memory;
use contacts_core::{
    Contact, ContactInput, ContactRepository, NewUser, PageRequest, SqliteContactRepository,
    SqliteUserRepository, User, UserRepository,
};
use rusqlite::Connection;

#[test]
fn window_spanning_new_year_includes_january_birthdays() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    add(&repo, &user, "January", date(2025, 1, 3));
    add(&repo, &user, "NewYearsEve", date(1970, 12, 31));
    add(&repo, &user, "MidDecember", date(1999, 12, 17));
    add(&repo, &user, "LateJanuary", date(1999, 1, 8));

    let page = repo
        .find_birthdays_within_days(&user, 10, date(2024, 12, 28), PageRequest::default())
        .unwrap();
    assert_eq!(names(&page.items), vec!["January", "NewYearsEve"]);
}

#[test]
fn zero_days_returns_only_todays_birthdays() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    add(&repo, &user, "Today", date(1988, 8, 24));
    add(&repo, &user, "Tomorrow", date(1988, 8, 25));
    add(&repo, &user, "Yesterday", date(1988, 8, 23));

    let page = repo
        .find_birthdays_within_days(&user, 0, date(2024, 8, 24), PageRequest::default())
        .unwrap();
    assert_eq!(names(&page.items), vec!["Today"]);
}

#[test]
fn window_within_one_year_is_bounded_on_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    add(&repo, &user, "Start", date(1990, 5, 1));
    add(&repo, &user, "End", date(1991, 5, 8));
    add(&repo, &user, "After", date(1992, 5, 9));
    add(&repo, &user, "Before", date(1993, 4, 30));
    add(&repo, &user, "January", date(1994, 1, 2));

    let page = repo
        .find_birthdays_within_days(&user, 7, date(2024, 5, 1), PageRequest::default())
        .unwrap();
    assert_eq!(names(&page.items), vec!["End", "Start"]);
}

#[test]
fn leap_day_birthday_is_found_in_non_leap_year() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    add(&repo, &user, "LeapDay", date(2000, 2, 29));

    let page = repo
        .find_birthdays_within_days(&user, 2, date(2023, 2, 28), PageRequest::default())
        .unwrap();
    assert_eq!(names(&page.items), vec!["LeapDay"]);
}

#[test]
fn multi_year_window_includes_month_days_before_today() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    add(&repo, &user, "February", date(1991, 2, 15));
    add(&repo, &user, "March", date(1991, 3, 1));

    let page = repo
        .find_birthdays_within_days(&user, 700, date(2023, 3, 1), PageRequest::default())
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(names(&page.items), vec!["February", "March"]);
}

#[test]
fn five_digit_birth_year_still_matches_by_month_and_day() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    add(&repo, &user, "FarFuture", date(10000, 6, 1));
    add(&repo, &user, "Regular", date(1990, 6, 2));

    let today = repo
        .find_birthdays_within_days(&user, 0, date(2024, 6, 1), PageRequest::default())
        .unwrap();
    assert_eq!(names(&today.items), vec!["FarFuture"]);

    let stored = repo.get_contact(&user, today.items[0].id).unwrap().unwrap();
    assert_eq!(stored.birthday, date(10000, 6, 1));
}

#[test]
fn birthday_results_are_paginated() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    for day in 1..=4 {
        add(&repo, &user, &format!("June{day}"), date(1980, 6, day));
    }

    let page = repo
        .find_birthdays_within_days(&user, 30, date(2024, 6, 1), PageRequest::new(2, 3))
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(names(&page.items), vec!["June4"]);
}

fn register(conn: &Connection) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&NewUser::new("owner@example.com", "argon2-hash"))
        .unwrap()
}

fn add(repo: &SqliteContactRepository<'_>, user: &User, name: &str, birthday: NaiveDate) {
    let phone: i64 = birthday.format("%Y%m%d").to_string().parse().unwrap();
    repo.create_contact(
        user,
        &ContactInput {
            name: name.to_string(),
            last_name: "Birthday".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone,
            birthday,
            description: None,
        },
    )
    .unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn names(items: &[Contact]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}
