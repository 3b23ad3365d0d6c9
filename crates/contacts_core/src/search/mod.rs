//! Search helpers that are independent of SQL.
//!
//! # Responsibility
//! - Calendar math for the upcoming-birthdays query.

pub mod birthday;
