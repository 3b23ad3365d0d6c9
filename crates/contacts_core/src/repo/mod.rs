//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define owner-scoped data access contracts for contacts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Contact queries are always scoped by the calling user's id.
//! - Not-found is absence (`None`); the only domain error is `Conflict`.

pub mod contact_repo;
pub mod page;
mod schema_guard;
pub mod user_repo;
