//! Domain model for users and their contacts.
//!
//! # Responsibility
//! - Define canonical data structures used by repositories and services.
//! - Keep client-supplied input separate from persisted records.
//!
//! # Invariants
//! - Every contact belongs to exactly one user (`Contact::user_id`).
//! - Client input never carries ownership; it is assigned server-side.
//! - Deletion is a hard delete, there are no tombstones.

pub mod contact;
pub mod user;
