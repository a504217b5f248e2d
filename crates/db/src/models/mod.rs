//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts

pub mod attachment;
pub mod comment;
pub mod session;
pub mod ticket;
pub mod user;
