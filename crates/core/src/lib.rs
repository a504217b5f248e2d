//! Domain rules for Deskline that need no I/O.
//!
//! Everything here is plain data and arithmetic so the repository layer,
//! the HTTP layer and tests can share a single definition of each rule.

pub mod account;
pub mod dashboard;
pub mod error;
pub mod presence;
pub mod ticket;
pub mod types;
pub mod upload;
