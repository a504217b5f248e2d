pub mod auth;
pub mod dashboard;
pub mod tickets;
pub mod users;
