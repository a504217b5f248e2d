//! The capability of being authenticated with a username and password.

use deskline_db::models::user::User;

use crate::auth::password::verify_password;

/// An identity that can be looked up by username and checked against a password.
pub trait Authenticatable {
    fn username(&self) -> &str;

    /// Stored PHC hash; never the plaintext.
    fn password_hash(&self) -> &str;

    fn check_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        verify_password(password, self.password_hash())
    }
}

impl Authenticatable for User {
    fn username(&self) -> &str {
        &self.username
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}
