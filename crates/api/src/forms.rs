//! Descriptions of the HTML forms the POST routes accept.
//!
//! The GET side of `/login`, `/register` and `/tickets/new` returns one of
//! these so a front end knows which fields to render and where to send them.

use serde::Serialize;

pub const ENCTYPE_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const ENCTYPE_MULTIPART: &str = "multipart/form-data";

/// A single input of a form.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    /// HTML input type (`text`, `password`, `email`, `textarea`, `file`).
    pub kind: &'static str,
    pub required: bool,
}

/// A form a client can submit.
#[derive(Debug, Clone, Serialize)]
pub struct FormDescriptor {
    pub action: String,
    pub method: &'static str,
    pub enctype: &'static str,
    pub fields: Vec<FormField>,
    /// Accepted attachment extensions, for forms with a file input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Vec<String>>,
}

const fn field(name: &'static str, kind: &'static str, required: bool) -> FormField {
    FormField {
        name,
        kind,
        required,
    }
}

pub fn login_form() -> FormDescriptor {
    FormDescriptor {
        action: "/login".into(),
        method: "POST",
        enctype: ENCTYPE_URLENCODED,
        fields: vec![
            field("username", "text", true),
            field("password", "password", true),
        ],
        allowed_extensions: None,
    }
}

pub fn register_form() -> FormDescriptor {
    FormDescriptor {
        action: "/register".into(),
        method: "POST",
        enctype: ENCTYPE_URLENCODED,
        fields: vec![
            field("username", "text", true),
            field("email", "email", false),
            field("password", "password", true),
        ],
        allowed_extensions: None,
    }
}

/// The new-ticket form. `submitted_by` is only meaningful for anonymous
/// visitors; a logged-in user is always recorded as the submitter.
pub fn new_ticket_form(allowed_extensions: &[String]) -> FormDescriptor {
    FormDescriptor {
        action: "/tickets/new".into(),
        method: "POST",
        enctype: ENCTYPE_MULTIPART,
        fields: vec![
            field("title", "text", true),
            field("description", "textarea", true),
            field("submitted_by", "text", false),
            field("attachment", "file", false),
        ],
        allowed_extensions: Some(allowed_extensions.to_vec()),
    }
}
