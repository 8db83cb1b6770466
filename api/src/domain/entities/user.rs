//! User domain entity
//!
//! Represents a person whose attendance is tracked. Users are never removed
//! physically; deletion sets `deleted_at` so attendance history keeps a valid
//! reference.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Opaque identifier for a user, assigned once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Identifier in the external auth provider (unique)
    pub auth_id: String,
    pub name: String,
    /// Unique
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Active users are those that have not been soft-deleted.
    ///
    /// Every default read path filters on this predicate.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Apply the mutable fields from `changes`
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(auth_id) = changes.auth_id {
            self.auth_id = auth_id;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
    }

    /// Check the field-level rules shared by create and update
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.auth_id, &self.name, &self.email, &self.role)
    }
}

/// Data needed to create a new user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.auth_id, &self.name, &self.email, &self.role)
    }
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserChanges {
    pub auth_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
    })
}

fn validate_fields(auth_id: &str, name: &str, email: &str, role: &str) -> Result<(), DomainError> {
    for (field, value) in [("auth_id", auth_id), ("name", name), ("role", role)] {
        if value.trim().is_empty() {
            return Err(DomainError::Validation(format!("{} must not be empty", field)));
        }
    }
    if !email_pattern().is_match(email) {
        return Err(DomainError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}
