//! User accounts: registration, credential checks and profile updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{DomainError, DomainResult, Entity, UserId};

use crate::{PasswordHash, Role};

const MIN_PASSWORD_LEN: usize = 6;

/// Stored user record. Carries the password digest, so it never leaves the service as-is;
/// responses use [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl User {
    pub fn register(input: NewUser, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate_name(&input.name)?;
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;

        Ok(Self {
            id: UserId::new(),
            name,
            email,
            role: input.role,
            password_hash: hash_password(&input.password)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn verify_password(&self, plain: &str) -> bool {
        self.password_hash.verify(plain)
    }

    /// Apply a partial update. Role changes are policy-checked by the caller.
    pub fn apply_update(&mut self, update: UserUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = update.name {
            self.name = validate_name(&name)?;
        }
        if let Some(email) = update.email {
            self.email = normalize_email(&email)?;
        }
        if let Some(password) = update.password {
            validate_password(&password)?;
            self.password_hash = hash_password(&password)?;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Trim and lowercase an email; emails are unique case-insensitively.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::validation("email must look like name@domain")),
    }
}

fn validate_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_password(raw: &str) -> DomainResult<()> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn hash_password(plain: &str) -> DomainResult<PasswordHash> {
    PasswordHash::hash(plain).map_err(|e| DomainError::invariant(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            name: "  Ada  ".to_string(),
            email: "Ada@Example.COM".to_string(),
            password: "secret1".to_string(),
            role: Role::Attendee,
        }
    }

    #[test]
    fn register_normalizes_and_hashes() {
        let user = User::register(new_user(), Utc::now()).unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.verify_password("secret1"));
        assert!(!user.verify_password("secret2"));
    }

    #[test]
    fn register_rejects_bad_input() {
        let short = NewUser { password: "12345".into(), ..new_user() };
        assert!(matches!(User::register(short, Utc::now()), Err(DomainError::Validation(_))));

        let no_at = NewUser { email: "nobody".into(), ..new_user() };
        assert!(matches!(User::register(no_at, Utc::now()), Err(DomainError::Validation(_))));

        let blank = NewUser { name: "   ".into(), ..new_user() };
        assert!(matches!(User::register(blank, Utc::now()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn profile_never_contains_password_hash() {
        let user = User::register(new_user(), Utc::now()).unwrap();
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "attendee");
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut user = User::register(new_user(), Utc::now()).unwrap();
        let update = UserUpdate {
            password: Some("another1".into()),
            ..Default::default()
        };
        user.apply_update(update, Utc::now()).unwrap();

        assert_eq!(user.name, "Ada");
        assert!(user.verify_password("another1"));
    }
}
