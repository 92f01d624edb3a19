use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role tag carried by every user account.
///
/// The legacy value `organizer` is accepted as an alias of `admin`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "organizer")]
    Admin,
    Exhibitor,
    Attendee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Exhibitor, Role::Attendee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Exhibitor => "exhibitor",
            Role::Attendee => "attendee",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "organizer" => Ok(Role::Admin),
            "exhibitor" => Ok(Role::Exhibitor),
            "attendee" => Ok(Role::Attendee),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organizer_deserializes_as_admin() {
        let role: Role = serde_json::from_str("\"organizer\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"admin\"");
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("Exhibitor".parse::<Role>().unwrap(), Role::Exhibitor);
        assert!("guest".parse::<Role>().is_err());
    }
}
