//! Team member entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// Access role within the team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Sales,
    Management,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Sales => write!(f, "sales"),
            Role::Management => write!(f, "management"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sales" => Ok(Role::Sales),
            "management" => Ok(Role::Management),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A team member who can log visits
///
/// Passwords are stored in plain text, matching the system this replaces.
/// The workspace is trusted local state, not a security boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    /// Unique within the roster
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub join_date: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        join_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::new(crate::core::identity::EntityPrefix::User),
            name: name.into(),
            email: email.into(),
            role,
            password: None,
            join_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_role_parse() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("sales".parse::<Role>().unwrap(), Role::Sales);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_yaml_roundtrip() {
        let mut user = User::new(
            "Demo Administrator",
            "admin@demo.com",
            Role::Admin,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        user.password = Some("admin123".to_string());

        let yaml = serde_yml::to_string(&user).unwrap();
        let back: User = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back.email, "admin@demo.com");
        assert_eq!(back.role, Role::Admin);
        assert_eq!(back.password.as_deref(), Some("admin123"));
    }
}
