use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Account role. The set is closed: the API never issues anything else,
/// and deserialization of an unknown value is a hard failure rather than
/// a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular customer browsing and requesting services.
    User,
    /// Service professional offering work through the platform.
    Master,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Master, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Master => "MASTER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "MASTER" => Ok(Role::Master),
            "ADMIN" => Ok(Role::Admin),
            other => Err(ValidationError::new(format!("unknown role: {other}"))),
        }
    }
}
