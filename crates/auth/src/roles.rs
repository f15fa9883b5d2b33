use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cashguard_core::DomainError;

/// Role of a user. Drives which views and actions are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Accountant,
    Operator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Accountant, Role::Operator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Accountant => "ACCOUNTANT",
            Role::Operator => "OPERATOR",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "ACCOUNTANT" => Ok(Role::Accountant),
            "OPERATOR" => Ok(Role::Operator),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}' (expected ADMIN, ACCOUNTANT or OPERATOR)"
            ))),
        }
    }
}
