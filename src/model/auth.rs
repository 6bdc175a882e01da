use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Viewer,
}

impl Role {
    /// Static role -> permission mapping. Permissions drive conditional UI
    /// only; route handlers stay the single enforcement point.
    pub fn permissions(self) -> Permissions {
        match self {
            Role::Admin | Role::Staff => Permissions {
                can_edit_players: true,
            },
            Role::Viewer => Permissions {
                can_edit_players: false,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub can_edit_players: bool,
}

/// Claims carried by the signed session cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

pub struct StaffAccount {
    pub password: &'static str,
    pub role: Role,
}

lazy_static! {
    // Development credentials; the directory is fixed at startup and the
    // application has no account management surface.
    static ref STAFF_DIRECTORY: HashMap<&'static str, StaffAccount> = HashMap::from([
        (
            "admin",
            StaffAccount {
                password: "admin123",
                role: Role::Admin,
            },
        ),
        (
            "staff",
            StaffAccount {
                password: "staff123",
                role: Role::Staff,
            },
        ),
        (
            "viewer",
            StaffAccount {
                password: "viewer123",
                role: Role::Viewer,
            },
        ),
    ]);
}

/// Username lookup is case-insensitive; the password comparison is not.
pub fn authenticate(username: &str, password: &str) -> Option<Role> {
    let username = username.trim().to_ascii_lowercase();
    STAFF_DIRECTORY
        .get(username.as_str())
        .filter(|account| account.password == password)
        .map(|account| account.role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_accounts_authenticate() {
        assert_eq!(authenticate("admin", "admin123"), Some(Role::Admin));
        assert_eq!(authenticate("  Staff ", "staff123"), Some(Role::Staff));
        assert_eq!(authenticate("viewer", "viewer123"), Some(Role::Viewer));
    }

    #[test]
    fn bad_credentials_are_rejected() {
        assert_eq!(authenticate("admin", "wrong"), None);
        assert_eq!(authenticate("nobody", "admin123"), None);
    }

    #[test]
    fn viewer_cannot_edit_players() {
        assert!(Role::Admin.permissions().can_edit_players);
        assert!(Role::Staff.permissions().can_edit_players);
        assert!(!Role::Viewer.permissions().can_edit_players);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Staff, Role::Viewer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
