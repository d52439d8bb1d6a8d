use strum_macros::{Display, EnumString};

/// Role codes carried in the session token. Unknown codes are ignored.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Hr,
    Manager,
    Employee,
}

impl Role {
    pub fn from_code(code: &str) -> Option<Self> {
        code.trim().parse().ok()
    }

    /// Roles allowed to decide on requests and see system-wide reports.
    pub fn can_approve(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr | Role::Manager)
    }
}
