use serde::Serialize;

/// Login identity as held by the user directory.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<String>,
}

/// Splits the comma separated `roles` column.
pub fn split_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_column_is_comma_separated() {
        assert_eq!(split_roles("ADMIN, HR"), vec!["ADMIN", "HR"]);
        assert!(split_roles("").is_empty());
        assert_eq!(split_roles(",EMPLOYEE,"), vec!["EMPLOYEE"]);
    }
}
