//! Bootstrap administrator configuration from environment variables.
//!
//! A fresh database has no back-office account. When `ADMIN_EMAIL` and
//! `ADMIN_PASSWORD` are both set, startup creates (or promotes) that account.

/// Credentials of the bootstrap administrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Reads `ADMIN_EMAIL` and `ADMIN_PASSWORD` from the environment.
///
/// # Returns
///
/// `Some` only when both variables are set and non-blank.
#[must_use]
pub fn get_admin_credentials() -> Option<AdminCredentials> {
    let email = std::env::var("ADMIN_EMAIL").ok()?;
    let password = std::env::var("ADMIN_PASSWORD").ok()?;
    credentials_from(&email, &password)
}

fn credentials_from(email: &str, password: &str) -> Option<AdminCredentials> {
    if email.trim().is_empty() || password.is_empty() {
        return None;
    }
    Some(AdminCredentials {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}
