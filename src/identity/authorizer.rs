//! Admin decision rule: role claim first (app-level, then user-level), then
//! case-insensitive membership in the operator-configured email allow-list.
//! No other signals are considered.

use super::principal::Principal;

const ADMIN_ROLE: &str = "admin";

/// Allow-list read fresh from the environment on every check so operators can
/// extend admin access without a redeploy.
pub fn admin_allowlist() -> String {
    std::env::var("ADMIN_EMAILS").unwrap_or_default()
}

pub fn is_admin(principal: &Principal, allowlist: &str) -> bool {
    if principal.role() == Some(ADMIN_ROLE) {
        return true;
    }
    let email = match principal.email.as_deref() {
        Some(e) if !e.trim().is_empty() => e.trim().to_lowercase(),
        _ => return false,
    };
    allowlist
        .split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .any(|entry| entry == email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(email: Option<&str>, app_role: Option<&str>, user_role: Option<&str>) -> Principal {
        Principal {
            user_id: "u1".into(),
            email: email.map(|s| s.to_string()),
            app_role: app_role.map(|s| s.to_string()),
            user_role: user_role.map(|s| s.to_string()),
        }
    }

    #[test]
    fn role_claim_allows_regardless_of_allowlist() {
        let p = principal(Some("chef@example.com"), Some("admin"), None);
        assert!(is_admin(&p, ""));
        let p = principal(None, None, Some("admin"));
        assert!(is_admin(&p, ""));
    }

    #[test]
    fn app_level_role_shadows_user_level() {
        // A non-admin app-level claim wins over an admin user-level claim.
        let p = principal(Some("staff@example.com"), Some("staff"), Some("admin"));
        assert!(!is_admin(&p, ""));
    }

    #[test]
    fn allowlist_is_case_insensitive_and_trimmed() {
        let p = principal(Some("Chef@Example.COM"), None, None);
        assert!(is_admin(&p, " owner@example.com , chef@example.com "));
        assert!(!is_admin(&p, "owner@example.com"));
    }

    #[test]
    fn missing_email_without_role_denies() {
        let p = principal(None, None, None);
        assert!(!is_admin(&p, "chef@example.com"));
    }
}
