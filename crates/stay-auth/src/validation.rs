//! Local input checks run before any network call.

use crate::api::{AdminPayload, LoginRequest, OrganizationPayload};
use crate::error::AuthError;

/// Minimum password length accepted by the setup form.
pub const MIN_PASSWORD_LEN: usize = 8;

fn required(value: &str, label: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{label} is required")));
    }
    Ok(())
}

/// Build a login request from form input.
///
/// `organization_slug = None` selects the system-owner login; a provided slug
/// must not be blank.
///
/// # Errors
///
/// Returns `AuthError::Validation` naming the first missing field.
pub fn login_request(
    email: &str,
    password: &str,
    organization_slug: Option<&str>,
) -> Result<LoginRequest, AuthError> {
    required(email, "Email")?;
    required(password, "Password")?;
    if let Some(slug) = organization_slug {
        required(slug, "Organization")?;
    }

    Ok(LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
        organization_slug: organization_slug.map(|slug| slug.trim().to_string()),
    })
}

/// Check the first-run setup form.
///
/// # Errors
///
/// Returns `AuthError::Validation` for a missing field, a password shorter than
/// [`MIN_PASSWORD_LEN`], or a confirmation that does not match exactly.
pub fn bootstrap(organization: &OrganizationPayload, admin: &AdminPayload) -> Result<(), AuthError> {
    required(&organization.name, "Organization name")?;
    required(&organization.slug, "Organization slug")?;
    required(&admin.email, "Administrator email")?;
    required(&admin.first_name, "Administrator first name")?;
    required(&admin.last_name, "Administrator last name")?;
    required(&admin.password, "Password")?;

    if admin.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if admin.password != admin.password_confirm {
        return Err(AuthError::Validation("Passwords do not match".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organization() -> OrganizationPayload {
        OrganizationPayload {
            name: "Hotel Paradise".into(),
            slug: "hotel-paradise".into(),
            ..Default::default()
        }
    }

    fn admin(password: &str, confirm: &str) -> AdminPayload {
        AdminPayload {
            email: "admin@paradise.example".into(),
            first_name: "Ada".into(),
            last_name: "Lind".into(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn login_trims_email_and_slug_but_not_password() {
        let request = login_request(" a@x.com ", " secret123 ", Some(" hotel-paradise ")).unwrap();
        assert_eq!(request.email, "a@x.com");
        assert_eq!(request.password, " secret123 ");
        assert_eq!(request.organization_slug.as_deref(), Some("hotel-paradise"));
    }

    #[test]
    fn login_without_slug_is_system_owner_path() {
        let request = login_request("root@x.com", "secret123", None).unwrap();
        assert!(request.organization_slug.is_none());
    }

    #[test]
    fn login_rejects_blank_fields() {
        assert_eq!(
            login_request("", "secret123", None).unwrap_err(),
            AuthError::Validation("Email is required".into())
        );
        assert_eq!(
            login_request("a@x.com", "", None).unwrap_err(),
            AuthError::Validation("Password is required".into())
        );
        assert_eq!(
            login_request("a@x.com", "secret123", Some("  ")).unwrap_err(),
            AuthError::Validation("Organization is required".into())
        );
    }

    #[test]
    fn bootstrap_accepts_valid_form() {
        assert!(bootstrap(&organization(), &admin("longenough", "longenough")).is_ok());
    }

    #[test]
    fn bootstrap_rejects_short_password() {
        let err = bootstrap(&organization(), &admin("short", "short")).unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }

    #[test]
    fn bootstrap_counts_characters_not_bytes() {
        assert!(bootstrap(&organization(), &admin("ååååååå", "ååååååå")).is_err());
        assert!(bootstrap(&organization(), &admin("åååååååå", "åååååååå")).is_ok());
    }

    #[test]
    fn bootstrap_rejects_mismatched_confirmation() {
        let err = bootstrap(&organization(), &admin("longenough", "longenougH")).unwrap_err();
        assert_eq!(err, AuthError::Validation("Passwords do not match".into()));
    }

    #[test]
    fn bootstrap_requires_organization_slug() {
        let mut org = organization();
        org.slug = String::new();
        let err = bootstrap(&org, &admin("longenough", "longenough")).unwrap_err();
        assert_eq!(err, AuthError::Validation("Organization slug is required".into()));
    }
}
