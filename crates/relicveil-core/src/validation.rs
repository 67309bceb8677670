//! Client-side form constraints.
//!
//! Everything here runs before a network call is made. A failed check means
//! no request is sent.

use thiserror::Error;
use url::Url;

use crate::models::{ArtifactForm, ArtifactType};

/// Minimum password length accepted by the registration form
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown artifact type: {0}")]
    UnknownArtifactType(String),

    #[error("Artifact image must be a valid http(s) URL")]
    InvalidImageUrl,
}

/// Check the registration password rules, first failure wins
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    Ok(())
}

/// Loose email shape check: `local@domain`, no whitespace.
/// The identity provider does the real validation.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Check the add/edit artifact form
pub fn validate_artifact_form(form: &ArtifactForm) -> Result<(), ValidationError> {
    let required = [
        ("Artifact name", &form.name),
        ("Artifact image", &form.image),
        ("Artifact type", &form.artifact_type),
        ("Historical context", &form.historical_context),
        ("Short description", &form.description),
        ("Created at", &form.created_at),
        ("Discovered at", &form.discovered_at),
        ("Discovered by", &form.discovered_by),
        ("Present location", &form.present_location),
    ];
    for (label, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(label));
        }
    }

    form.artifact_type
        .parse::<ArtifactType>()
        .map_err(|_| ValidationError::UnknownArtifactType(form.artifact_type.clone()))?;

    match Url::parse(form.image.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(ValidationError::InvalidImageUrl),
    }
}

/// Check the form and return it as it should be sent: every field trimmed
/// and the type spelled exactly as the service lists it.
pub fn normalize_artifact_form(form: ArtifactForm) -> Result<ArtifactForm, ValidationError> {
    validate_artifact_form(&form)?;
    let artifact_type: ArtifactType = form
        .artifact_type
        .parse()
        .map_err(|_| ValidationError::UnknownArtifactType(form.artifact_type.clone()))?;

    let trim = |value: String| value.trim().to_string();
    Ok(ArtifactForm {
        name: trim(form.name),
        image: trim(form.image),
        artifact_type: artifact_type.as_str().to_string(),
        historical_context: trim(form.historical_context),
        description: trim(form.description),
        created_at: trim(form.created_at),
        discovered_at: trim(form.discovered_at),
        discovered_by: trim(form.discovered_by),
        present_location: trim(form.present_location),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> ArtifactForm {
        ArtifactForm {
            name: "Antikythera mechanism".to_string(),
            image: "https://example.org/antikythera.png".to_string(),
            artifact_type: "Tools".to_string(),
            historical_context: "Hellenistic astronomy".to_string(),
            description: "Hand-powered orrery".to_string(),
            created_at: "100 BC".to_string(),
            discovered_at: "1901".to_string(),
            discovered_by: "Sponge divers".to_string(),
            present_location: "Athens".to_string(),
        }
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(validate_password("Ab1"), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_password("abcdef"), Err(ValidationError::PasswordMissingUppercase));
        assert_eq!(validate_password("ABCDEF"), Err(ValidationError::PasswordMissingLowercase));
        assert_eq!(validate_password("Abcdef"), Ok(()));
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("ada@example.org").is_ok());
        assert!(validate_email("  ada@example.org ").is_ok());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.org").is_err());
        assert!(validate_email("ada@").is_err());
        assert!(validate_email("a da@example.org").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_artifact_form() {
        assert_eq!(validate_artifact_form(&complete_form()), Ok(()));

        let mut form = complete_form();
        form.discovered_by = "   ".to_string();
        assert_eq!(
            validate_artifact_form(&form),
            Err(ValidationError::MissingField("Discovered by"))
        );

        let mut form = complete_form();
        form.artifact_type = "Spaceship".to_string();
        assert_eq!(
            validate_artifact_form(&form),
            Err(ValidationError::UnknownArtifactType("Spaceship".to_string()))
        );

        let mut form = complete_form();
        form.image = "ftp://example.org/a.png".to_string();
        assert_eq!(validate_artifact_form(&form), Err(ValidationError::InvalidImageUrl));

        form.image = "not a url".to_string();
        assert_eq!(validate_artifact_form(&form), Err(ValidationError::InvalidImageUrl));
    }

    #[test]
    fn test_normalized_form_uses_canonical_type() {
        let mut form = complete_form();
        form.artifact_type = " religious items ".to_string();
        form.name = "  Antikythera mechanism\n".to_string();
        form.image = " https://example.org/antikythera.png ".to_string();

        let normalized = normalize_artifact_form(form).unwrap();
        assert_eq!(normalized.artifact_type, "Religious Items");
        assert_eq!(normalized.name, "Antikythera mechanism");
        assert_eq!(normalized.image, "https://example.org/antikythera.png");
        assert_eq!(normalized.present_location, "Athens");

        let mut form = complete_form();
        form.artifact_type = "Spaceship".to_string();
        assert!(normalize_artifact_form(form).is_err());
    }
}
