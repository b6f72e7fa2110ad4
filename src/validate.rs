use regex::Regex;

/// One inline form error, tied to the offending field. Validation failures
/// stay in the calling form; the store never sees an invalid record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^\S+@\S+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Check the applicant identity step: name, email, phone.
pub fn validate_applicant(name: &str, email: &str, phone: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if name.trim().chars().count() < 2 {
        errors.push(FieldError {
            field: "name",
            message: "Name must have at least 2 characters",
        });
    }
    if !is_valid_email(email) {
        errors.push(FieldError {
            field: "email",
            message: "Invalid email",
        });
    }
    if phone.chars().count() < 10 {
        errors.push(FieldError {
            field: "phone",
            message: "Invalid phone number",
        });
    }
    errors
}

/// An optional cover letter must carry some substance when present.
pub fn validate_cover_letter(cover_letter: &str) -> Vec<FieldError> {
    if cover_letter.chars().count() < 50 {
        vec![FieldError {
            field: "cover-letter",
            message: "Cover letter must be at least 50 characters",
        }]
    } else {
        Vec::new()
    }
}
