//! Input validation that runs before any network call.

use crate::error::ValidationError;
use regex_lite::Regex;
use std::sync::LazyLock;
use tutordesk_types::{Appointment, ContactInquiry, ManualMatch, MatchProfile, Repository, Status};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .ok()
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Login form: email then password, first failure wins.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField("Email address"));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), ValidationError> {
    validate_credentials(email, password)?;
    require(name, "Full name")
}

pub fn validate_inquiry(inquiry: &ContactInquiry) -> Result<(), ValidationError> {
    require(&inquiry.name, "Name")?;
    require(&inquiry.email, "Email")
}

/// Intake fields of a new booking.
pub fn validate_booking(appointment: &Appointment) -> Result<(), ValidationError> {
    require(&appointment.parent_name, "Parent name")?;
    require(&appointment.phone, "Phone")?;
    require(&appointment.date, "Date")?;
    require(&appointment.time, "Time")
}

pub fn validate_manual_match(record: &ManualMatch) -> Result<(), ValidationError> {
    require(&record.parent_name, "Parent name")?;
    require(&record.phone_number, "Phone number")
}

pub fn validate_repository(repository: &Repository) -> Result<(), ValidationError> {
    require(&repository.name, "Name")?;
    require(&repository.url, "URL")
}

/// A profile can only be finalized once its requirements are filled in.
pub fn validate_profile_for_finalize(profile: &MatchProfile) -> Result<(), ValidationError> {
    if profile.selected_class.trim().is_empty() {
        return Err(ValidationError::IncompleteProfile("class not selected"));
    }
    if profile.parent_budget.trim().is_empty() {
        return Err(ValidationError::IncompleteProfile("budget missing"));
    }
    let manual_name_missing = profile
        .manual_subject_name
        .as_deref()
        .is_none_or(|name| name.trim().is_empty());
    if profile.is_manual_subject && manual_name_missing {
        return Err(ValidationError::IncompleteProfile("manual subject name missing"));
    }
    Ok(())
}

/// An appointment may only be Completed once its profile is finalized.
pub fn ensure_completion_allowed(appointment: &Appointment) -> Result<(), ValidationError> {
    if appointment.status == Status::Completed && !appointment.is_profile_finalized() {
        return Err(ValidationError::ProfileNotFinalized);
    }
    Ok(())
}
