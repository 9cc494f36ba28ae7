//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a required text field is present and non-blank.
pub fn validate_required_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(format!("{field} must not be empty").into());
        return Err(err);
    }
    Ok(())
}

/// Validates a scheduling date in `YYYY-MM-DD` form.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    let mut parts = value.splitn(3, '-');
    let year = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();
    let day = parts.next().unwrap_or_default();

    let shape_ok = year.len() == 4
        && month.len() == 2
        && day.len() == 2
        && [year, month, day]
            .iter()
            .all(|part| part.chars().all(|c| c.is_ascii_digit()));

    if !shape_ok {
        let mut err = ValidationError::new("date_format");
        err.message = Some("date must be formatted as YYYY-MM-DD".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a kick-off time in 24-hour `HH:MM` form.
pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    let shape_ok = matches!(value.split_once(':'), Some((hours, minutes))
        if hours.len() == 2
            && minutes.len() == 2
            && hours.chars().all(|c| c.is_ascii_digit())
            && minutes.chars().all(|c| c.is_ascii_digit()));

    if !shape_ok {
        let mut err = ValidationError::new("time_format");
        err.message = Some("time must be formatted as HH:MM".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a member id so it is safe to use as a document field path.
///
/// Dots and dollar signs are significant to the document store's partial
/// update syntax and must never appear inside a squad key.
pub fn validate_member_id(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("member_id_empty");
        err.message = Some("member id must not be empty".into());
        return Err(err);
    }

    if value.contains(['.', '$']) || value.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("member_id_format");
        err.message = Some("member id must not contain dots, dollar signs or whitespace".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_valid() {
        assert!(validate_date("2026-03-14").is_ok());
        assert!(validate_date("1999-12-31").is_ok());
    }

    #[test]
    fn test_validate_date_invalid() {
        assert!(validate_date("14/03/2026").is_err());
        assert!(validate_date("2026-3-14").is_err()); // unpadded month
        assert!(validate_date("2026-03").is_err()); // missing day
        assert!(validate_date("").is_err());
    }

    #[test]
    fn test_validate_time_valid() {
        assert!(validate_time("09:00").is_ok());
        assert!(validate_time("23:59").is_ok());
    }

    #[test]
    fn test_validate_time_invalid() {
        assert!(validate_time("9:00").is_err()); // unpadded hour
        assert!(validate_time("0900").is_err()); // missing separator
        assert!(validate_time("2pm").is_err());
        assert!(validate_time("").is_err());
    }

    #[test]
    fn test_validate_member_id_valid() {
        assert!(validate_member_id("alice").is_ok());
        assert!(validate_member_id("uid_1234-xyz").is_ok());
    }

    #[test]
    fn test_validate_member_id_invalid() {
        assert!(validate_member_id("").is_err());
        assert!(validate_member_id("a.b").is_err()); // field path separator
        assert!(validate_member_id("$set").is_err()); // operator prefix
        assert!(validate_member_id("alice smith").is_err()); // whitespace
    }
}
