//! Field validation for operator-supplied record data
//!
//! These checks run before any lookup or write, so a bad field never
//! costs a network call or touches the store.

use crate::error::Error;

/// Validate a record name: trimmed, 2-60 characters, at least one
/// alphanumeric character (accented letters count).
pub fn validate_name(name: &str) -> Result<(), Error> {
    let name = name.trim();
    let len = name.chars().count();
    if !(2..=60).contains(&len) {
        return Err(Error::validation("name", "must be 2 to 60 characters"));
    }
    if !name.chars().any(|c| c.is_alphanumeric()) {
        return Err(Error::validation(
            "name",
            "must contain at least one alphanumeric character",
        ));
    }
    Ok(())
}

/// Validate a record description: trimmed, 3-200 characters.
pub fn validate_description(description: &str) -> Result<(), Error> {
    let len = description.trim().chars().count();
    if !(3..=200).contains(&len) {
        return Err(Error::validation(
            "description",
            "must be 3 to 200 characters",
        ));
    }
    Ok(())
}
