// # Address Resolver Trait
//
// Defines the interface for translating a postal code into a street
// address line via an external lookup service.
//
// ## Implementations
//
// - ViaCEP: `cadastro-resolver-viacep` crate
//
// ## Contract
//
// The input is normalized (non-digits stripped) and format-checked BEFORE
// any network I/O; implementations call [`normalize_postal_code`] first,
// so a malformed code never produces an outbound request.
//
// One outbound request per invocation. No retry logic, no caching, no
// state across calls. The service layer decides whether to re-invoke and
// what a failed lookup means for the record being written.

use crate::error::LookupError;
use async_trait::async_trait;

/// Address line stored when the lookup succeeded but the service had no
/// street line for the code. A success, not an error.
pub const ADDRESS_NOT_INFORMED: &str = "address line not informed";

/// Normalize a raw postal code
///
/// Strips every non-digit character (hyphens, spaces, whatever the
/// operator typed) and requires exactly 8 digits to remain.
pub fn normalize_postal_code(raw: &str) -> Result<String, LookupError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 {
        return Err(LookupError::InvalidFormat);
    }
    Ok(digits)
}

/// Trait for address lookup implementations
///
/// Implementations must be thread-safe and usable across async tasks,
/// and must hold no state between calls: same input, same outcome,
/// modulo the external service itself.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve a postal code to an address line
    ///
    /// # Returns
    ///
    /// - `Ok(line)`: populated street line, or [`ADDRESS_NOT_INFORMED`]
    ///   when the service knows the code but carries no line for it
    /// - `Err(LookupError::InvalidFormat)`: malformed code, nothing was sent
    /// - `Err(LookupError::NotFound)`: the service's explicit not-found marker
    /// - `Err(LookupError::Unavailable)`: transport or service failure
    async fn resolve(&self, raw_code: &str) -> Result<String, LookupError>;

    /// Resolver name for logging/debugging (e.g. "viacep")
    fn resolver_name(&self) -> &'static str;
}
