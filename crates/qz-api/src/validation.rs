use validator::Validate;

use crate::error::ApiError;

/// Run `validator` checks on a request payload, mapping failures onto the
/// API's `Validation` error so they reject the request before any mutation.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}
