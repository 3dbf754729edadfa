use stay_auth::{AuthError, OperationResult};

use crate::cli::GlobalFlags;
use crate::output::output;

/// Pass a successful result through. On failure, print the
/// `{ success: false, error }` form and return the error for the exit code.
pub fn settle<T>(result: Result<T, AuthError>, flags: &GlobalFlags) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(error) => {
            output(&OperationResult::failure(&error), flags.format)?;
            Err(error.into())
        }
    }
}
