//! Handler output conversion.

use crate::error::BoxError;

/// Trait for converting a handler's output into a delivery outcome.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<T, E>` → delegates to `T`, or fails with `E` converted into a
///   [`BoxError`]. This covers `Result<(), std::io::Error>`,
///   `Result<(), BoxError>`, `Result<(), String>` and friends.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a handler output",
    label = "missing `IntoOutcome` implementation",
    note = "Handlers return `()` or a `Result` whose error converts into `BoxError`."
)]
pub trait IntoOutcome {
    /// Convert the output into success or a handler error.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_is_success() {
        assert!(().into_outcome().is_ok());
    }

    #[test]
    fn test_result_error_is_failure() {
        let output: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let err = output.into_outcome().unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let output: Result<(), String> = Err("nope".into());
        assert!(output.into_outcome().is_err());
    }
}
