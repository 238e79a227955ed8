//! Result type alias for the clinic core

use super::errors::ClinicError;

/// Result type alias for clinic operations
///
/// # Examples
///
/// ```
/// use frontdesk::domain::result::Result;
/// use frontdesk::domain::errors::ClinicError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ClinicError::Conflict("Cannot delete patient with existing appointments.".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ClinicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(ClinicError::Other("test error".to_string()));
        assert!(result.is_err());
    }
}
