//! Result type alias for export operations

use super::errors::BundleError;

/// Result type alias using [`BundleError`]
///
/// # Examples
///
/// ```
/// use bundle_export::domain::result::Result;
/// use bundle_export::domain::errors::BundleError;
///
/// fn failing_function() -> Result<()> {
///     Err(BundleError::InvalidBundle("no series".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BundleError>;
