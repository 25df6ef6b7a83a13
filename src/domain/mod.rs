//! Domain models and types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Input model** ([`Bundle`], [`Series`])
//! - **Partition model** ([`Chunk`], [`Window`], [`SeriesSlice`])
//! - **Output formats** ([`OutputFormat`])
//! - **Error types** ([`BundleError`], [`RenderError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BundleError>`]:
//!
//! ```rust
//! use bundle_export::domain::{Bundle, Result};
//!
//! fn example() -> Result<()> {
//!     let bundle = Bundle::from_json_slice(br#"{"series": {"rows": [1, 2, 3]}}"#)?;
//!     assert_eq!(bundle.max_size(), 3);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod bundle;
pub mod chunk;
pub mod errors;
pub mod format;
pub mod result;

pub use bundle::{Bundle, BundleBuilder, Series, DEFAULT_SPLIT_SIZE, MAX_SPLIT_SIZE};
pub use chunk::{Chunk, SeriesSlice, Window};
pub use errors::{BundleError, RenderError};
pub use format::{OutputFormat, CONTENT_TYPE_ZIP, EXTENSION_ZIP};
pub use result::Result;
