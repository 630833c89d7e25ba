//! Loading and validating the compatibility matrix source.

mod error;
mod loader;
mod schema;

pub use error::ConfigurationError;
pub use loader::{MatrixCache, MatrixLoader};
