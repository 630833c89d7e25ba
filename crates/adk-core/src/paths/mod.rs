//! Path resolution for external inputs.

mod matrix;

pub use matrix::{
    DEFAULT_MATRIX_RELATIVE, MATRIX_PATH_ENV, MatrixPathResolution, MatrixPathSource,
    default_config_matrix_path, resolve_matrix_path,
};
