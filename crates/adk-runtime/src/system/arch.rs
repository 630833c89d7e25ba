//! CPU architecture normalization.

/// Map platform spellings onto the identifiers used in the matrix.
///
/// `amd64`/`x64` become `x86_64` and `arm64` becomes `aarch64`; anything
/// else is returned unchanged.
pub fn normalize_arch(raw: &str) -> String {
    match raw.to_ascii_lowercase().as_str() {
        "amd64" | "x64" | "x86_64" => "x86_64".to_string(),
        "arm64" | "aarch64" => "aarch64".to_string(),
        _ => raw.to_string(),
    }
}

/// Architecture of the running process.
pub fn current_arch() -> String {
    normalize_arch(std::env::consts::ARCH)
}
