//! Text rendering for matrix entries, environments and validation results.
//!
//! Each helper builds its lines and joins them without a trailing newline.

use adk_core::{EnvironmentInfo, FrameworkConfig, Incompatibility, PlatformVersionEntry, ValidationResult};

use super::{format_optional, join};

/// Multi-line description of one runtime version's requirements.
pub fn format_entry(runtime_version: &str, entry: &PlatformVersionEntry) -> String {
    let status = if entry.deprecated { " (deprecated)" } else { "" };
    let mut lines = vec![
        format!("Runtime {runtime_version}{status}"),
        format!("  driver:       >= {}", entry.min_driver_version),
        format!(
            "  driver max:   {}",
            format_optional(entry.max_driver_version.as_ref(), "none")
        ),
        format!("  os:           {}", join(&entry.supported_os)),
        format!("  accelerators: {}", join(&entry.supported_accelerator_models)),
        format!("  arch:         {}", join(&entry.supported_arch)),
    ];
    if !entry.frameworks.is_empty() {
        lines.push("  frameworks:".to_string());
        lines.extend(
            entry
                .frameworks
                .iter()
                .map(|(name, config)| format!("    {name} {}", config.version)),
        );
    }
    for (label, url) in [
        ("toolkit", &entry.toolkit_url),
        ("kernels", &entry.kernels_url),
        ("notes", &entry.release_notes),
    ] {
        if let Some(url) = url {
            lines.push(format!("  {label:<13} {url}"));
        }
    }
    lines.join("\n")
}

/// Multi-line description of a framework pairing.
pub fn format_framework(runtime_version: &str, name: &str, config: &FrameworkConfig) -> String {
    let mut lines = vec![format!("{name} {} for runtime {runtime_version}", config.version)];
    if let Some(adapter) = &config.adapter_version {
        lines.push(format!("  adapter: {adapter}"));
    }
    lines.push(format!("  python:  {}", join(&config.python_versions)));
    if let Some(url) = &config.package_url {
        lines.push(format!("  package: {url}"));
        lines.push(format!(
            "  sha256:  {}",
            format_optional(config.checksum.as_ref(), "unverified")
        ));
    }
    if let Some(command) = &config.install_command {
        lines.push(format!("  install: {command}"));
    }
    lines.join("\n")
}

/// Multi-line description of a probed host.
pub fn format_environment(env: &EnvironmentInfo) -> String {
    [
        format!("Driver:      {}", env.driver_version),
        format!("OS:          {}", env.os_name),
        format!("Arch:        {}", env.arch),
        format!("Accelerator: {} x{}", env.accelerator_model, env.accelerator_count),
        format!(
            "Firmware:    {}",
            format_optional(env.firmware_version.as_ref(), "unknown")
        ),
    ]
    .join("\n")
}

/// Incompatibilities with their hints, one block per failure.
pub fn format_incompatibilities(failures: &[Incompatibility]) -> String {
    failures
        .iter()
        .flat_map(|failure| {
            std::iter::once(format!("  x {failure}")).chain(
                failure
                    .suggestions()
                    .into_iter()
                    .map(|hint| format!("      hint: {hint}")),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary of a whole-matrix validation.
///
/// Errors are listed only when no runtime version matched.
pub fn format_validation(result: &ValidationResult) -> String {
    let mut lines = Vec::new();
    if result.valid {
        lines.push(format!(
            "Compatible runtime versions: {}",
            join(&result.compatible_versions)
        ));
        if let Some(recommended) = result.recommended() {
            lines.push(format!("Recommended: {recommended}"));
        }
    } else {
        lines.push("No compatible runtime version found".to_string());
        if !result.incompatibilities.is_empty() {
            lines.push(format_incompatibilities(&result.incompatibilities));
        }
    }
    lines.extend(result.warnings.iter().map(|warning| format!("warning: {warning}")));
    lines.join("\n")
}
