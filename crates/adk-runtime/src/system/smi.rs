//! Scraping `npu-smi` output.
//!
//! The output is scanned line by line with two independent predicates:
//!
//! - **driver line**: `npu-smi <version>` or `Version: <version>`, where the
//!   version starts with a digit and continues with letters, digits and dots
//!   (`| npu-smi 24.1.rc1     Version: 24.1.rc1 |`). The first match wins.
//! - **device row**: a table row `| <index> <model> ...` where `index` is a
//!   decimal integer and `model` is three digits followed by up to ten
//!   uppercase letters or digits (`| 0       910B    OK  ...`). Chip rows
//!   (`| 0       0       0000:81:00.0 ...`) are rejected by the PCI bus id
//!   in their third column, which also covers device ids of 100 and above.
//!
//! Lines matching neither are ignored, and device rows whose index does not
//! fit in a `u32` are skipped.

use std::sync::LazyLock;

use adk_core::{AcceleratorDevice, AcceleratorReport, DetectionError, Version};
use regex::Regex;
use tracing::debug;

static DRIVER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:npu-smi|Version:)\s+([0-9][0-9A-Za-z.]*)").expect("driver line pattern is valid")
});

static DEVICE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|\s+([0-9]+)\s+([0-9]{3}[A-Z0-9]{0,10})\s+(\S*)").expect("device row pattern is valid")
});

static BUS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{4}:[0-9A-Fa-f]{2}:").expect("bus id pattern is valid"));

static FIRMWARE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)firmware[^0-9]*([0-9][0-9.]*)").expect("firmware pattern is valid")
});

/// Driver version token on `line`, if it is a driver line.
pub fn driver_version_token(line: &str) -> Option<&str> {
    DRIVER_LINE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.'))
}

/// Raw `(index, model)` captures, if `line` is a device row.
pub fn device_row(line: &str) -> Option<(&str, &str)> {
    let caps = DEVICE_ROW.captures(line)?;
    if caps.get(3).is_some_and(|next| BUS_ID.is_match(next.as_str())) {
        return None;
    }
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Parse the output of `npu-smi info`.
pub fn parse_info(output: &str) -> Result<AcceleratorReport, DetectionError> {
    let mut driver = None;
    let mut devices = Vec::new();

    for line in output.lines() {
        if driver.is_none() {
            driver = driver_version_token(line);
        }
        if let Some((index, model)) = device_row(line) {
            match index.parse::<u32>() {
                Ok(index) => devices.push(AcceleratorDevice::new(index, model)),
                Err(_) => debug!(index, "Skipping device row with out-of-range index"),
            }
        }
    }

    if devices.is_empty() {
        return Err(DetectionError::NpuNotDetected {
            reason: "no NPU device rows in npu-smi output".to_string(),
        });
    }

    let raw = driver.ok_or_else(|| DetectionError::NpuNotDetected {
        reason: "cannot parse driver version".to_string(),
    })?;
    let driver_version = Version::parse(raw).map_err(|_| DetectionError::InvalidDriverVersion {
        raw: raw.to_string(),
    })?;

    debug!(driver = %driver_version, devices = devices.len(), "Parsed npu-smi output");
    Ok(AcceleratorReport {
        driver_version,
        devices,
    })
}

/// Firmware version from `npu-smi info -t board` output.
pub fn parse_firmware(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        FIRMWARE_LINE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end_matches('.').to_string())
            .filter(|v| !v.is_empty())
    })
}
