// Severity value object

pub const SEVERITY_MAX: u32 = 100;

/// Severity at or above this is "high" for spike accounting.
pub const HIGH_SEVERITY_THRESHOLD: u8 = 70;

pub fn clamp_severity(raw: u32) -> u8 {
    raw.min(SEVERITY_MAX) as u8
}
