//! Display helpers for UI layers.

pub const DEFAULT_KEEP: usize = 10;
pub const DEFAULT_PLACEHOLDER: &str = "*****";

/// Mask the middle of `value`, keeping `keep` chars at each end.
///
/// `hide_str(Some("bc1qabcdefghijklmnop"), 4, "...")` gives `"bc1q...mnop"`.
/// Absent or empty input gives an empty string.
pub fn hide_str(value: Option<&str>, keep: usize, placeholder: &str) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return String::new();
    };
    let chars: Vec<char> = value.chars().collect();
    let head: String = chars.iter().take(keep).collect();
    let tail: String = chars[chars.len().saturating_sub(keep)..].iter().collect();
    format!("{head}{placeholder}{tail}")
}

/// [`hide_str`] with the defaults used across the UI.
pub fn hide_address(address: Option<&str>) -> String {
    hide_str(address, DEFAULT_KEEP, DEFAULT_PLACEHOLDER)
}
