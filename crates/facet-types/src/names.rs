//! Name validation for lanes, tags, and components.
//!
//! Valid lane names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`, `@`
//! - Must not contain `..` (double dot)
//! - Must not start or end with `.` or `/`
//! - Must not contain consecutive slashes (`//`)
//!
//! Tags are flat (no `/`) and must not look like a snap hash. Component
//! names are slash-separated segments of ASCII alphanumerics, `-`, `_`, `.`.

use crate::error::TypeError;
use crate::label::is_hash;

/// Characters that are forbidden anywhere in a lane or tag name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\', '@'];

fn invalid(kind: &'static str, name: &str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a lane name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use facet_types::names::validate_lane_name;
///
/// assert!(validate_lane_name("main").is_ok());
/// assert!(validate_lane_name("feature/auth").is_ok());
/// assert!(validate_lane_name("").is_err());
/// assert!(validate_lane_name("bad..name").is_err());
/// ```
pub fn validate_lane_name(name: &str) -> Result<(), TypeError> {
    const KIND: &str = "lane";
    if name.is_empty() {
        return Err(invalid(KIND, name, "must not be empty"));
    }
    if let Some(ch) = FORBIDDEN_CHARS.iter().find(|ch| name.contains(**ch)) {
        return Err(invalid(KIND, name, format!("contains forbidden character: {ch:?}")));
    }
    if name.contains("..") {
        return Err(invalid(KIND, name, "must not contain '..'"));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid(KIND, name, "must not start or end with '.'"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid(KIND, name, "must not start or end with '/'"));
    }
    if name.contains("//") {
        return Err(invalid(KIND, name, "must not contain consecutive slashes '//'"));
    }
    Ok(())
}

/// Validate a tag name (e.g. `1.0.0`, `stable`).
pub fn validate_tag_name(name: &str) -> Result<(), TypeError> {
    const KIND: &str = "tag";
    if name.is_empty() {
        return Err(invalid(KIND, name, "must not be empty"));
    }
    if let Some(ch) = FORBIDDEN_CHARS.iter().find(|ch| name.contains(**ch)) {
        return Err(invalid(KIND, name, format!("contains forbidden character: {ch:?}")));
    }
    if name.contains('/') {
        return Err(invalid(KIND, name, "must not contain '/'"));
    }
    if name.starts_with('.') {
        return Err(invalid(KIND, name, "must not start with '.'"));
    }
    if is_hash(name) {
        return Err(invalid(KIND, name, "is indistinguishable from a snap hash"));
    }
    Ok(())
}

/// Validate a component name such as `ui/button` or `utils.string`.
pub fn validate_component_name(name: &str) -> Result<(), TypeError> {
    const KIND: &str = "component";
    if name.is_empty() {
        return Err(invalid(KIND, name, "must not be empty"));
    }
    for segment in name.split('/') {
        if segment.is_empty() {
            return Err(invalid(KIND, name, "path segments must not be empty"));
        }
        if segment == "." || segment == ".." {
            return Err(invalid(KIND, name, "path segments must not be '.' or '..'"));
        }
        if let Some(ch) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(invalid(KIND, name, format!("contains forbidden character: {ch:?}")));
        }
    }
    Ok(())
}
