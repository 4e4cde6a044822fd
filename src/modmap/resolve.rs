//! Normalization and fallback synthesis for scan codes missing from a modmap.

use serde::Serialize;

/// Prefixes that already mark a name as a symbolic input identifier.
const KNOWN_PREFIXES: [&str; 3] = ["KEY_", "BTN_", "REL_"];

/// Result of resolving a scan code: identifier plus the two display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// Symbolic, layout-independent identifier (e.g. "KEY_A")
    pub code: String,
    /// Medium-length label (e.g. "Shift")
    pub medium_label: String,
    /// Short label (e.g. "A")
    pub short_label: String,
    /// False when the identifier was synthesized from the fallback name
    pub mapped: bool,
}

impl Resolved {
    /// Borrows the resolution as a `(code, medium, short)` tuple.
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.code, &self.medium_label, &self.short_label)
    }
}

/// Normalizes a binding-supplied key name into a symbolic identifier.
///
/// Upper-cases, turns spaces and dashes into underscores, and adds a `KEY_`
/// prefix when no known prefix is present. An empty name stays empty.
///
/// ```
/// use key_mon::modmap::normalize_name;
///
/// assert_eq!(normalize_name("Return"), "KEY_RETURN");
/// assert_eq!(normalize_name("BTN_LEFT"), "BTN_LEFT");
/// assert_eq!(normalize_name("page-up"), "KEY_PAGE_UP");
/// ```
pub fn normalize_name(name: &str) -> String {
    let upper: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();

    if upper.is_empty() || KNOWN_PREFIXES.iter().any(|p| upper.starts_with(p)) {
        upper
    } else {
        format!("KEY_{upper}")
    }
}

/// Display form of a symbolic name: the name without its prefix.
///
/// `KEY_Z` becomes `Z`; a bare prefix such as `KEY_` is returned unchanged.
pub fn display_label(symbolic: &str) -> &str {
    KNOWN_PREFIXES
        .iter()
        .find_map(|p| symbolic.strip_prefix(p))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(symbolic)
}

/// Builds a usable resolution for a scan code the modmap does not know.
pub fn synthesize(scan_code: u32, fallback_name: &str) -> Resolved {
    let code = normalize_name(fallback_name);
    if code.is_empty() {
        let label = scan_code.to_string();
        return Resolved {
            code: format!("KEY_{scan_code}"),
            medium_label: label.clone(),
            short_label: label,
            mapped: false,
        };
    }

    let label = display_label(&code).to_string();
    Resolved {
        medium_label: label.clone(),
        short_label: label,
        code,
        mapped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_known_prefixes() {
        assert_eq!(normalize_name("KEY_Z"), "KEY_Z");
        assert_eq!(normalize_name("btn_left"), "BTN_LEFT");
        assert_eq!(normalize_name("REL_WHEEL"), "REL_WHEEL");
    }

    #[test]
    fn test_normalize_adds_key_prefix() {
        assert_eq!(normalize_name("a"), "KEY_A");
        assert_eq!(normalize_name("  Caps Lock "), "KEY_CAPS_LOCK");
    }

    #[test]
    fn test_display_label_strips_prefix() {
        assert_eq!(display_label("KEY_Z"), "Z");
        assert_eq!(display_label("BTN_MIDDLE"), "MIDDLE");
        assert_eq!(display_label("KEY_"), "KEY_");
        assert_eq!(display_label("MOUSE"), "MOUSE");
    }

    #[test]
    fn test_synthesize_from_fallback() {
        let resolved = synthesize(999, "KEY_Z");
        assert_eq!(resolved.as_tuple(), ("KEY_Z", "Z", "Z"));
        assert!(!resolved.mapped);
    }

    #[test]
    fn test_synthesize_without_fallback_uses_scan_code() {
        let resolved = synthesize(240, "   ");
        assert_eq!(resolved.as_tuple(), ("KEY_240", "240", "240"));
    }
}
