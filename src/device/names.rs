//! Kernel names for input event codes.
//!
//! These are the binding-level names handed to the modmap as the fallback
//! when a scan code is not in the loaded table.

use evdev::{KeyCode, RelativeAxisCode};

/// Kernel name of a key or button code, e.g. `KEY_A` or `BTN_LEFT`, if `evdev` knows it.
pub fn key_name(code: u16) -> Option<String> {
    let name = format!("{:?}", KeyCode::new(code));
    (name.starts_with("KEY_") || name.starts_with("BTN_")).then_some(name)
}

/// Kernel name of a relative axis code, if it is a wheel.
pub fn rel_name(code: u16) -> Option<&'static str> {
    match RelativeAxisCode(code) {
        RelativeAxisCode::REL_HWHEEL => Some("REL_HWHEEL"),
        RelativeAxisCode::REL_WHEEL => Some("REL_WHEEL"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{REL_HWHEEL, REL_WHEEL};

    #[test]
    fn test_known_names() {
        assert_eq!(key_name(30).as_deref(), Some("KEY_A"));
        assert_eq!(key_name(29).as_deref(), Some("KEY_LEFTCTRL"));
        assert_eq!(key_name(272).as_deref(), Some("BTN_LEFT"));
    }

    #[test]
    fn test_unknown_code_has_no_name() {
        assert_eq!(key_name(60000), None);
    }

    #[test]
    fn test_wheel_names() {
        assert_eq!(rel_name(REL_WHEEL), Some("REL_WHEEL"));
        assert_eq!(rel_name(REL_HWHEEL), Some("REL_HWHEEL"));
        assert_eq!(rel_name(0), None);
    }
}
