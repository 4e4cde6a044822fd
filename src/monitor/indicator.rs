//! What the indicator shows: held keys, modifiers, mouse buttons, and how visible it is.

use crate::config::UiConfig;
use crate::device::{PRESS, RELEASE};
use crate::modmap::Resolved;
use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Interval between fade-out steps.
pub const FADE_STEP: Duration = Duration::from_millis(100);

/// Number of steps from full opacity to hidden.
const FADE_STEPS: u8 = 10;

/// Modifier groups, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    /// Either shift key
    Shift,
    /// Either control key
    Ctrl,
    /// Either meta/super key
    Meta,
    /// Left alt
    Alt,
    /// Right alt
    AltGr,
}

impl Modifier {
    /// Group a symbolic key code belongs to, if it is a modifier.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KEY_LEFTSHIFT" | "KEY_RIGHTSHIFT" => Some(Self::Shift),
            "KEY_LEFTCTRL" | "KEY_RIGHTCTRL" => Some(Self::Ctrl),
            "KEY_LEFTMETA" | "KEY_RIGHTMETA" => Some(Self::Meta),
            "KEY_LEFTALT" => Some(Self::Alt),
            "KEY_RIGHTALT" => Some(Self::AltGr),
            _ => None,
        }
    }

    /// Indicator name of the group.
    pub fn name(self) -> &'static str {
        match self {
            Self::Shift => "SHIFT",
            Self::Ctrl => "CTRL",
            Self::Meta => "META",
            Self::Alt => "ALT",
            Self::AltGr => "ALTGR",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour switches for the indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOptions {
    /// Show non-modifier keys only while a modifier is active
    pub only_combo: bool,
    /// Latch released modifiers until the next non-modifier release
    pub sticky_mode: bool,
    /// How long a scroll stays visible
    pub scroll_pulse: Duration,
    /// Delay before fading out after the last press
    pub no_press_fadeout: Option<Duration>,
    /// Opacity when fully shown
    pub opacity: f32,
}

impl Default for IndicatorOptions {
    fn default() -> Self {
        Self::from(&UiConfig::default())
    }
}

impl From<&UiConfig> for IndicatorOptions {
    fn from(ui: &UiConfig) -> Self {
        Self {
            only_combo: ui.only_combo,
            sticky_mode: ui.sticky_mode,
            scroll_pulse: ui.visible_click_duration(),
            no_press_fadeout: ui.no_press_fadeout_duration(),
            opacity: ui.opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeldKey {
    code: String,
    label: String,
}

/// Indicator state, driven by resolved key events and motion.
#[derive(Debug, Clone)]
pub struct Indicator {
    options: IndicatorOptions,
    modifier_keys: Vec<(Modifier, String)>,
    latched: BTreeSet<Modifier>,
    keys: Vec<HeldKey>,
    left: bool,
    middle: bool,
    right: bool,
    scroll: Option<(&'static str, Instant)>,
    last_press: Option<Instant>,
    fade_steps: u8,
    next_fade: Option<Instant>,
    visible: bool,
}

impl Indicator {
    /// Creates an empty, visible indicator.
    pub fn new(options: IndicatorOptions) -> Self {
        Self {
            options,
            modifier_keys: Vec::new(),
            latched: BTreeSet::new(),
            keys: Vec::new(),
            left: false,
            middle: false,
            right: false,
            scroll: None,
            last_press: None,
            fade_steps: 0,
            next_fade: None,
            visible: true,
        }
    }

    /// Current options.
    pub fn options(&self) -> &IndicatorOptions {
        &self.options
    }

    /// Applies a key or button event. Returns true if the display changed.
    pub fn key(&mut self, resolved: &Resolved, value: i32, now: Instant) -> bool {
        if value != PRESS && value != RELEASE {
            // Autorepeat leaves the display alone
            return false;
        }
        let pressed = value == PRESS;
        let before = self.render();
        let was_visible = self.visible;

        if pressed {
            self.note_press(now);
        }

        let code = resolved.code.as_str();
        if let Some(button) = self.button_mut(code) {
            *button = pressed;
        } else if let Some(modifier) = Modifier::from_code(code) {
            if pressed {
                if !self.modifier_keys.iter().any(|(_, c)| c == code) {
                    self.modifier_keys.push((modifier, code.to_string()));
                }
            } else {
                self.modifier_keys.retain(|(_, c)| c != code);
                if self.options.sticky_mode {
                    self.latched.insert(modifier);
                }
            }
        } else if pressed {
            if !self.keys.iter().any(|k| k.code == code) {
                self.keys.push(HeldKey {
                    code: code.to_string(),
                    label: resolved.medium_label.clone(),
                });
            }
        } else {
            self.keys.retain(|k| k.code != code);
            self.latched.clear();
        }

        was_visible != self.visible || before != self.render()
    }

    /// Applies a wheel motion. Returns true if the display changed.
    pub fn scroll(&mut self, axis: &str, delta: i32, now: Instant) -> bool {
        let name = match (axis, delta.signum()) {
            ("REL_WHEEL", 1) => "SCROLL_UP",
            ("REL_WHEEL", -1) => "SCROLL_DOWN",
            ("REL_HWHEEL", 1) => "REL_RIGHT",
            ("REL_HWHEEL", -1) => "REL_LEFT",
            _ => return false,
        };
        let changed = !self.visible || self.scroll.map(|(n, _)| n) != Some(name);
        self.note_press(now);
        self.scroll = Some((name, now));
        changed
    }

    /// Advances timers. Returns true if the display changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some((_, at)) = self.scroll {
            if now.saturating_duration_since(at) >= self.options.scroll_pulse {
                self.scroll = None;
                changed = true;
            }
        }

        let (Some(fadeout), Some(last_press)) = (self.options.no_press_fadeout, self.last_press)
        else {
            return changed;
        };
        if !self.visible || now.saturating_duration_since(last_press) < fadeout {
            return changed;
        }
        if self.next_fade.is_some_and(|due| now < due) {
            return changed;
        }

        self.fade_steps += 1;
        if self.fade_steps >= FADE_STEPS || self.options.opacity <= 0.0 {
            self.visible = false;
            self.next_fade = None;
        } else {
            self.next_fade = Some(now + FADE_STEP);
        }
        true
    }

    /// Active modifier groups, held or latched, in display order.
    pub fn active_modifiers(&self) -> Vec<Modifier> {
        let mut active: BTreeSet<Modifier> = self.latched.clone();
        active.extend(self.modifier_keys.iter().map(|(m, _)| *m));
        active.into_iter().collect()
    }

    /// Labels of held non-modifier keys that should be shown, in press order.
    pub fn shown_keys(&self) -> Vec<&str> {
        if self.options.only_combo && self.active_modifiers().is_empty() {
            return Vec::new();
        }
        self.keys.iter().map(|k| k.label.as_str()).collect()
    }

    /// Symbolic codes of all held non-modifier keys, in press order.
    pub fn held_codes(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.code.as_str()).collect()
    }

    /// Mouse image name: scroll pulse, button composite, or `MOUSE`.
    pub fn mouse_name(&self) -> String {
        if let Some((name, _)) = self.scroll {
            return name.to_string();
        }
        if !(self.left || self.middle || self.right) {
            return "MOUSE".to_string();
        }
        let mut name = String::from("BTN_");
        for (held, part) in [(self.left, "LEFT"), (self.middle, "MIDDLE"), (self.right, "RIGHT")] {
            if held {
                name.push_str(part);
            }
        }
        name
    }

    /// True unless faded out.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current opacity.
    pub fn opacity(&self) -> f32 {
        if !self.visible {
            return 0.0;
        }
        self.options.opacity * f32::from(FADE_STEPS - self.fade_steps) / f32::from(FADE_STEPS)
    }

    /// One-line text form, e.g. `[SHIFT] [A] | BTN_LEFT`.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self
            .active_modifiers()
            .iter()
            .map(|m| format!("[{m}]"))
            .collect();
        parts.extend(self.shown_keys().iter().map(|label| format!("[{label}]")));

        let mouse = self.mouse_name();
        if parts.is_empty() {
            mouse
        } else {
            format!("{} | {mouse}", parts.join(" "))
        }
    }

    fn note_press(&mut self, now: Instant) {
        self.last_press = Some(now);
        self.fade_steps = 0;
        self.next_fade = None;
        self.visible = true;
    }

    fn button_mut(&mut self, code: &str) -> Option<&mut bool> {
        match code {
            "BTN_LEFT" => Some(&mut self.left),
            "BTN_MIDDLE" => Some(&mut self.middle),
            "BTN_RIGHT" => Some(&mut self.right),
            _ => None,
        }
    }
}
