//! Hotkey chords (`ctrl+x`, `esc`) matched against the hook's key stream.

use mousemacro_core::HotkeyConfig;
use std::collections::HashSet;
use thiserror::Error;

/// What a hotkey does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleRecording,
    TogglePlayback,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("empty hotkey")]
    Empty,
    #[error("hotkey '{0}' has no key besides modifiers")]
    MissingKey(String),
    #[error("hotkey '{0}' names more than one key")]
    TooManyKeys(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Modifiers {
    ctrl: bool,
    alt: bool,
    shift: bool,
    meta: bool,
}

impl Modifiers {
    /// Returns a mutable flag if `name` is a modifier.
    fn flag(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "ctrl" | "control" => Some(&mut self.ctrl),
            "alt" | "option" => Some(&mut self.alt),
            "shift" => Some(&mut self.shift),
            "meta" | "cmd" | "win" | "super" => Some(&mut self.meta),
            _ => None,
        }
    }
}

/// A parsed chord: exact modifier set plus one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    modifiers: Modifiers,
    key: String,
}

impl Chord {
    pub fn parse(text: &str) -> Result<Self, HotkeyError> {
        let mut modifiers = Modifiers::default();
        let mut key = None;

        for part in text.split('+').map(normalize).filter(|p| !p.is_empty()) {
            if let Some(flag) = modifiers.flag(&part) {
                *flag = true;
            } else if key.replace(part).is_some() {
                return Err(HotkeyError::TooManyKeys(text.to_string()));
            }
        }

        match key {
            Some(key) => Ok(Self { modifiers, key }),
            None if modifiers == Modifiers::default() => Err(HotkeyError::Empty),
            None => Err(HotkeyError::MissingKey(text.to_string())),
        }
    }
}

impl std::fmt::Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.modifiers;
        for (held, name) in [(m.ctrl, "Ctrl"), (m.alt, "Alt"), (m.shift, "Shift"), (m.meta, "Meta")] {
            if held {
                write!(f, "{name}+")?;
            }
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => write!(f, "{}", c.to_ascii_uppercase()),
            _ => write!(f, "{}", capitalize(&self.key)),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase and fold aliases so config text and hook names compare equal.
fn normalize(name: &str) -> String {
    let name = name.trim().to_lowercase();
    match name.as_str() {
        "escape" => "esc".into(),
        "return" => "enter".into(),
        _ => name,
    }
}

/// Tracks held keys and fires an action when a bound chord is completed.
#[derive(Debug)]
pub struct HotkeyMatcher {
    bindings: Vec<(Chord, HotkeyAction)>,
    held_modifiers: Modifiers,
    held_keys: HashSet<String>,
}

impl HotkeyMatcher {
    pub fn new(bindings: Vec<(Chord, HotkeyAction)>) -> Self {
        Self {
            bindings,
            held_modifiers: Modifiers::default(),
            held_keys: HashSet::new(),
        }
    }

    pub fn from_config(config: &HotkeyConfig) -> Result<Self, HotkeyError> {
        let groups = [
            (&config.toggle_recording, HotkeyAction::ToggleRecording),
            (&config.toggle_playback, HotkeyAction::TogglePlayback),
            (&config.quit, HotkeyAction::Quit),
        ];

        let mut bindings = Vec::new();
        for (chords, action) in groups {
            for text in chords {
                bindings.push((Chord::parse(text)?, action));
            }
        }
        Ok(Self::new(bindings))
    }

    /// Chords bound to `action`, for the help text.
    pub fn chords_for(&self, action: HotkeyAction) -> Vec<&Chord> {
        self.bindings
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(chord, _)| chord)
            .collect()
    }

    /// Feed a key press. Auto-repeat of a held key does not fire again.
    pub fn key_down(&mut self, key: &str) -> Option<HotkeyAction> {
        let key = normalize(key);
        if let Some(flag) = self.held_modifiers.flag(&key) {
            *flag = true;
            return None;
        }
        if !self.held_keys.insert(key.clone()) {
            return None;
        }

        self.bindings
            .iter()
            .find(|(chord, _)| chord.key == key && chord.modifiers == self.held_modifiers)
            .map(|(_, action)| *action)
    }

    pub fn key_up(&mut self, key: &str) {
        let key = normalize(key);
        if let Some(flag) = self.held_modifiers.flag(&key) {
            *flag = false;
        } else {
            self.held_keys.remove(&key);
        }
    }
}
