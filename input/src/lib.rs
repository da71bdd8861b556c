//! Named-action to key-set mapping. The editor and the game loop never poll
//! `Platform` keys directly for anything end users might want to rebind;
//! they ask `is_action_down("move_forward")` instead.

use platform::{Key, Platform};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed input bindings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown key name: {0}")]
    UnknownKey(String),
}

fn key_by_name(name: &str) -> Option<Key> {
    use Key::*;
    Some(match name {
        "a" => A, "b" => B, "c" => C, "d" => D, "e" => E, "f" => F, "g" => G,
        "h" => H, "i" => I, "j" => J, "k" => K, "l" => L, "m" => M, "n" => N,
        "o" => O, "p" => P, "q" => Q, "r" => R, "s" => S, "t" => T, "u" => U,
        "v" => V, "w" => W, "x" => X, "y" => Y, "z" => Z,
        "0" => Num0, "1" => Num1, "2" => Num2, "3" => Num3, "4" => Num4,
        "5" => Num5, "6" => Num6, "7" => Num7, "8" => Num8, "9" => Num9,
        "up" => Up, "down" => Down, "left" => Left, "right" => Right,
        "space" => Space, "enter" => Enter, "escape" => Escape, "tab" => Tab,
        "backspace" => Backspace, "delete" => Delete, "grave" => Grave,
        "left_shift" => LeftShift, "right_shift" => RightShift,
        "left_ctrl" => LeftCtrl, "right_ctrl" => RightCtrl,
        "left_alt" => LeftAlt, "right_alt" => RightAlt,
        "f1" => F1, "f2" => F2, "f3" => F3, "f4" => F4, "f5" => F5, "f6" => F6,
        "f7" => F7, "f8" => F8, "f9" => F9, "f10" => F10, "f11" => F11, "f12" => F12,
        _ => return None,
    })
}

/// Keeps the keys bound to every named action. Constructed from JSON (see
/// [`Bindings::from_json`]) or from [`Bindings::defaults`]; reads are
/// read-only at runtime, matching the spec's "no live rebind UI" scope.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    actions: HashMap<String, Vec<Key>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtin set seeded when no `input` object is present in config,
    /// or to fill in actions a partial user config omits.
    pub fn defaults() -> Self {
        let mut b = Self::new();
        b.bind("move_forward", vec![Key::W, Key::Up]);
        b.bind("move_backward", vec![Key::S, Key::Down]);
        b.bind("strafe_left", vec![Key::A]);
        b.bind("strafe_right", vec![Key::D]);
        b.bind("turn_left", vec![Key::Left]);
        b.bind("turn_right", vec![Key::Right]);
        b.bind("toggle_console", vec![Key::Grave]);
        b.bind("toggle_editor", vec![Key::Tab]);
        b.bind("delete", vec![Key::Delete]);
        b
    }

    pub fn bind(&mut self, action: &str, keys: Vec<Key>) {
        self.actions.insert(action.to_string(), keys);
    }

    /// Parses a JSON object of the shape `{ action: key-name | [key-names] }`
    /// on top of [`Bindings::defaults`] — entries in `text` override or add
    /// to the builtin set, but never remove an action the builtin set binds.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(text)?;
        let mut bindings = Self::defaults();
        for (action, value) in raw {
            let names: Vec<String> = match value {
                serde_json::Value::String(s) => vec![s],
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .map(|v| v.as_str().unwrap_or_default().to_string())
                    .collect(),
                _ => continue,
            };
            let mut keys = Vec::with_capacity(names.len());
            for name in names {
                keys.push(key_by_name(&name).ok_or(Error::UnknownKey(name))?);
            }
            bindings.bind(&action, keys);
        }
        Ok(bindings)
    }

    fn keys_for(&self, action: &str) -> &[Key] {
        self.actions.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_action_down(&self, platform: &dyn Platform, action: &str) -> bool {
        self.keys_for(action).iter().any(|&k| platform.is_key_down(k))
    }

    pub fn is_action_pressed(&self, platform: &dyn Platform, action: &str) -> bool {
        self.keys_for(action).iter().any(|&k| platform.is_key_pressed(k))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_bind_move_forward() {
        let b = Bindings::defaults();
        assert!(b.keys_for("move_forward").contains(&Key::W));
    }

    #[test]
    fn from_json_overrides_single_key() {
        let b = Bindings::from_json(r#"{"move_forward": "i"}"#).unwrap();
        assert_eq!(b.keys_for("move_forward"), &[Key::I]);
        // unrelated defaults survive
        assert!(!b.keys_for("toggle_console").is_empty());
    }

    #[test]
    fn from_json_accepts_key_list() {
        let b = Bindings::from_json(r#"{"move_forward": ["w", "up"]}"#).unwrap();
        assert_eq!(b.keys_for("move_forward"), &[Key::W, Key::Up]);
    }

    #[test]
    fn from_json_rejects_unknown_key() {
        assert!(matches!(
            Bindings::from_json(r#"{"move_forward": "nope"}"#),
            Err(Error::UnknownKey(_))
        ));
    }

    #[test]
    fn unbound_action_has_no_keys() {
        let b = Bindings::defaults();
        assert!(b.keys_for("no_such_action").is_empty());
    }
}
