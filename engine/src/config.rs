//! User config JSON (spec §6): window/console chrome plus input bindings,
//! persisted under the platform's user-data root at `data/config.json`.

use input::Bindings;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An 8-bit RGBA color, wire-encoded as `"#RRGGBBAA"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:02X}{:02X}{:02X}{:02X}", self.0, self.1, self.2, self.3))
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_hex(&text).ok_or_else(|| D::Error::custom(format!("malformed color: {}", text)))
    }
}

fn parse_hex(text: &str) -> Option<Rgba> {
    let hex = text.strip_prefix('#')?;
    if hex.len() != 8 {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?))
}

/// The persisted shape (spec §6 "User config JSON"). `input` is kept as a
/// raw JSON object so unknown-key rejection happens in [`input::Bindings`],
/// not here — this struct only owns the window/console chrome fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserConfigWire {
    window_size: u32,
    fullscreen: bool,
    logical_resolution: (u32, u32),
    console_background: Rgba,
    console_text: Rgba,
    console_font: String,
    console_font_size: u32,
    #[serde(default)]
    input: serde_json::Map<String, serde_json::Value>,
}

/// The engine's parsed user config. Constructed by [`UserConfig::from_json`]
/// or [`UserConfig::default`]; the `input` bindings are resolved eagerly so
/// callers never touch raw JSON after load.
#[derive(Debug, Clone)]
pub struct UserConfig {
    pub window_size: u32,
    pub fullscreen: bool,
    pub logical_resolution: (u32, u32),
    pub console_background: Rgba,
    pub console_text: Rgba,
    pub console_font: String,
    pub console_font_size: u32,
    pub input: Bindings,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            fullscreen: false,
            logical_resolution: (320, 180),
            console_background: Rgba(0x00, 0x00, 0x00, 0xAA),
            console_text: Rgba(0xFF, 0xFF, 0xFF, 0xFF),
            console_font: "fonts/unscii-8-thin.ttf".to_string(),
            console_font_size: 8,
            input: Bindings::defaults(),
        }
    }
}

impl UserConfig {
    /// Parses a config file's text. Per spec §7 ("JSON parse failure: the
    /// whole file is ignored, defaults remain"), any structural error —
    /// including a malformed color string or an unknown input key name —
    /// discards the whole file rather than partially applying it.
    pub fn from_json(text: &str) -> Self {
        match Self::try_from_json(text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed user config: {}", err);
                Self::default()
            }
        }
    }

    fn try_from_json(text: &str) -> Result<Self, String> {
        let wire: UserConfigWire = serde_json::from_str(text).map_err(|e| e.to_string())?;
        let input_text = serde_json::to_string(&wire.input).map_err(|e| e.to_string())?;
        let bindings = Bindings::from_json(&input_text).map_err(|e| e.to_string())?;
        Ok(Self {
            window_size: wire.window_size,
            fullscreen: wire.fullscreen,
            logical_resolution: wire.logical_resolution,
            console_background: wire.console_background,
            console_text: wire.console_text,
            console_font: wire.console_font,
            console_font_size: wire.console_font_size,
            input: bindings,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let config = UserConfig::default();
        assert_eq!(config.logical_resolution, (320, 180));
        assert_eq!(config.console_background, Rgba(0x00, 0x00, 0x00, 0xAA));
    }

    #[test]
    fn parses_well_formed_config() {
        let text = r#"{
            "window_size": 4,
            "fullscreen": true,
            "logical_resolution": [640, 360],
            "console_background": "#000000AA",
            "console_text": "#FFFFFFFF",
            "console_font": "fonts/unscii-8-thin.ttf",
            "console_font_size": 8,
            "input": {"move_forward": "i"}
        }"#;
        let config = UserConfig::from_json(text);
        assert_eq!(config.window_size, 4);
        assert!(config.fullscreen);
        assert_eq!(config.logical_resolution, (640, 360));
    }

    #[test]
    fn malformed_color_falls_back_to_defaults() {
        let text = r#"{
            "window_size": 4,
            "fullscreen": true,
            "logical_resolution": [640, 360],
            "console_background": "not-a-color",
            "console_text": "#FFFFFFFF",
            "console_font": "fonts/unscii-8-thin.ttf",
            "console_font_size": 8
        }"#;
        let config = UserConfig::from_json(text);
        assert_eq!(config.window_size, UserConfig::default().window_size);
    }

    #[test]
    fn garbage_json_falls_back_to_defaults() {
        let config = UserConfig::from_json("not json at all");
        assert_eq!(config.logical_resolution, UserConfig::default().logical_resolution);
    }

    #[test]
    fn unknown_input_key_falls_back_to_defaults() {
        let text = r#"{
            "window_size": 4,
            "fullscreen": true,
            "logical_resolution": [640, 360],
            "console_background": "#000000AA",
            "console_text": "#FFFFFFFF",
            "console_font": "fonts/unscii-8-thin.ttf",
            "console_font_size": 8,
            "input": {"move_forward": "nope"}
        }"#;
        let config = UserConfig::from_json(text);
        assert_eq!(config.window_size, UserConfig::default().window_size);
    }
}
