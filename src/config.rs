use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::dialogue::FormId;
use crate::speech::SpeechCheckType;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// A `0xRRGGBB` text color. In JSON either a number or a `"#RRGGBB"` /
/// `"0xRRGGBB"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawColor")]
pub struct Color(pub u32);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColor {
    Number(u32),
    Text(String),
}

impl TryFrom<RawColor> for Color {
    type Error = String;

    fn try_from(raw: RawColor) -> std::result::Result<Self, Self::Error> {
        let value = match raw {
            RawColor::Number(n) => n,
            RawColor::Text(s) => {
                let digits = s
                    .strip_prefix('#')
                    .or_else(|| s.strip_prefix("0x"))
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(&s);
                u32::from_str_radix(digits, 16).map_err(|e| format!("invalid color '{s}': {e}"))?
            }
        };
        if value > 0xFF_FFFF {
            return Err(format!("color {value:#x} does not fit in 0xRRGGBB"));
        }
        Ok(Color(value))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Settings groups
// ---------------------------------------------------------------------------

/// When the subtitle bar should show annotations for a highlighted topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SubtitleMode {
    #[default]
    Never,
    /// Only topics that carry a tag but no detectable check.
    OnlyNoCheck,
    AllChecks,
}

/// Format strings with positional placeholders:
/// `{0}` main text, `{1}` tag text, `{2}` result text, `{3}` required speech
/// level, `{4}` predicted response, `{5}` player speech level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Formats {
    pub persuade_topic: String,
    pub intimidate_topic: String,
    pub bribe_topic: String,
    pub persuade_subtitle: String,
    pub intimidate_subtitle: String,
    pub bribe_subtitle: String,
}

impl Default for Formats {
    fn default() -> Self {
        Self {
            persuade_topic: "{0} ({1} {3}: {2})".into(),
            intimidate_topic: "{0} ({1}: {2})".into(),
            bribe_topic: "{0} ({1}: {2})".into(),
            persuade_subtitle: "{2} (Speech {5}/{3}): {4}".into(),
            intimidate_subtitle: "{2}: {4}".into(),
            bribe_subtitle: "{2}: {4}".into(),
        }
    }
}

impl Formats {
    pub fn topic(&self, check: SpeechCheckType) -> Option<&str> {
        match check {
            SpeechCheckType::Persuade => Some(self.persuade_topic.as_str()),
            SpeechCheckType::Intimidate => Some(self.intimidate_topic.as_str()),
            SpeechCheckType::Bribe => Some(self.bribe_topic.as_str()),
            SpeechCheckType::None => None,
        }
    }

    pub fn subtitle(&self, check: SpeechCheckType) -> Option<&str> {
        match check {
            SpeechCheckType::Persuade => Some(self.persuade_subtitle.as_str()),
            SpeechCheckType::Intimidate => Some(self.intimidate_subtitle.as_str()),
            SpeechCheckType::Bribe => Some(self.bribe_subtitle.as_str()),
            SpeechCheckType::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CheckResults {
    pub success: String,
    pub failure: String,
    pub no_check: String,
}

impl Default for CheckResults {
    fn default() -> Self {
        Self {
            success: "Success".into(),
            failure: "Failure".into(),
            no_check: "No Check".into(),
        }
    }
}

/// Regexes matched against the end of a topic's display text. Capture group 1
/// is the tag text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagPatterns {
    pub persuade: String,
    pub intimidate: String,
    pub bribe: String,
}

impl Default for TagPatterns {
    fn default() -> Self {
        Self {
            persuade: r" \((Persuade)\)$".into(),
            intimidate: r" \((Intimidate)\)$".into(),
            bribe: r" \((\d+ gold)\)$".into(),
        }
    }
}

/// Tag text used when the condition walk finds a check on a topic whose text
/// carries no tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagPlaceholders {
    pub persuade: String,
    pub intimidate: String,
    pub bribe: String,
}

impl Default for TagPlaceholders {
    fn default() -> Self {
        Self {
            persuade: "Persuade".into(),
            intimidate: "Intimidate".into(),
            bribe: "Bribe".into(),
        }
    }
}

impl TagPlaceholders {
    pub fn for_check(&self, check: SpeechCheckType) -> Option<&str> {
        match check {
            SpeechCheckType::Persuade => Some(self.persuade.as_str()),
            SpeechCheckType::Intimidate => Some(self.intimidate.as_str()),
            SpeechCheckType::Bribe => Some(self.bribe.as_str()),
            SpeechCheckType::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub success: Color,
    pub failure_new: Color,
    pub failure_old: Color,
    pub no_check_new: Color,
    pub no_check_old: Color,
    pub regular_new: Color,
    pub regular_old: Color,
    pub subtitle: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            success: Color(0x00FF00),
            failure_new: Color(0xFF0000),
            failure_old: Color(0x600000),
            no_check_new: Color(0xFFD700),
            no_check_old: Color(0x605000),
            regular_new: Color(0xFFFFFF),
            regular_old: Color(0x606060),
            subtitle: Color(0xC0C0C0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Requirements {
    /// Only annotate dialogue while the player has `required_perk`.
    pub require_perk: bool,
    pub required_perk: FormId,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub apply_topic_formatting: bool,
    pub apply_topic_colors: bool,
    pub show_subtitles: SubtitleMode,
    pub formats: Formats,
    pub check_results: CheckResults,
    pub tag_patterns: TagPatterns,
    pub tag_placeholders: TagPlaceholders,
    pub colors: Colors,
    pub requirements: Requirements,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            apply_topic_formatting: true,
            apply_topic_colors: true,
            show_subtitles: SubtitleMode::Never,
            formats: Formats::default(),
            check_results: CheckResults::default(),
            tag_patterns: TagPatterns::default(),
            tag_placeholders: TagPlaceholders::default(),
            colors: Colors::default(),
            requirements: Requirements::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse settings JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings = Self::from_json(&json)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Whether the rendering layer needs the annotation map at all.
    pub fn needs_annotations(&self) -> bool {
        self.apply_topic_colors || self.show_subtitles != SubtitleMode::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_groups_keep_remaining_defaults() {
        let settings = Settings::from_json(
            r##"{
                "show_subtitles": "OnlyNoCheck",
                "check_results": { "success": "Pass" },
                "colors": { "success": "#00AA00", "failure_new": "0xAA0000", "failure_old": 4194304 }
            }"##,
        )
        .unwrap();
        assert_eq!(settings.show_subtitles, SubtitleMode::OnlyNoCheck);
        assert_eq!(settings.check_results.success, "Pass");
        assert_eq!(settings.check_results.failure, "Failure");
        assert_eq!(settings.colors.success, Color(0x00AA00));
        assert_eq!(settings.colors.failure_new, Color(0xAA0000));
        assert_eq!(settings.colors.failure_old, Color(0x400000));
        assert_eq!(settings.colors.regular_new, Color(0xFFFFFF));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        assert!(Settings::from_json(r#"{"colors": {"success": "green"}}"#).is_err());
        assert!(Settings::from_json(r##"{"colors": {"success": "#1000000"}}"##).is_err());
    }

    #[test]
    fn test_needs_annotations() {
        let mut settings = Settings::default();
        assert!(settings.needs_annotations());
        settings.apply_topic_colors = false;
        assert!(!settings.needs_annotations());
        settings.show_subtitles = SubtitleMode::AllChecks;
        assert!(settings.needs_annotations());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color(0x00FF00).to_string(), "#00FF00");
    }
}
