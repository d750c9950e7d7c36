pub mod check;
pub mod tag;

use std::fmt;

pub use check::{resolve_check, CheckOutcome};
pub use tag::{TagMatch, TagMatchers, BRIBE_COST_MARKER};

/// The kind of speech check a topic leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpeechCheckType {
    Persuade,
    Intimidate,
    Bribe,
    #[default]
    None,
}

impl SpeechCheckType {
    pub fn is_some(self) -> bool {
        self != SpeechCheckType::None
    }

    pub fn is_none(self) -> bool {
        self == SpeechCheckType::None
    }
}

impl fmt::Display for SpeechCheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpeechCheckType::Persuade => "persuade",
            SpeechCheckType::Intimidate => "intimidate",
            SpeechCheckType::Bribe => "bribe",
            SpeechCheckType::None => "none",
        };
        f.write_str(name)
    }
}

/// Everything known about one topic's speech check, built fresh for each
/// processed line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechCheckData {
    /// Display text with the trailing tag removed.
    pub main_text: String,
    /// Inner text of the tag, or the configured placeholder when only the
    /// condition walk found a check.
    pub tag_text: String,
    /// Check type implied by the tag text alone.
    pub tag_type: SpeechCheckType,
    /// Check type found in the response conditions. Wins over `tag_type`.
    pub check_type: SpeechCheckType,
    pub passes_check: bool,
    /// Only meaningful for persuasion; bribe and intimidate formulas are not
    /// a single threshold.
    pub required_speech_level: f32,
    pub predicted_response_text: String,
}

impl SpeechCheckData {
    /// The check type the presentation should follow: the condition walk if
    /// it found something, the tag otherwise.
    pub fn implied_check_type(&self) -> SpeechCheckType {
        if self.check_type.is_some() {
            self.check_type
        } else {
            self.tag_type
        }
    }
}
