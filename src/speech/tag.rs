use log::{debug, error};
use regex::Regex;

use crate::config::TagPatterns;
use crate::error::PatternError;
use crate::speech::SpeechCheckType;

/// Placeholder the engine expands to the bribe amount. The "(N gold)" tag is
/// also used by ordinary purchases, so a gold tag only counts as a bribe when
/// the topic's authored name contains this marker.
pub const BRIBE_COST_MARKER: &str = "<bribecost>";

/// Result of matching a topic's display text against the tag patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct TagMatch {
    pub main_text: String,
    pub tag_text: String,
    pub tag_type: SpeechCheckType,
}

impl TagMatch {
    fn untagged(text: &str) -> Self {
        Self {
            main_text: text.to_string(),
            tag_text: String::new(),
            tag_type: SpeechCheckType::None,
        }
    }
}

/// Compiled tag patterns. A pattern that failed to compile is `None` and
/// never matches.
#[derive(Debug, Clone)]
pub struct TagMatchers {
    persuade: Option<Regex>,
    intimidate: Option<Regex>,
    bribe: Option<Regex>,
}

impl TagMatchers {
    pub fn compile(patterns: &TagPatterns) -> Self {
        Self {
            persuade: compile_logged(SpeechCheckType::Persuade, &patterns.persuade),
            intimidate: compile_logged(SpeechCheckType::Intimidate, &patterns.intimidate),
            bribe: compile_logged(SpeechCheckType::Bribe, &patterns.bribe),
        }
    }

    /// Split `text` into main text and tag. Patterns are tried in priority
    /// order persuade, intimidate, bribe; the first match wins.
    pub fn extract(&self, text: &str, full_name: &str) -> TagMatch {
        let candidates = [
            (SpeechCheckType::Persuade, &self.persuade),
            (SpeechCheckType::Intimidate, &self.intimidate),
            (SpeechCheckType::Bribe, &self.bribe),
        ];

        for (tag_type, regex) in candidates {
            let Some(regex) = regex else {
                continue;
            };
            let Some(caps) = regex.captures(text) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let tag_text = caps
                .get(1)
                .map_or_else(|| whole.as_str().trim(), |m| m.as_str())
                .to_string();
            let main_text = format!("{}{}", &text[..whole.start()], &text[whole.end()..]);

            // A gold tag without the marker is a price: the segment is still
            // split off, but it does not make the topic a bribe.
            let tag_type = if tag_type == SpeechCheckType::Bribe && !is_bribe_topic(full_name) {
                debug!("Gold tag on '{text}' is not a bribe (no {BRIBE_COST_MARKER} in name)");
                SpeechCheckType::None
            } else {
                tag_type
            };
            return TagMatch {
                main_text,
                tag_text,
                tag_type,
            };
        }

        TagMatch::untagged(text)
    }
}

fn compile(kind: SpeechCheckType, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError {
        kind,
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_logged(kind: SpeechCheckType, pattern: &str) -> Option<Regex> {
    match compile(kind, pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("{e}; {kind} tags will not be recognized");
            None
        }
    }
}

fn is_bribe_topic(full_name: &str) -> bool {
    full_name.to_lowercase().contains(BRIBE_COST_MARKER)
}
