use std::collections::HashMap;

use log::{debug, warn};

use crate::config::{Color, Settings, SubtitleMode};
use crate::dialogue::{DialogueLine, Topic};
use crate::host::DialogueHost;
use crate::speech::{resolve_check, SpeechCheckData, SpeechCheckType, TagMatchers};
use crate::template::{self, Arg};

/// What the rendering layer needs for one topic. The topic list UI only sees
/// rendered strings, so this is looked up by the final display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDisplayData {
    pub new_color: Color,
    pub old_color: Color,
    pub subtitle: String,
}

/// Annotations for the current dialogue menu, keyed by rendered topic text.
/// Two topics that render to the same text share one entry.
pub type AnnotationMap = HashMap<String, TopicDisplayData>;

/// Turns a dialogue line into its final presentation: formatted text, colors
/// and subtitle.
pub struct TopicProcessor<'a> {
    settings: &'a Settings,
    matchers: &'a TagMatchers,
}

impl<'a> TopicProcessor<'a> {
    pub fn new(settings: &'a Settings, matchers: &'a TagMatchers) -> Self {
        Self { settings, matchers }
    }

    /// Build the speech check data for a line.
    ///
    /// Lines without a parent topic get the empty default.
    pub fn speech_check_data<H: DialogueHost>(
        &self,
        text: &str,
        topic: Option<&Topic>,
        host: &H,
    ) -> SpeechCheckData {
        let Some(topic) = topic else {
            return SpeechCheckData::default();
        };

        let tag = self.matchers.extract(text, &topic.full_name);
        let outcome = resolve_check(topic, tag.tag_type, host);

        let mut tag_text = tag.tag_text;
        if tag.tag_type.is_none() {
            if let Some(placeholder) = self.settings.tag_placeholders.for_check(outcome.check_type)
            {
                tag_text = placeholder.to_string();
            }
        }

        SpeechCheckData {
            main_text: tag.main_text,
            tag_text,
            tag_type: tag.tag_type,
            check_type: outcome.check_type,
            passes_check: outcome.passes_check,
            required_speech_level: outcome.required_speech_level,
            predicted_response_text: outcome.predicted_response_text,
        }
    }

    /// Process one line: rewrite its text if formatting is enabled and record
    /// its annotation under the final text.
    pub fn process<H: DialogueHost>(
        &self,
        line: &mut DialogueLine<'_>,
        host: &H,
        annotations: &mut AnnotationMap,
    ) {
        let data = self.speech_check_data(&line.text, line.topic, host);
        let colors = &self.settings.colors;
        let results = &self.settings.check_results;

        let (result_text, new_color, old_color) = if data.check_type.is_some() {
            if data.passes_check {
                (&results.success, colors.success, colors.success)
            } else {
                (&results.failure, colors.failure_new, colors.failure_old)
            }
        } else if data.tag_type.is_some() {
            (&results.no_check, colors.no_check_new, colors.no_check_old)
        } else {
            // Regular topics are never reformatted and get no subtitle.
            if self.settings.apply_topic_colors {
                annotations.insert(
                    line.text.clone(),
                    TopicDisplayData {
                        new_color: colors.regular_new,
                        old_color: colors.regular_old,
                        subtitle: String::new(),
                    },
                );
            }
            return;
        };

        let implied = data.implied_check_type();
        let player_speech = host.player_speech();
        debug!(
            "Topic '{}': tag={}, check={}, passes={}, implied={}",
            line.text, data.tag_type, data.check_type, data.passes_check, implied
        );

        if self.settings.apply_topic_formatting {
            if let Some(format) = self.settings.formats.topic(implied) {
                if let Some(text) = format_with(format, &data, result_text, player_speech) {
                    line.text = text;
                }
            }
        }

        let mut display = TopicDisplayData {
            new_color,
            old_color,
            subtitle: String::new(),
        };

        if self.shows_subtitle(data.check_type) {
            if let Some(format) = self.settings.formats.subtitle(implied) {
                display.subtitle =
                    format_with(format, &data, result_text, player_speech).unwrap_or_default();
            }
            annotations.insert(line.text.clone(), display);
        } else if self.settings.apply_topic_colors {
            annotations.insert(line.text.clone(), display);
        }
    }

    fn shows_subtitle(&self, check_type: SpeechCheckType) -> bool {
        match self.settings.show_subtitles {
            SubtitleMode::Never => false,
            SubtitleMode::OnlyNoCheck => check_type.is_none(),
            SubtitleMode::AllChecks => true,
        }
    }
}

/// Render a topic or subtitle format. A broken format logs and yields `None`
/// so the caller keeps the unformatted text.
fn format_with(
    format: &str,
    data: &SpeechCheckData,
    result_text: &str,
    player_speech: f32,
) -> Option<String> {
    let args = [
        Arg::Text(&data.main_text),
        Arg::Text(&data.tag_text),
        Arg::Text(result_text),
        Arg::Number(data.required_speech_level),
        Arg::Text(&data.predicted_response_text),
        Arg::Number(player_speech),
    ];
    match template::render(format, &args) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Failed to apply format '{format}': {e}");
            None
        }
    }
}
