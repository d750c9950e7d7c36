use log::trace;

use crate::config::{Color, Settings, SubtitleMode};
use crate::processor::{AnnotationMap, TopicDisplayData};

/// Read-only view the rendering layer uses while painting the topic list.
/// Every lookup is by the text actually on screen.
pub struct TopicOverlay<'a> {
    settings: &'a Settings,
    annotations: &'a AnnotationMap,
}

impl<'a> TopicOverlay<'a> {
    pub fn new(settings: &'a Settings, annotations: &'a AnnotationMap) -> Self {
        Self {
            settings,
            annotations,
        }
    }

    pub fn display_data(&self, rendered: &str) -> Option<&'a TopicDisplayData> {
        self.annotations.get(rendered)
    }

    /// Color for a topic entry, `None` to keep the menu's own color.
    pub fn text_color(&self, rendered: &str, topic_is_new: bool) -> Option<Color> {
        if !self.settings.apply_topic_colors {
            return None;
        }
        let display = self.display_data(rendered)?;
        Some(if topic_is_new {
            display.new_color
        } else {
            display.old_color
        })
    }
}

/// The menu's subtitle line, shared between real NPC speech and topic
/// annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBar {
    pub text: String,
    pub color: Color,
    default_color: Color,
    /// Whether `text` came from the game rather than from an annotation.
    is_game_subtitle: bool,
}

impl SubtitleBar {
    pub fn new(default_color: Color) -> Self {
        Self {
            text: String::new(),
            color: default_color,
            default_color,
            is_game_subtitle: false,
        }
    }

    pub fn is_game_subtitle(&self) -> bool {
        self.is_game_subtitle
    }

    /// The game shows NPC speech.
    pub fn show_game_subtitle(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.color = self.default_color;
        self.is_game_subtitle = true;
    }

    /// The highlighted topic changed. Returns whether the bar was updated.
    ///
    /// An annotation with an empty subtitle never replaces real speech that
    /// is still on screen.
    pub fn highlight(&mut self, overlay: &TopicOverlay<'_>, highlighted: &str) -> bool {
        if overlay.settings.show_subtitles == SubtitleMode::Never || highlighted.is_empty() {
            return false;
        }
        let Some(display) = overlay.display_data(highlighted) else {
            return false;
        };
        if display.subtitle.is_empty()
            && self.is_game_subtitle
            && !self.text.is_empty()
            && self.text != " "
        {
            trace!("Keeping game subtitle over empty annotation for '{highlighted}'");
            return false;
        }

        self.text.clone_from(&display.subtitle);
        self.color = overlay.settings.colors.subtitle;
        self.is_game_subtitle = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations() -> AnnotationMap {
        let mut map = AnnotationMap::new();
        map.insert(
            "Let me through. (Persuade 40: Failure)".into(),
            TopicDisplayData {
                new_color: Color(0xFF0000),
                old_color: Color(0x600000),
                subtitle: "Failure: Nice try.".into(),
            },
        );
        map.insert(
            "What's new?".into(),
            TopicDisplayData {
                new_color: Color(0xFFFFFF),
                old_color: Color(0x606060),
                subtitle: String::new(),
            },
        );
        map
    }

    fn subtitle_settings() -> Settings {
        Settings {
            show_subtitles: SubtitleMode::AllChecks,
            ..Settings::default()
        }
    }

    #[test]
    fn test_text_color() {
        let settings = Settings::default();
        let map = annotations();
        let overlay = TopicOverlay::new(&settings, &map);
        assert_eq!(
            overlay.text_color("Let me through. (Persuade 40: Failure)", true),
            Some(Color(0xFF0000))
        );
        assert_eq!(
            overlay.text_color("Let me through. (Persuade 40: Failure)", false),
            Some(Color(0x600000))
        );
        assert_eq!(overlay.text_color("Goodbye.", true), None);
    }

    #[test]
    fn test_text_color_disabled() {
        let settings = Settings {
            apply_topic_colors: false,
            ..subtitle_settings()
        };
        let map = annotations();
        let overlay = TopicOverlay::new(&settings, &map);
        assert_eq!(overlay.text_color("What's new?", true), None);
    }

    #[test]
    fn test_highlight_shows_annotation_subtitle() {
        let settings = subtitle_settings();
        let map = annotations();
        let overlay = TopicOverlay::new(&settings, &map);
        let mut bar = SubtitleBar::new(Color(0xFFFFFF));

        bar.show_game_subtitle("Halt! Who goes there?");
        assert!(bar.highlight(&overlay, "Let me through. (Persuade 40: Failure)"));
        assert_eq!(bar.text, "Failure: Nice try.");
        assert_eq!(bar.color, settings.colors.subtitle);
        assert!(!bar.is_game_subtitle());

        bar.show_game_subtitle("Move along.");
        assert_eq!(bar.color, Color(0xFFFFFF));
        assert!(bar.is_game_subtitle());
    }

    #[test]
    fn test_empty_annotation_keeps_real_subtitle() {
        let settings = subtitle_settings();
        let map = annotations();
        let overlay = TopicOverlay::new(&settings, &map);
        let mut bar = SubtitleBar::new(Color(0xFFFFFF));

        bar.show_game_subtitle("Halt! Who goes there?");
        assert!(!bar.highlight(&overlay, "What's new?"));
        assert_eq!(bar.text, "Halt! Who goes there?");

        // A blank game subtitle may be cleared.
        bar.show_game_subtitle(" ");
        assert!(bar.highlight(&overlay, "What's new?"));
        assert_eq!(bar.text, "");

        // Moving from an annotated topic to a plain one clears the bar.
        assert!(bar.highlight(&overlay, "Let me through. (Persuade 40: Failure)"));
        assert!(bar.highlight(&overlay, "What's new?"));
        assert_eq!(bar.text, "");
    }

    #[test]
    fn test_highlight_ignores_unknown_and_empty_text() {
        let settings = subtitle_settings();
        let map = annotations();
        let overlay = TopicOverlay::new(&settings, &map);
        let mut bar = SubtitleBar::new(Color(0xFFFFFF));
        bar.show_game_subtitle("Halt!");

        assert!(!bar.highlight(&overlay, ""));
        assert!(!bar.highlight(&overlay, "Goodbye."));
        assert_eq!(bar.text, "Halt!");
    }

    #[test]
    fn test_highlight_disabled_when_subtitles_never() {
        let settings = Settings::default();
        let map = annotations();
        let overlay = TopicOverlay::new(&settings, &map);
        let mut bar = SubtitleBar::new(Color(0xFFFFFF));
        assert!(!bar.highlight(&overlay, "Let me through. (Persuade 40: Failure)"));
    }
}
