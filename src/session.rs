use std::collections::HashMap;

use log::{debug, error, info};

use crate::config::{Requirements, Settings};
use crate::dialogue::{DialogueLine, FormId, Topic};
use crate::host::DialogueHost;
use crate::overlay::TopicOverlay;
use crate::processor::{AnnotationMap, TopicProcessor};
use crate::speech::TagMatchers;

/// Messages the dialogue menu receives from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMessage {
    Show,
    Update,
    Hide,
    Other,
}

/// Topics can be reused with different text, so the name is part of the key.
type CacheKey = (FormId, String);

/// State owned by one dialogue menu session: the processed-text cache and
/// the annotation map the rendering layer reads.
///
/// Not thread-safe by construction; all calls must come from the UI thread
/// that owns the menu.
pub struct DialogueSession {
    settings: Settings,
    matchers: TagMatchers,
    cache: HashMap<CacheKey, String>,
    annotations: AnnotationMap,
}

impl DialogueSession {
    pub fn new(settings: Settings) -> Self {
        let matchers = TagMatchers::compile(&settings.tag_patterns);
        debug!(
            "Dialogue session opened (formatting={}, annotations={})",
            settings.apply_topic_formatting,
            settings.needs_annotations()
        );
        Self {
            settings,
            matchers,
            cache: HashMap::new(),
            annotations: AnnotationMap::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn handle_message<H: DialogueHost>(
        &mut self,
        message: UiMessage,
        lines: &mut [DialogueLine<'_>],
        host: &H,
    ) {
        match message {
            UiMessage::Show | UiMessage::Update => {
                if requirements_met(&self.settings.requirements, host) {
                    self.refresh(lines, host);
                } else {
                    debug!("Requirements not met, leaving dialogue untouched");
                }
            }
            UiMessage::Hide => self.close(),
            UiMessage::Other => {}
        }
    }

    /// Process every visible line, reusing cached text for topics already
    /// handled in this session.
    pub fn refresh<H: DialogueHost>(&mut self, lines: &mut [DialogueLine<'_>], host: &H) {
        let processor = TopicProcessor::new(&self.settings, &self.matchers);
        let mut hits = 0;

        for line in lines.iter_mut() {
            let Some(topic) = line.topic else {
                processor.process(line, host, &mut self.annotations);
                continue;
            };

            let key = (topic.id, topic.full_name.clone());
            if let Some(text) = self.cache.get(&key) {
                line.text.clone_from(text);
                hits += 1;
                continue;
            }

            processor.process(line, host, &mut self.annotations);
            self.cache.insert(key, line.text.clone());
        }

        info!(
            "Refreshed {} dialogue lines ({hits} from cache, {} annotations)",
            lines.len(),
            self.annotations.len()
        );
    }

    /// Forget everything; the next refresh resolves all topics again.
    pub fn close(&mut self) {
        info!(
            "Dialogue menu closed, dropping {} cached topics and {} annotations",
            self.cache.len(),
            self.annotations.len()
        );
        self.cache.clear();
        self.annotations.clear();
    }

    pub fn cached_text(&self, topic: &Topic) -> Option<&str> {
        self.cache
            .get(&(topic.id, topic.full_name.clone()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty() && self.annotations.is_empty()
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// Query view for the rendering layer.
    pub fn overlay(&self) -> TopicOverlay<'_> {
        TopicOverlay::new(&self.settings, &self.annotations)
    }
}

/// Whether annotation is currently allowed for the player.
pub fn requirements_met<H: DialogueHost>(requirements: &Requirements, host: &H) -> bool {
    if !requirements.require_perk {
        return true;
    }
    match host.has_perk(requirements.required_perk) {
        Some(has) => has,
        None => {
            error!(
                "Form {:#010X} is not a known perk",
                requirements.required_perk
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::dialogue::{ConditionItem, ResponseCandidate};
    use crate::scenario::{PlayerState, ScenarioHost, Speaker};

    /// Counts condition evaluations so tests can tell whether the resolver
    /// ran.
    struct CountingHost {
        inner: ScenarioHost,
        evaluations: Cell<usize>,
    }

    impl CountingHost {
        fn new(speech: f32) -> Self {
            let mut inner = ScenarioHost::new(PlayerState {
                speech,
                ..PlayerState::default()
            });
            inner.speaker = Some(
                Speaker::new("Guard")
                    .with_response(0x10, "Fine, go on through.")
                    .with_response(0x11, "Nice try."),
            );
            Self {
                inner,
                evaluations: Cell::new(0),
            }
        }
    }

    impl DialogueHost for CountingHost {
        fn player_speech(&self) -> f32 {
            self.inner.player_speech()
        }

        fn evaluate(&self, item: &ConditionItem) -> bool {
            self.evaluations.set(self.evaluations.get() + 1);
            self.inner.evaluate(item)
        }

        fn global_value(&self, name: &str) -> Option<f32> {
            self.inner.global_value(name)
        }

        fn response_text(&self, response: &ResponseCandidate) -> Option<String> {
            self.inner.response_text(response)
        }

        fn has_perk(&self, perk: FormId) -> Option<bool> {
            self.inner.has_perk(perk)
        }
    }

    fn persuade_topic() -> Topic {
        Topic::new(0x100, "Let me through. (Persuade)")
            .with_response(
                ResponseCandidate::new(0x10).with_condition(ConditionItem::speech_at_least(40.0)),
            )
            .with_response(ResponseCandidate::new(0x11))
    }

    #[test]
    fn test_second_refresh_uses_cache() {
        let topic = persuade_topic();
        let host = CountingHost::new(30.0);
        let mut session = DialogueSession::new(Settings::default());

        let mut lines = vec![DialogueLine::new(topic.full_name.clone(), &topic)];
        session.handle_message(UiMessage::Show, &mut lines, &host);
        let first = lines[0].text.clone();
        let evaluations = host.evaluations.get();
        assert!(evaluations > 0);
        assert_eq!(session.cached_text(&topic), Some(first.as_str()));

        // The engine resets the text on every update.
        let mut lines = vec![DialogueLine::new(topic.full_name.clone(), &topic)];
        session.handle_message(UiMessage::Update, &mut lines, &host);
        assert_eq!(lines[0].text, first);
        assert_eq!(host.evaluations.get(), evaluations);
    }

    #[test]
    fn test_hide_clears_and_next_show_resolves_again() {
        let topic = persuade_topic();
        let host = CountingHost::new(30.0);
        let mut session = DialogueSession::new(Settings::default());

        let mut lines = vec![DialogueLine::new(topic.full_name.clone(), &topic)];
        session.handle_message(UiMessage::Show, &mut lines, &host);
        assert!(!session.is_empty());

        session.handle_message(UiMessage::Hide, &mut [], &host);
        assert!(session.is_empty());
        assert!(session.annotations().is_empty());
        assert_eq!(session.cached_text(&topic), None);

        let before = host.evaluations.get();
        let mut lines = vec![DialogueLine::new(topic.full_name.clone(), &topic)];
        session.handle_message(UiMessage::Show, &mut lines, &host);
        assert!(host.evaluations.get() > before);
        assert_eq!(lines[0].text, "Let me through. (Persuade 40: Failure)");
    }

    #[test]
    fn test_reused_topic_with_new_name_is_processed() {
        let topic = persuade_topic();
        let mut renamed = topic.clone();
        renamed.full_name = "Let me through, please. (Persuade)".into();
        let host = CountingHost::new(30.0);
        let mut session = DialogueSession::new(Settings::default());

        let mut lines = vec![
            DialogueLine::new(topic.full_name.clone(), &topic),
            DialogueLine::new(renamed.full_name.clone(), &renamed),
        ];
        session.handle_message(UiMessage::Show, &mut lines, &host);
        assert_eq!(lines[0].text, "Let me through. (Persuade 40: Failure)");
        assert_eq!(lines[1].text, "Let me through, please. (Persuade 40: Failure)");
    }

    #[test]
    fn test_identical_text_shares_annotation() {
        let failing = persuade_topic();
        let passing = Topic::new(0x101, failing.full_name.clone())
            .with_response(
                ResponseCandidate::new(0x10).with_condition(ConditionItem::speech_at_least(10.0)),
            )
            .with_response(ResponseCandidate::new(0x11));
        let settings = Settings {
            apply_topic_formatting: false,
            ..Settings::default()
        };
        let host = CountingHost::new(30.0);
        let mut session = DialogueSession::new(settings.clone());

        let mut lines = vec![
            DialogueLine::new(failing.full_name.clone(), &failing),
            DialogueLine::new(passing.full_name.clone(), &passing),
        ];
        session.handle_message(UiMessage::Show, &mut lines, &host);
        // Both lines render the same text; the later topic's colors win.
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(
            session.annotations()[&failing.full_name].new_color,
            settings.colors.success
        );
    }

    #[test]
    fn test_unmet_requirements_leave_text_untouched() {
        let topic = persuade_topic();
        let mut host = CountingHost::new(30.0);
        let settings = Settings {
            requirements: Requirements {
                require_perk: true,
                required_perk: 0x0005_8F75,
            },
            ..Settings::default()
        };
        let mut session = DialogueSession::new(settings);

        let mut lines = vec![DialogueLine::new(topic.full_name.clone(), &topic)];
        session.handle_message(UiMessage::Show, &mut lines, &host);
        assert_eq!(lines[0].text, topic.full_name);
        assert!(session.is_empty());

        host.inner.known_perks.insert(0x0005_8F75);
        session.handle_message(UiMessage::Update, &mut lines, &host);
        assert_eq!(lines[0].text, topic.full_name);

        host.inner.player.perks.insert(0x0005_8F75);
        session.handle_message(UiMessage::Update, &mut lines, &host);
        assert_eq!(lines[0].text, "Let me through. (Persuade 40: Failure)");
    }

    #[test]
    fn test_requirements_unknown_perk() {
        let host = CountingHost::new(30.0);
        let requirements = Requirements {
            require_perk: true,
            required_perk: 0x1234,
        };
        assert!(!requirements_met(&requirements, &host));
        assert!(requirements_met(&Requirements::default(), &host));
    }

    #[test]
    fn test_other_messages_are_ignored() {
        let topic = persuade_topic();
        let host = CountingHost::new(30.0);
        let mut session = DialogueSession::new(Settings::default());
        let mut lines = vec![DialogueLine::new(topic.full_name.clone(), &topic)];
        session.handle_message(UiMessage::Other, &mut lines, &host);
        assert_eq!(lines[0].text, topic.full_name);
        assert!(session.is_empty());
    }
}
