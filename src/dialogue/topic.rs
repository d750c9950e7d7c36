use serde::Deserialize;

use crate::dialogue::condition::{ConditionItem, FormId};

/// One possible scripted reply to a topic, guarded by its conditions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseCandidate {
    pub id: FormId,
    #[serde(default)]
    pub conditions: Vec<ConditionItem>,
}

impl ResponseCandidate {
    pub fn new(id: FormId) -> Self {
        Self {
            id,
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: ConditionItem) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// A dialogue topic the player can select.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topic {
    pub id: FormId,
    /// The authored name, which may still contain placeholders such as
    /// `<BribeCost>` that the engine expands before display.
    pub full_name: String,
    /// Ordered candidates; later entries act as fallbacks.
    #[serde(default)]
    pub responses: Vec<ResponseCandidate>,
}

impl Topic {
    pub fn new(id: FormId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            responses: Vec::new(),
        }
    }

    pub fn with_response(mut self, response: ResponseCandidate) -> Self {
        self.responses.push(response);
        self
    }
}

/// A visible line in the topic list: mutable display text plus the topic it
/// belongs to. The host may hand out lines without a parent topic.
#[derive(Debug, Clone)]
pub struct DialogueLine<'a> {
    pub text: String,
    pub topic: Option<&'a Topic>,
}

impl<'a> DialogueLine<'a> {
    pub fn new(text: impl Into<String>, topic: &'a Topic) -> Self {
        Self {
            text: text.into(),
            topic: Some(topic),
        }
    }

    pub fn orphan(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            topic: None,
        }
    }
}
