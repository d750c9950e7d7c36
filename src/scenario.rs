use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::dialogue::{
    ActorValue, ComparisonValue, ConditionFunction, ConditionItem, DialogueLine, FormId,
    ResponseCandidate, Topic,
};
use crate::host::DialogueHost;

// ---------------------------------------------------------------------------
// In-memory host
// ---------------------------------------------------------------------------

/// Player state the in-memory host evaluates conditions against.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub speech: f32,
    /// Actor values other than Speech, by raw actor value index.
    pub actor_values: HashMap<u32, f32>,
    pub equipped: HashSet<FormId>,
    pub perks: HashSet<FormId>,
    pub bribe_success: bool,
    pub intimidate_success: bool,
    /// Results of any other condition function, by function code. Missing
    /// functions evaluate to 0.
    pub facts: HashMap<u16, f32>,
}

/// The NPC the player is talking to and what they would say per response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Speaker {
    pub name: String,
    #[serde(default)]
    pub responses: HashMap<FormId, Vec<String>>,
}

impl Speaker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: HashMap::new(),
        }
    }

    pub fn with_response(mut self, response: FormId, text: impl Into<String>) -> Self {
        self.responses.entry(response).or_default().push(text.into());
        self
    }
}

/// A [`DialogueHost`] backed by plain data, used by the demo binary and
/// tests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioHost {
    pub player: PlayerState,
    pub globals: HashMap<String, f32>,
    /// Forms that exist and are perks, whether or not the player has them.
    pub known_perks: HashSet<FormId>,
    /// `None` when the speaker reference is no longer live.
    pub speaker: Option<Speaker>,
}

impl ScenarioHost {
    pub fn new(player: PlayerState) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    fn function_value(&self, function: &ConditionFunction) -> f32 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match function {
            ConditionFunction::GetActorValue(ActorValue::Speech) => self.player.speech,
            ConditionFunction::GetActorValue(ActorValue::Other(av)) => {
                self.player.actor_values.get(av).copied().unwrap_or(0.0)
            }
            ConditionFunction::GetBribeSuccess => flag(self.player.bribe_success),
            ConditionFunction::GetIntimidateSuccess => flag(self.player.intimidate_success),
            ConditionFunction::GetEquipped(item) => flag(self.player.equipped.contains(item)),
            ConditionFunction::Other(code) => self.player.facts.get(code).copied().unwrap_or(0.0),
        }
    }
}

impl DialogueHost for ScenarioHost {
    fn player_speech(&self) -> f32 {
        self.player.speech
    }

    fn evaluate(&self, item: &ConditionItem) -> bool {
        let rhs = match &item.value {
            ComparisonValue::Literal(v) => *v,
            ComparisonValue::Global { global } => self.global_value(global).unwrap_or(0.0),
        };
        item.op.compare(self.function_value(&item.function), rhs)
    }

    fn global_value(&self, name: &str) -> Option<f32> {
        self.globals.get(name).copied()
    }

    fn response_text(&self, response: &ResponseCandidate) -> Option<String> {
        self.speaker
            .as_ref()?
            .responses
            .get(&response.id)?
            .first()
            .cloned()
    }

    fn has_perk(&self, perk: FormId) -> Option<bool> {
        if self.player.perks.contains(&perk) {
            Some(true)
        } else if self.known_perks.contains(&perk) {
            Some(false)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

/// A visible topic-list entry. `text` defaults to the topic's full name.
#[derive(Debug, Clone, Deserialize)]
pub struct LineSpec {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub topic: Option<FormId>,
}

/// A dialogue menu snapshot: host state, topics and the visible lines.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub host: ScenarioHost,
    pub topics: Vec<Topic>,
    pub lines: Vec<LineSpec>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse scenario JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        let scenario = Self::from_json(&json)
            .with_context(|| format!("invalid scenario in {}", path.display()))?;
        info!(
            "Loaded scenario {} ({} topics, {} lines)",
            path.display(),
            scenario.topics.len(),
            scenario.lines.len()
        );
        Ok(scenario)
    }

    pub fn topic(&self, id: FormId) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Fresh dialogue lines, as the engine hands them out on every refresh.
    pub fn lines(&self) -> Vec<DialogueLine<'_>> {
        self.lines
            .iter()
            .map(|entry| {
                let topic = entry.topic.and_then(|id| {
                    let topic = self.topic(id);
                    if topic.is_none() {
                        warn!("Line refers to unknown topic {id:#010X}");
                    }
                    topic
                });
                let text = match (&entry.text, topic) {
                    (Some(text), _) => text.clone(),
                    (None, Some(topic)) => topic.full_name.clone(),
                    (None, None) => String::new(),
                };
                DialogueLine { text, topic }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// City gate scenario
// ---------------------------------------------------------------------------

const AMULET_OF_ARTICULATION: FormId = 0x000C_8911;
const QUEST_STAGE_DONE: u16 = 58;

/// A gate guard with one topic of each kind: a persuasion check with the
/// equipment bonus, an intimidation, a bribe, a tagged topic with no real
/// check, a gold purchase that is not a bribe, and a plain topic.
pub fn city_gate_scenario() -> Scenario {
    let topics = vec![
        Topic::new(0x0001_0001, "I'm here on official business. (Persuade)")
            .with_response(
                ResponseCandidate::new(0x0002_0001)
                    .with_condition(
                        ConditionItem::speech_at_least(0.0)
                            .or()
                            .with_global("SpeechAverage"),
                    )
                    .with_condition(ConditionItem::equipped(AMULET_OF_ARTICULATION)),
            )
            .with_response(ResponseCandidate::new(0x0002_0002)),
        Topic::new(0x0001_0002, "Open the gate or else. (Intimidate)")
            .with_response(
                ResponseCandidate::new(0x0002_0003).with_condition(ConditionItem::is_true(
                    ConditionFunction::GetIntimidateSuccess,
                )),
            )
            .with_response(ResponseCandidate::new(0x0002_0004)),
        Topic::new(0x0001_0003, "Maybe this will help. (<BribeCost> gold)")
            .with_response(
                ResponseCandidate::new(0x0002_0005)
                    .with_condition(ConditionItem::is_true(ConditionFunction::GetBribeSuccess)),
            )
            .with_response(ResponseCandidate::new(0x0002_0006)),
        Topic::new(0x0001_0004, "Come on, you can trust me. (Persuade)").with_response(
            ResponseCandidate::new(0x0002_0007).with_condition(ConditionItem::is_true(
                ConditionFunction::Other(QUEST_STAGE_DONE),
            )),
        ),
        Topic::new(0x0001_0005, "I'd like a travel pass. (20 gold)")
            .with_response(ResponseCandidate::new(0x0002_0008)),
        Topic::new(0x0001_0006, "What's the news?")
            .with_response(ResponseCandidate::new(0x0002_0009)),
    ];

    let speaker = Speaker::new("Gate Guard")
        .with_response(0x0002_0001, "Official business, eh? Go on through.")
        .with_response(0x0002_0002, "Nice try. The gate stays shut.")
        .with_response(0x0002_0003, "All right, all right! No need for that.")
        .with_response(0x0002_0004, "Threaten me again and you'll regret it.")
        .with_response(0x0002_0005, "I didn't see anything. Go on.")
        .with_response(0x0002_0006, "Keep your coin. I'm not for sale.")
        .with_response(0x0002_0007, "Sorry, orders are orders.")
        .with_response(0x0002_0008, "Here's your pass.")
        .with_response(0x0002_0009, "Bandits on the north road again.");

    let mut globals = HashMap::new();
    globals.insert("SpeechAverage".to_string(), 50.0);

    let host = ScenarioHost {
        player: PlayerState {
            speech: 35.0,
            bribe_success: true,
            ..PlayerState::default()
        },
        globals,
        known_perks: HashSet::new(),
        speaker: Some(speaker),
    };

    let lines = vec![
        LineSpec {
            text: None,
            topic: Some(0x0001_0001),
        },
        LineSpec {
            text: None,
            topic: Some(0x0001_0002),
        },
        LineSpec {
            text: Some("Maybe this will help. (100 gold)".into()),
            topic: Some(0x0001_0003),
        },
        LineSpec {
            text: None,
            topic: Some(0x0001_0004),
        },
        LineSpec {
            text: None,
            topic: Some(0x0001_0005),
        },
        LineSpec {
            text: None,
            topic: Some(0x0001_0006),
        },
    ];

    Scenario {
        host,
        topics,
        lines,
    }
}
