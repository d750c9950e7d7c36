use log::{debug, trace, warn};

use crate::dialogue::{
    ActorValue, ComparisonValue, ConditionFunction, ConditionItem, OpCode, ResponseCandidate,
    Topic,
};
use crate::host::DialogueHost;
use crate::speech::SpeechCheckType;

/// What the condition walk learned about a topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    pub check_type: SpeechCheckType,
    pub passes_check: bool,
    pub required_speech_level: f32,
    pub predicted_response_text: String,
}

/// Walk the topic's response candidates in order to find its speech check and
/// predict which response the engine will pick.
///
/// Only the speech predicates themselves are evaluated. Evaluating a full
/// guard expression gives false negatives often enough that it is only used
/// as a last resort to decide whether a later candidate will be chosen.
///
/// `tag_type` is the type implied by the topic text; a tagged topic with no
/// detectable check still gets a predicted response.
pub fn resolve_check<H: DialogueHost>(
    topic: &Topic,
    tag_type: SpeechCheckType,
    host: &H,
) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let count = topic.responses.len();

    for (index, response) in topic.responses.iter().enumerate() {
        let is_last = index + 1 == count;

        if response.conditions.is_empty() || (outcome.check_type.is_some() && is_last) {
            // Either an unconditional response, or a check already failed and
            // this is the final fallback. The fallback's own conditions could
            // still fail, but evaluating them is unreliable and this is the
            // most likely pick.
            trace!(
                "Topic {:#010X}: response {:#010X} is the fallback",
                topic.id,
                response.id
            );
            outcome.predicted_response_text = predicted_text(response, host);
            return outcome;
        }

        if outcome.check_type.is_none() {
            if let Some(found) = find_speech_check(&response.conditions, host) {
                debug!(
                    "Topic {:#010X}: {} check in response {:#010X} (passes={}, level={})",
                    topic.id,
                    found.check_type,
                    response.id,
                    found.passes,
                    found.required_level
                );
                outcome.check_type = found.check_type;
                outcome.passes_check = found.passes;
                outcome.required_speech_level = found.required_level;
            }
        }

        let speech_related = outcome.check_type.is_some() || tag_type.is_some();
        if outcome.passes_check
            || (speech_related && (is_last || host.conditions_hold(&response.conditions)))
        {
            outcome.predicted_response_text = predicted_text(response, host);
            return outcome;
        }
    }

    outcome
}

struct FoundCheck {
    check_type: SpeechCheckType,
    passes: bool,
    required_level: f32,
}

/// Find and evaluate the first speech predicate in a condition list.
fn find_speech_check<H: DialogueHost>(
    conditions: &[ConditionItem],
    host: &H,
) -> Option<FoundCheck> {
    for (position, item) in conditions.iter().enumerate() {
        let found = match &item.function {
            ConditionFunction::GetActorValue(ActorValue::Speech)
                if item.op == OpCode::GreaterOrEqual =>
            {
                FoundCheck {
                    check_type: SpeechCheckType::Persuade,
                    passes: evaluate_speech_check(conditions, position, true, host),
                    required_level: comparison_value(&item.value, host),
                }
            }
            ConditionFunction::GetBribeSuccess => FoundCheck {
                check_type: SpeechCheckType::Bribe,
                passes: evaluate_speech_check(conditions, position, false, host),
                required_level: 0.0,
            },
            ConditionFunction::GetIntimidateSuccess => FoundCheck {
                check_type: SpeechCheckType::Intimidate,
                passes: evaluate_speech_check(conditions, position, false, host),
                required_level: 0.0,
            },
            _ => continue,
        };
        return Some(found);
    }
    None
}

/// Evaluate the speech predicate at `position`.
///
/// Persuasion checks in authored content are routinely OR-joined with an
/// equipped-item check for a speech-boosting item. With `check_equipped_bonus`
/// set, a failed predicate that is OR-joined to an immediately following
/// `GetEquipped` item takes that item's result instead.
pub fn evaluate_speech_check<H: DialogueHost>(
    conditions: &[ConditionItem],
    position: usize,
    check_equipped_bonus: bool,
    host: &H,
) -> bool {
    let Some(item) = conditions.get(position) else {
        return false;
    };
    if host.evaluate(item) {
        return true;
    }
    if !check_equipped_bonus || !item.or_next {
        return false;
    }
    match conditions.get(position + 1) {
        Some(next) if matches!(next.function, ConditionFunction::GetEquipped(_)) => {
            host.evaluate(next)
        }
        _ => false,
    }
}

fn comparison_value<H: DialogueHost>(value: &ComparisonValue, host: &H) -> f32 {
    match value {
        ComparisonValue::Literal(v) => *v,
        ComparisonValue::Global { global } => host.global_value(global).unwrap_or_else(|| {
            warn!("Global '{global}' could not be resolved, assuming 0");
            0.0
        }),
    }
}

fn predicted_text<H: DialogueHost>(response: &ResponseCandidate, host: &H) -> String {
    host.response_text(response).unwrap_or_else(|| {
        debug!(
            "No response text for {:#010X} (no live speaker or no responses)",
            response.id
        );
        String::new()
    })
}
