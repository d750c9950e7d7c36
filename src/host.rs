use crate::dialogue::{evaluate_conditions, ConditionItem, FormId, ResponseCandidate};

/// Everything the prediction engine needs from the running game.
///
/// Implementations wrap the engine's current dialogue state: the speaker the
/// player is talking to and the player character. All calls happen on the UI
/// thread during a single refresh.
pub trait DialogueHost {
    /// The player's current Speech skill.
    fn player_speech(&self) -> f32;

    /// Evaluate one condition item with the speaker as subject and the player
    /// as target.
    fn evaluate(&self, item: &ConditionItem) -> bool;

    /// Evaluate a whole guard expression the way the engine does.
    fn conditions_hold(&self, conditions: &[ConditionItem]) -> bool {
        evaluate_conditions(conditions, |item| self.evaluate(item))
    }

    /// Current value of a global variable, `None` if it does not exist.
    fn global_value(&self, name: &str) -> Option<f32>;

    /// First response line the current speaker would say for this candidate.
    /// `None` when there is no live speaker or the candidate has no responses.
    fn response_text(&self, response: &ResponseCandidate) -> Option<String>;

    /// Whether the player has the given perk, `None` if the form is unknown or
    /// not a perk.
    fn has_perk(&self, perk: FormId) -> Option<bool>;
}
