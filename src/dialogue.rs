pub mod condition;
pub mod topic;

pub use condition::{
    evaluate_conditions, ActorValue, ComparisonValue, ConditionFunction, ConditionItem, FormId,
    OpCode,
};
pub use topic::{DialogueLine, ResponseCandidate, Topic};
