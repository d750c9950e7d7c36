use serde::Deserialize;

/// Engine form identifier (topics, responses, items, perks).
pub type FormId = u32;

/// Actor values the condition walk cares about. Everything else is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ActorValue {
    Speech,
    Other(u32),
}

/// The predicate a condition item tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum ConditionFunction {
    GetActorValue(ActorValue),
    GetBribeSuccess,
    GetIntimidateSuccess,
    /// True when the subject has the given item (or an item from a form list)
    /// equipped.
    GetEquipped(FormId),
    /// Any other engine function, identified by its raw function code.
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OpCode {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl OpCode {
    pub fn compare(self, lhs: f32, rhs: f32) -> bool {
        match self {
            OpCode::Equal => lhs == rhs,
            OpCode::NotEqual => lhs != rhs,
            OpCode::Greater => lhs > rhs,
            OpCode::GreaterOrEqual => lhs >= rhs,
            OpCode::Less => lhs < rhs,
            OpCode::LessOrEqual => lhs <= rhs,
        }
    }
}

/// Right-hand side of a comparison: either a literal or a global variable
/// that the host resolves at evaluation time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ComparisonValue {
    Literal(f32),
    Global { global: String },
}

impl Default for ComparisonValue {
    fn default() -> Self {
        ComparisonValue::Literal(0.0)
    }
}

/// A single predicate node in a response's guard expression.
///
/// The engine stores these as a forward-only linked list; here the list is a
/// slice and "next" is simply the following element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionItem {
    pub function: ConditionFunction,
    pub op: OpCode,
    #[serde(default)]
    pub value: ComparisonValue,
    /// OR-joined with the following item.
    #[serde(default)]
    pub or_next: bool,
}

impl ConditionItem {
    pub fn new(function: ConditionFunction, op: OpCode, value: ComparisonValue) -> Self {
        Self {
            function,
            op,
            value,
            or_next: false,
        }
    }

    /// `Speech >= threshold`, the shape of every persuasion check.
    pub fn speech_at_least(threshold: f32) -> Self {
        Self::new(
            ConditionFunction::GetActorValue(ActorValue::Speech),
            OpCode::GreaterOrEqual,
            ComparisonValue::Literal(threshold),
        )
    }

    /// `GetEquipped(item) == 1`
    pub fn equipped(item: FormId) -> Self {
        Self::new(
            ConditionFunction::GetEquipped(item),
            OpCode::Equal,
            ComparisonValue::Literal(1.0),
        )
    }

    /// `<function> == 1`, used for the bribe/intimidate success predicates.
    pub fn is_true(function: ConditionFunction) -> Self {
        Self::new(function, OpCode::Equal, ComparisonValue::Literal(1.0))
    }

    /// Compare against a global variable instead of a literal.
    pub fn with_global(mut self, name: impl Into<String>) -> Self {
        self.value = ComparisonValue::Global {
            global: name.into(),
        };
        self
    }

    pub fn or(mut self) -> Self {
        self.or_next = true;
        self
    }
}

/// Evaluate a full condition list with engine semantics: a run of items
/// flagged `or_next` forms one OR group together with the item that closes
/// it, and groups are AND-ed. An empty list is true.
pub fn evaluate_conditions<F>(conditions: &[ConditionItem], mut eval: F) -> bool
where
    F: FnMut(&ConditionItem) -> bool,
{
    let mut group_true = false;
    for item in conditions {
        // Once a group is satisfied the remaining OR members are skipped.
        if !group_true {
            group_true = eval(item);
        }
        if !item.or_next {
            if !group_true {
                return false;
            }
            group_true = false;
        }
    }
    // A trailing OR flag on the last item closes the group anyway.
    match conditions.last() {
        Some(last) if last.or_next => group_true,
        _ => true,
    }
}
