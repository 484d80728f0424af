use std::fmt;

/// Alarm states the router distinguishes. Every other string the event bus
/// might carry folds into `Unknown`, which is ignorable, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Ok,
    Alarm,
    InsufficientData,
    Unknown,
}

impl AlarmState {
    pub fn parse(value: &str) -> Self {
        match value {
            "OK" => AlarmState::Ok,
            "ALARM" => AlarmState::Alarm,
            "INSUFFICIENT_DATA" => AlarmState::InsufficientData,
            _ => AlarmState::Unknown,
        }
    }
}

/// What a state transition asks of the notification sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Trigger,
    Resolve,
    Ignore,
}

impl TransitionAction {
    /// Wire value for the paging API, when this action pages at all.
    pub fn paging_action(&self) -> Option<&'static str> {
        match self {
            TransitionAction::Trigger => Some("trigger"),
            TransitionAction::Resolve => Some("resolve"),
            TransitionAction::Ignore => None,
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionAction::Trigger => "trigger",
            TransitionAction::Resolve => "resolve",
            TransitionAction::Ignore => "ignore",
        };
        write!(f, "{}", name)
    }
}

/// Classifies a raw state transition. Pure and total: any pair of state
/// strings yields an action.
pub fn classify(previous: &str, current: &str, suppressed: bool) -> TransitionAction {
    classify_states(AlarmState::parse(previous), AlarmState::parse(current), suppressed)
}

/// The transition table. Matches are exhaustive over named variants so a
/// future state addition fails to compile instead of silently mapping to
/// `Ignore`.
pub fn classify_states(
    previous: AlarmState,
    current: AlarmState,
    suppressed: bool,
) -> TransitionAction {
    if suppressed {
        return TransitionAction::Ignore;
    }
    match current {
        AlarmState::Alarm => TransitionAction::Trigger,
        AlarmState::Ok => match previous {
            AlarmState::Alarm => TransitionAction::Resolve,
            AlarmState::Ok | AlarmState::InsufficientData | AlarmState::Unknown => {
                TransitionAction::Ignore
            }
        },
        AlarmState::InsufficientData | AlarmState::Unknown => TransitionAction::Ignore,
    }
}
