use crate::CoreError;
use hireflow_schema::{HiringEvent, HiringState};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Initial,
    Intermediate,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub source: HiringState,
    pub event: HiringEvent,
    pub target: HiringState,
}

impl Rule {
    pub const fn new(source: HiringState, event: HiringEvent, target: HiringState) -> Self {
        Self {
            source,
            event,
            target,
        }
    }
}

/// Static description of a workflow topology, validated by
/// [`TransitionTable::from_declaration`].
#[derive(Debug, Clone, Copy)]
pub struct WorkflowDeclaration<'a> {
    pub states: &'a [(HiringState, StateKind)],
    pub rules: &'a [Rule],
}

/// The hiring topology: ADDED -> IN_CHECK -> APPROVED | REJECTED.
pub const HIRING_WORKFLOW: WorkflowDeclaration<'static> = WorkflowDeclaration {
    states: &[
        (HiringState::Added, StateKind::Initial),
        (HiringState::InCheck, StateKind::Intermediate),
        (HiringState::Approved, StateKind::Terminal),
        (HiringState::Rejected, StateKind::Terminal),
    ],
    rules: &[
        Rule::new(
            HiringState::Added,
            HiringEvent::StartCheck,
            HiringState::InCheck,
        ),
        Rule::new(
            HiringState::InCheck,
            HiringEvent::Approve,
            HiringState::Approved,
        ),
        Rule::new(
            HiringState::InCheck,
            HiringEvent::Reject,
            HiringState::Rejected,
        ),
    ],
};

/// Validated `(source, event) -> target` mapping. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    initial: HiringState,
    terminal: BTreeSet<HiringState>,
    rules: BTreeMap<(HiringState, HiringEvent), HiringState>,
}

impl TransitionTable {
    /// Build the table for [`HIRING_WORKFLOW`].
    pub fn hiring() -> Result<Self, CoreError> {
        Self::from_declaration(&HIRING_WORKFLOW)
    }

    pub fn from_declaration(decl: &WorkflowDeclaration<'_>) -> Result<Self, CoreError> {
        let mut kinds: BTreeMap<HiringState, StateKind> = BTreeMap::new();
        for &(state, kind) in decl.states {
            if kinds.insert(state, kind).is_some() {
                return Err(CoreError::Configuration(format!(
                    "state {state} is declared more than once"
                )));
            }
        }

        let initials: Vec<HiringState> = kinds
            .iter()
            .filter(|(_, kind)| **kind == StateKind::Initial)
            .map(|(state, _)| *state)
            .collect();
        let initial = match initials.as_slice() {
            [single] => *single,
            [] => {
                return Err(CoreError::Configuration(
                    "no initial state declared".to_owned(),
                ))
            }
            many => {
                let names: Vec<String> = many.iter().map(ToString::to_string).collect();
                return Err(CoreError::Configuration(format!(
                    "exactly one initial state allowed, found {}",
                    names.join(", ")
                )));
            }
        };

        let terminal: BTreeSet<HiringState> = kinds
            .iter()
            .filter(|(_, kind)| **kind == StateKind::Terminal)
            .map(|(state, _)| *state)
            .collect();

        let mut rules = BTreeMap::new();
        for rule in decl.rules {
            for state in [rule.source, rule.target] {
                if !kinds.contains_key(&state) {
                    return Err(CoreError::Configuration(format!(
                        "rule ({}, {}) -> {} references undeclared state {state}",
                        rule.source, rule.event, rule.target
                    )));
                }
            }
            if terminal.contains(&rule.source) {
                return Err(CoreError::Configuration(format!(
                    "terminal state {} has an outgoing rule on '{}'",
                    rule.source, rule.event
                )));
            }
            if let Some(existing) = rules.insert((rule.source, rule.event), rule.target) {
                return Err(CoreError::Configuration(format!(
                    "({}, {}) has two targets: {existing} and {}",
                    rule.source, rule.event, rule.target
                )));
            }
        }

        Ok(Self {
            initial,
            terminal,
            rules,
        })
    }

    /// Target state for `event` in `source`, if the table allows it.
    pub fn allowed(&self, source: HiringState, event: HiringEvent) -> Option<HiringState> {
        self.rules.get(&(source, event)).copied()
    }

    pub fn initial(&self) -> HiringState {
        self.initial
    }

    pub fn is_terminal(&self, state: HiringState) -> bool {
        self.terminal.contains(&state)
    }

    /// Events accepted in `state`, ordered by event.
    pub fn events_from(&self, state: HiringState) -> Vec<HiringEvent> {
        self.rules
            .keys()
            .filter(|(source, _)| *source == state)
            .map(|(_, event)| *event)
            .collect()
    }

    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.rules
            .iter()
            .map(|(&(source, event), &target)| Rule::new(source, event, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireflow_schema::HiringEvent::{Approve, Reject, StartCheck};
    use hireflow_schema::HiringState::{Added, Approved, InCheck, Rejected};

    fn table() -> TransitionTable {
        TransitionTable::hiring().unwrap()
    }

    fn assert_config_error(decl: &WorkflowDeclaration<'_>, needle: &str) {
        match TransitionTable::from_declaration(decl) {
            Err(CoreError::Configuration(msg)) => {
                assert!(msg.contains(needle), "'{msg}' should mention '{needle}'");
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn valid_transitions() {
        let t = table();
        assert_eq!(t.allowed(Added, StartCheck), Some(InCheck));
        assert_eq!(t.allowed(InCheck, Approve), Some(Approved));
        assert_eq!(t.allowed(InCheck, Reject), Some(Rejected));
    }

    #[test]
    fn invalid_transitions() {
        let t = table();
        assert_eq!(t.allowed(Added, Approve), None);
        assert_eq!(t.allowed(Added, Reject), None);
        assert_eq!(t.allowed(InCheck, StartCheck), None);
        for event in HiringEvent::ALL {
            assert_eq!(t.allowed(Approved, event), None);
            assert_eq!(t.allowed(Rejected, event), None);
        }
    }

    #[test]
    fn initial_and_terminal_states() {
        let t = table();
        assert_eq!(t.initial(), Added);
        assert!(t.is_terminal(Approved));
        assert!(t.is_terminal(Rejected));
        assert!(!t.is_terminal(Added));
        assert!(!t.is_terminal(InCheck));
    }

    #[test]
    fn events_from_lists_outgoing_rules() {
        let t = table();
        assert_eq!(t.events_from(Added), vec![StartCheck]);
        assert_eq!(t.events_from(InCheck), vec![Approve, Reject]);
        assert!(t.events_from(Approved).is_empty());
    }

    #[test]
    fn rules_enumerates_the_topology() {
        assert_eq!(table().rules().count(), 3);
    }

    #[test]
    fn duplicate_target_for_same_pair_is_rejected() {
        let decl = WorkflowDeclaration {
            states: HIRING_WORKFLOW.states,
            rules: &[
                Rule::new(Added, StartCheck, InCheck),
                Rule::new(InCheck, Approve, Approved),
                Rule::new(InCheck, Approve, Rejected),
            ],
        };
        assert_config_error(&decl, "two targets");
    }

    #[test]
    fn missing_initial_state_is_rejected() {
        let decl = WorkflowDeclaration {
            states: &[
                (Added, StateKind::Intermediate),
                (InCheck, StateKind::Intermediate),
                (Approved, StateKind::Terminal),
                (Rejected, StateKind::Terminal),
            ],
            rules: HIRING_WORKFLOW.rules,
        };
        assert_config_error(&decl, "no initial state");
    }

    #[test]
    fn two_initial_states_are_rejected() {
        let decl = WorkflowDeclaration {
            states: &[
                (Added, StateKind::Initial),
                (InCheck, StateKind::Initial),
                (Approved, StateKind::Terminal),
                (Rejected, StateKind::Terminal),
            ],
            rules: HIRING_WORKFLOW.rules,
        };
        assert_config_error(&decl, "exactly one initial state");
    }

    #[test]
    fn undeclared_state_is_rejected() {
        let decl = WorkflowDeclaration {
            states: &[
                (Added, StateKind::Initial),
                (InCheck, StateKind::Intermediate),
                (Approved, StateKind::Terminal),
            ],
            rules: HIRING_WORKFLOW.rules,
        };
        assert_config_error(&decl, "undeclared state REJECTED");
    }

    #[test]
    fn terminal_state_with_outgoing_rule_is_rejected() {
        let decl = WorkflowDeclaration {
            states: HIRING_WORKFLOW.states,
            rules: &[
                Rule::new(Added, StartCheck, InCheck),
                Rule::new(Approved, Reject, Rejected),
            ],
        };
        assert_config_error(&decl, "terminal state APPROVED");
    }

    #[test]
    fn state_declared_twice_is_rejected() {
        let decl = WorkflowDeclaration {
            states: &[
                (Added, StateKind::Initial),
                (Added, StateKind::Intermediate),
            ],
            rules: &[],
        };
        assert_config_error(&decl, "more than once");
    }
}
