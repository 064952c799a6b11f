//! Generation Steps
//!
//! The guided generation flow as a small state machine: an ordered table of
//! steps, the per-session state, and a reducer over step actions. The
//! orchestrator drives this machine; chains do the actual work.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use webforge_llm::ErrorResponse;

/// Every step of the guided flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Ask what the user wants to build
    Description,
    /// Derive extra context from the current document
    ContextSections,
    /// Ask for the visual direction
    Style,
    /// Generate the theme
    Theme,
    /// Collect the component palette for the prompts
    Components,
    /// Split the request into page sections
    Sections,
    /// Generate every section in parallel
    Ui,
}

impl StepId {
    pub const ALL: [StepId; 7] = [
        StepId::Description,
        StepId::ContextSections,
        StepId::Style,
        StepId::Theme,
        StepId::Components,
        StepId::Sections,
        StepId::Ui,
    ];

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|step| *step == self)
            .unwrap_or(usize::MAX)
    }
}

/// What a step does when it becomes current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Waits for user input
    Question,
    /// One model round trip
    Ai,
    /// Fans one request out over many prompts
    AiParallel,
    /// Local computation, no model and no user
    Data,
}

/// Whether the flow moves on by itself once the step completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Auto,
    Manual,
}

/// One row of the flow table
#[derive(Debug, Clone, Copy)]
pub struct StepFlow {
    pub id: StepId,
    pub kind: StepKind,
    pub advance: Advance,
    pub next: Option<StepId>,
}

/// The guided flow, first step to last.
pub const FLOW: [StepFlow; 7] = [
    StepFlow {
        id: StepId::Description,
        kind: StepKind::Question,
        advance: Advance::Manual,
        next: Some(StepId::ContextSections),
    },
    StepFlow {
        id: StepId::ContextSections,
        kind: StepKind::Data,
        advance: Advance::Auto,
        next: Some(StepId::Style),
    },
    StepFlow {
        id: StepId::Style,
        kind: StepKind::Question,
        advance: Advance::Manual,
        next: Some(StepId::Theme),
    },
    StepFlow {
        id: StepId::Theme,
        kind: StepKind::Ai,
        advance: Advance::Auto,
        next: Some(StepId::Components),
    },
    StepFlow {
        id: StepId::Components,
        kind: StepKind::Data,
        advance: Advance::Manual,
        next: Some(StepId::Sections),
    },
    StepFlow {
        id: StepId::Sections,
        kind: StepKind::Ai,
        advance: Advance::Auto,
        next: Some(StepId::Ui),
    },
    StepFlow {
        id: StepId::Ui,
        kind: StepKind::AiParallel,
        advance: Advance::Auto,
        next: None,
    },
];

/// Look up a step's flow entry.
pub fn flow_entry(id: StepId) -> &'static StepFlow {
    &FLOW[id.index()]
}

/// Per-session state of the guided flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationState {
    pub current: StepId,
    /// Completed step results, keyed by step
    pub data: HashMap<StepId, Value>,
    /// Failures that have not been cleared yet
    pub errors: HashMap<StepId, ErrorResponse>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            current: StepId::Description,
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }
}

impl GenerationState {
    pub fn result(&self, step: StepId) -> Option<&Value> {
        self.data.get(&step)
    }

    pub fn result_str(&self, step: StepId) -> Option<&str> {
        self.result(step).and_then(Value::as_str)
    }
}

/// Everything that can happen to the flow state
#[derive(Debug, Clone)]
pub enum StepAction {
    GoTo { step: StepId },
    Update { step: StepId, data: Value },
    Error { step: StepId, error: ErrorResponse },
}

/// Apply one action. The session carries at most one live failure, so any
/// transition or stored result clears the error map; results of later steps
/// stay untouched so the user can move back and forth without losing work.
pub fn reduce(state: &mut GenerationState, action: StepAction) {
    match action {
        StepAction::GoTo { step } => {
            state.current = step;
            state.errors.clear();
        }
        StepAction::Update { step, data } => {
            state.data.insert(step, data);
            state.errors.clear();
        }
        StepAction::Error { step, error } => {
            state.errors.insert(step, error);
        }
    }
}
