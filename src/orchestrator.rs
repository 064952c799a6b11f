//! Step Orchestrator
//!
//! Drives the guided flow: runs data steps inline, ai steps behind the
//! retry/abort wrapper, and fans ai-parallel steps out concurrently while
//! merging finished entries in plan order. Question steps pause the loop
//! until the user answers.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use webforge_llm::ErrorResponse;

use crate::merge::InsertionOrder;
use crate::request::{retry, send_step};
use crate::steps::{flow_entry, reduce, Advance, GenerationState, StepAction, StepId, StepKind};

/// Executes individual steps. Implemented on top of the chains; tests plug
/// in scripted runners.
#[async_trait]
pub trait StepRunner: Send + Sync {
    /// One model round trip for an `Ai` step.
    async fn run_step(&self, step: StepId, state: &GenerationState)
        -> Result<Value, ErrorResponse>;

    /// The prompts an `AiParallel` step fans out over.
    fn fanout(&self, step: StepId, state: &GenerationState) -> Vec<String>;

    /// One fan-out entry.
    async fn run_entry(
        &self,
        step: StepId,
        state: &GenerationState,
        index: usize,
        prompt: &str,
    ) -> Result<Value, ErrorResponse>;

    /// Local computation for a `Data` step.
    fn run_data(&self, step: StepId, state: &GenerationState) -> Result<Value, ErrorResponse>;
}

/// Consumes completed fan-out entries. `position` already accounts for
/// entries that finished earlier.
pub trait SectionMerger: Send + Sync {
    fn merge(&self, index: usize, position: usize, result: &Value) -> Result<(), ErrorResponse>;
}

pub struct Orchestrator {
    state: Mutex<GenerationState>,
    cancel: Mutex<CancellationToken>,
    retries: usize,
}

impl Orchestrator {
    pub fn new(retries: usize) -> Self {
        Self {
            state: Mutex::new(GenerationState::default()),
            cancel: Mutex::new(CancellationToken::new()),
            retries,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.lock_state().clone()
    }

    pub fn dispatch(&self, action: StepAction) {
        reduce(&mut self.lock_state(), action);
    }

    /// Answer the current question step and move on.
    pub fn answer(&self, step: StepId, data: Value) {
        self.dispatch(StepAction::Update { step, data });
        if let Some(next) = flow_entry(step).next {
            self.dispatch(StepAction::GoTo { step: next });
        }
    }

    /// Cancel all in-flight work. Safe to call repeatedly.
    pub fn abort(&self) {
        self.lock_cancel().cancel();
    }

    // A cancelled token is replaced so an aborted session can resume.
    fn fresh_token(&self) -> CancellationToken {
        let mut guard = self.lock_cancel();
        if guard.is_cancelled() {
            *guard = CancellationToken::new();
        }
        guard.clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, GenerationState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_cancel(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        match self.cancel.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run the flow from the current step until it finishes, fails, or
    /// reaches a question that needs the user.
    pub async fn run(
        &self,
        runner: &dyn StepRunner,
        merger: &dyn SectionMerger,
    ) -> Result<(), ErrorResponse> {
        let cancel = self.fresh_token();
        loop {
            let state = self.state();
            let entry = flow_entry(state.current);
            match entry.kind {
                StepKind::Question => return Ok(()),
                StepKind::Data => {
                    let result = runner.run_data(entry.id, &state).map_err(|error| {
                        self.dispatch(StepAction::Error {
                            step: entry.id,
                            error: error.clone(),
                        });
                        error
                    })?;
                    self.dispatch(StepAction::Update {
                        step: entry.id,
                        data: result,
                    });
                }
                StepKind::Ai => {
                    let result = send_step(
                        &cancel,
                        retry(self.retries, || runner.run_step(entry.id, &state)),
                    )
                    .await
                    .map_err(|error| {
                        self.dispatch(StepAction::Error {
                            step: entry.id,
                            error: error.clone(),
                        });
                        error
                    })?;
                    self.dispatch(StepAction::Update {
                        step: entry.id,
                        data: result,
                    });
                }
                StepKind::AiParallel => {
                    let data = self
                        .run_parallel(entry.id, &state, runner, merger, &cancel)
                        .await
                        .map_err(|error| {
                            self.dispatch(StepAction::Error {
                                step: entry.id,
                                error: error.clone(),
                            });
                            error
                        })?;
                    self.dispatch(StepAction::Update {
                        step: entry.id,
                        data,
                    });
                }
            }

            match entry.next {
                Some(next) => {
                    self.dispatch(StepAction::GoTo { step: next });
                    // A manual step completes and queues its successor, then
                    // waits for the user to continue via the next run().
                    if entry.advance == Advance::Manual {
                        return Ok(());
                    }
                }
                None => {
                    info!("generation flow finished");
                    return Ok(());
                }
            }
        }
    }

    /// Fan one step out over its prompts. Entries retry independently and
    /// merge in plan order as they complete; the step only fails when not a
    /// single entry made it.
    async fn run_parallel(
        &self,
        step: StepId,
        state: &GenerationState,
        runner: &dyn StepRunner,
        merger: &dyn SectionMerger,
        cancel: &CancellationToken,
    ) -> Result<Value, ErrorResponse> {
        let prompts = runner.fanout(step, state);
        if prompts.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        let mut entries: FuturesUnordered<_> = prompts
            .iter()
            .enumerate()
            .map(|(index, prompt)| {
                let cancel = cancel.clone();
                async move {
                    let result = send_step(
                        &cancel,
                        retry(self.retries, || {
                            runner.run_entry(step, state, index, prompt)
                        }),
                    )
                    .await;
                    (index, result)
                }
            })
            .collect();

        let mut order = InsertionOrder::new();
        let mut results: Vec<Value> = vec![Value::Null; prompts.len()];
        let mut merged = 0usize;
        let mut first_error: Option<ErrorResponse> = None;

        while let Some((index, result)) = entries.next().await {
            match result {
                Ok(value) => {
                    let position = order.index_for(index);
                    merger.merge(index, position, &value)?;
                    results[index] = value;
                    merged += 1;
                }
                Err(error) => {
                    warn!(step = ?step, index, error = %error, "fan-out entry failed");
                    first_error.get_or_insert(error);
                }
            }
        }

        if merged == 0 {
            // Every entry failed; the first failure speaks for the step
            return Err(first_error.unwrap_or_else(|| ErrorResponse::generic("no sections")));
        }
        Ok(Value::Array(results))
    }
}
