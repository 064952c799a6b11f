//! Guided-flow tests: the orchestrator driving question, data, ai and
//! ai-parallel steps against a real document store, including aborts.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use webforge::jsx;
use webforge::merge::merge_section;
use webforge::orchestrator::{Orchestrator, SectionMerger, StepRunner};
use webforge::store::{DocumentStore, InstanceChild};
use webforge::{GenerationState, StepId};
use webforge_core::EmbedTemplate;
use webforge_llm::{ErrorKind, ErrorResponse};

use crate::support::metas;

/// Produces one template per planned section, each after its own delay.
struct SectionRunner {
    sections: Vec<&'static str>,
    delays: Vec<u64>,
}

#[async_trait]
impl StepRunner for SectionRunner {
    async fn run_step(
        &self,
        step: StepId,
        state: &GenerationState,
    ) -> Result<Value, ErrorResponse> {
        match step {
            StepId::Sections => Ok(json!(self.sections)),
            _ => Ok(json!({ "request": state.result_str(StepId::Description) })),
        }
    }

    fn fanout(&self, _step: StepId, state: &GenerationState) -> Vec<String> {
        state
            .result(StepId::Sections)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    async fn run_entry(
        &self,
        _step: StepId,
        _state: &GenerationState,
        index: usize,
        prompt: &str,
    ) -> Result<Value, ErrorResponse> {
        tokio::time::sleep(Duration::from_millis(self.delays[index])).await;
        let template = jsx::parse(&format!("<Box><Heading>{prompt}</Heading></Box>"))
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;
        serde_json::to_value(template).map_err(|err| ErrorResponse::parsing_error(err.to_string()))
    }

    fn run_data(&self, _step: StepId, _state: &GenerationState) -> Result<Value, ErrorResponse> {
        Ok(json!({}))
    }
}

/// Merges completed sections into the store at their plan position.
struct StoreMerger {
    store: DocumentStore,
    root: String,
    merged: Mutex<Vec<usize>>,
}

impl StoreMerger {
    fn new() -> Self {
        let store = DocumentStore::new("Body", metas());
        let root = store.root_instance_id();
        Self {
            store,
            root,
            merged: Mutex::new(Vec::new()),
        }
    }

    fn children(&self) -> Vec<String> {
        let data = self.store.snapshot();
        data.instances[&self.root]
            .children
            .iter()
            .map(|child| match child {
                InstanceChild::Id { value } => value.clone(),
                other => panic!("expected instance child, got {other:?}"),
            })
            .collect()
    }

    fn heading_text(&self, instance_id: &str) -> String {
        let data = self.store.snapshot();
        let section = &data.instances[instance_id];
        let InstanceChild::Id { value } = &section.children[0] else {
            panic!("expected heading child");
        };
        match &data.instances[value].children[0] {
            InstanceChild::Text { value } => value.clone(),
            other => panic!("expected text, got {other:?}"),
        }
    }
}

impl SectionMerger for StoreMerger {
    fn merge(&self, index: usize, position: usize, result: &Value) -> Result<(), ErrorResponse> {
        let template: EmbedTemplate = serde_json::from_value(result.clone())
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;
        merge_section(&self.store, &self.root, &template, &[], position)
            .map_err(|err| ErrorResponse::generic(err.to_string()))?;
        self.merged.lock().unwrap().push(index);
        Ok(())
    }
}

fn answer_questions(orchestrator: &Orchestrator) {
    orchestrator.answer(StepId::Description, json!("a seaside bakery"));
    orchestrator.answer(StepId::Style, json!("warm, rustic"));
}

#[tokio::test(start_paused = true)]
async fn guided_flow_builds_the_page_in_plan_order() {
    let orchestrator = Orchestrator::new(1);
    // The middle section finishes last, the final section first
    let runner = SectionRunner {
        sections: vec!["hero", "menu", "contact"],
        delays: vec![20, 40, 10],
    };
    let merger = StoreMerger::new();

    // The flow waits for each question before doing any work
    orchestrator.run(&runner, &merger).await.unwrap();
    assert_eq!(orchestrator.state().current, StepId::Description);
    assert!(merger.children().is_empty());

    // After the questions the flow runs up to the components checkpoint
    answer_questions(&orchestrator);
    orchestrator.run(&runner, &merger).await.unwrap();
    assert_eq!(orchestrator.state().current, StepId::Sections);
    assert!(merger.children().is_empty());

    // Continuing runs sections and the parallel ui fan-out to the end
    orchestrator.run(&runner, &merger).await.unwrap();

    // Merge order followed completion, document order follows the plan
    assert_eq!(*merger.merged.lock().unwrap(), vec![2, 0, 1]);
    let children = merger.children();
    assert_eq!(children.len(), 3);
    let texts: Vec<String> = children
        .iter()
        .map(|id| merger.heading_text(id))
        .collect();
    assert_eq!(texts, vec!["hero", "menu", "contact"]);

    let state = orchestrator.state();
    assert!(state.errors.is_empty());
    assert!(state.result(StepId::Ui).is_some());
}

#[tokio::test(start_paused = true)]
async fn aborting_mid_flow_leaves_the_document_untouched() {
    struct AbortingRunner<'a> {
        inner: SectionRunner,
        orchestrator: &'a Orchestrator,
    }

    #[async_trait]
    impl StepRunner for AbortingRunner<'_> {
        async fn run_step(
            &self,
            step: StepId,
            state: &GenerationState,
        ) -> Result<Value, ErrorResponse> {
            self.inner.run_step(step, state).await
        }

        fn fanout(&self, step: StepId, state: &GenerationState) -> Vec<String> {
            self.inner.fanout(step, state)
        }

        async fn run_entry(
            &self,
            _step: StepId,
            _state: &GenerationState,
            _index: usize,
            _prompt: &str,
        ) -> Result<Value, ErrorResponse> {
            self.orchestrator.abort();
            std::future::pending().await
        }

        fn run_data(
            &self,
            step: StepId,
            state: &GenerationState,
        ) -> Result<Value, ErrorResponse> {
            self.inner.run_data(step, state)
        }
    }

    let orchestrator = Orchestrator::new(1);
    let merger = StoreMerger::new();
    answer_questions(&orchestrator);

    let runner = AbortingRunner {
        inner: SectionRunner {
            sections: vec!["hero"],
            delays: vec![0],
        },
        orchestrator: &orchestrator,
    };
    // First run stops at the components checkpoint, the continuation
    // reaches the ui fan-out and gets aborted there
    orchestrator.run(&runner, &merger).await.unwrap();
    let err = orchestrator.run(&runner, &merger).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Aborted);
    assert!(merger.children().is_empty());

    // The session resumes with a fresh token and finishes the page
    let runner = SectionRunner {
        sections: vec!["hero"],
        delays: vec![0],
    };
    orchestrator.run(&runner, &merger).await.unwrap();
    assert_eq!(merger.children().len(), 1);
}
