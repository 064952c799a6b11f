//! Service pipeline tests: gated request handling, sequential stage
//! dispatch with the theme threaded through, and response envelopes.

use std::sync::Arc;

use webforge::service::{GenerateRequest, GenerateService, OpenPermit, StepResponse};
use webforge_core::EmbedTemplate;
use webforge_llm::ErrorKind;

use crate::support::{empty_build, service_config, theme_reply, FixedBuildApi, QueueProvider};

fn request(steps: &[&str]) -> GenerateRequest {
    GenerateRequest {
        prompt: "a landing page for a seaside bakery".to_string(),
        project_id: "project-1".to_string(),
        build_id: None,
        instance_id: "root".to_string(),
        steps: steps.iter().map(ToString::to_string).collect(),
        theme: None,
        color_mode: None,
    }
}

fn service(provider: QueueProvider) -> GenerateService {
    GenerateService::new(
        service_config(),
        Arc::new(provider),
        Arc::new(FixedBuildApi {
            build: empty_build(),
        }),
        Arc::new(OpenPermit),
    )
}

#[tokio::test]
async fn full_pipeline_threads_the_theme_into_the_ui_stage() {
    let sections_reply = r#"```json
{"type":"full-page","subject":"a seaside bakery","sections":["hero with the bakery name","gallery of pastries"]}
```"#;
    let ui_reply = "```jsx\n<Box variants={[\"sectionContainer\"]}><Heading variants={[\"hero\"]}>Fresh every morning</Heading><Image alt=\"600x400: croissants on a tray\" /></Box>\n```";

    let service = service(QueueProvider::replying(&[
        &theme_reply(),
        sections_reply,
        ui_reply,
    ]));
    let responses = service
        .generate(request(&["theme", "sections", "ui"]))
        .await
        .unwrap();
    assert_eq!(responses.len(), 3);

    let StepResponse::Success { json, .. } = &responses[0] else {
        panic!("theme stage failed");
    };
    assert_eq!(json[0]["backgroundColor"]["base"]["type"], "rgb");

    let StepResponse::Success { json, .. } = &responses[1] else {
        panic!("sections stage failed");
    };
    let prompts: Vec<String> = serde_json::from_value(json[0].clone()).unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("hero with the bakery name"));

    let StepResponse::Success { json, .. } = &responses[2] else {
        panic!("ui stage failed");
    };
    let template: EmbedTemplate = serde_json::from_value(json[0].clone()).unwrap();
    let webforge_core::TemplateChild::Instance(root) = &template[0] else {
        panic!("expected instance root");
    };
    // The theme produced in stage one styled the ui stage output
    assert!(root.styles.is_some());
    let webforge_core::TemplateChild::Instance(image) = &root.children[1] else {
        panic!("expected image");
    };
    let src = image.prop("src").unwrap().as_str().unwrap();
    assert!(src.starts_with("https://source.unsplash.com/random/"));
    assert!(src.ends_with("w=600&h=400"));
}

#[tokio::test]
async fn envelopes_serialize_for_the_wire() {
    let responses = service(QueueProvider::replying(&[&theme_reply()]))
        .generate(request(&["theme"]))
        .await
        .unwrap();
    let wire = serde_json::to_value(&responses).unwrap();
    assert_eq!(wire[0]["step"], "theme");
    assert_eq!(wire[0]["success"], true);

    let responses = service(QueueProvider::replying(&["```json\n{\"a\":1}\n```"]))
        .generate(request(&["theme"]))
        .await
        .unwrap();
    let wire = serde_json::to_value(&responses).unwrap();
    assert_eq!(wire[0]["success"], false);
    assert_eq!(wire[0]["type"], "parsing_error");
    assert_eq!(wire[0]["status"], 500);
}

#[tokio::test]
async fn disabled_feature_rejects_before_anything_runs() {
    let mut config = service_config();
    config.ai_enabled = false;
    let service = GenerateService::new(
        config,
        Arc::new(QueueProvider::replying(&[])),
        Arc::new(FixedBuildApi {
            build: empty_build(),
        }),
        Arc::new(OpenPermit),
    );
    let err = service.generate(request(&["theme"])).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::FeatureDisabled);
    assert_eq!(err.status, 503);
}

#[tokio::test]
async fn ui_without_a_theme_fails_cleanly() {
    let ui_reply = "```jsx\n<Box></Box>\n```";
    let service = service(QueueProvider::replying(&[ui_reply]));
    let responses = service.generate(request(&["ui"])).await.unwrap();
    match &responses[0] {
        StepResponse::Failure { error, .. } => {
            assert_eq!(error.kind, ErrorKind::ParsingError);
            assert_eq!(error.message, "Invalid theme");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
