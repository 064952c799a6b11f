//! Document merging tests: generated fragments landing in a real store,
//! plan-ordered insertion for sections finishing out of order, and token
//! override creation from the customize stage.

use std::sync::Arc;

use webforge::chains::{customize::CustomizeChain, ui::resolve_styles, Chain, ChainContext};
use webforge::components::ColorMode;
use webforge::jsx;
use webforge::merge::{add_tokens_to_instances, create_tokens, merge_section, InsertionOrder};
use webforge::store::{DocumentStore, InstanceChild, StyleSource};
use webforge_core::{RawTheme, Theme, Token, OVERRIDE_PREFIX};

use crate::support::{empty_build, metas, raw_theme_json, FixedBuildApi, ScriptedModel};

fn theme() -> Theme {
    let raw: RawTheme = serde_json::from_str(&raw_theme_json()).unwrap();
    Theme::from_raw(&raw).unwrap()
}

#[test]
fn parsed_fragment_merges_with_local_styles() {
    let mut template = jsx::parse(
        r#"<Box variants={["card"]}><Heading>Our story</Heading><Text>Since 1982</Text></Box>"#,
    )
    .unwrap();
    resolve_styles(&mut template, &theme(), ColorMode::Light);

    let store = DocumentStore::new("Body", metas());
    let root = store.root_instance_id();
    let created = merge_section(&store, &root, &template, &[], 0).unwrap();
    assert_eq!(created.len(), 1);

    let data = store.snapshot();
    // Box, Heading and Text all carry base styles, one local source each
    assert_eq!(data.instances.len(), 4);
    assert_eq!(data.style_sources.len(), 3);
    assert!(data
        .styles
        .values()
        .any(|stored| stored.decl.property == "boxShadow"));
    // The session instance stays selected after the merge
    assert_eq!(store.selected_instance_path(), vec![root]);
}

#[test]
fn sections_arriving_out_of_order_land_in_plan_order() {
    let store = DocumentStore::new("Body", metas());
    let root = store.root_instance_id();
    let mut order = InsertionOrder::new();

    let sections: Vec<_> = ["hero", "menu", "contact"]
        .iter()
        .map(|label| jsx::parse(&format!("<Box><Heading>{label}</Heading></Box>")).unwrap())
        .collect();

    // Completion order 1, 2, 0; each merge must leave the selection alone
    // so its siblings still pass the stale-selection guard
    let mut created = vec![String::new(); 3];
    for index in [1usize, 2, 0] {
        let position = order.index_for(index);
        let ids = merge_section(&store, &root, &sections[index], &[], position).unwrap();
        created[index] = ids[0].clone();
    }

    let data = store.snapshot();
    let children: Vec<&str> = data.instances[&root]
        .children
        .iter()
        .map(|child| match child {
            InstanceChild::Id { value } => value.as_str(),
            other => panic!("expected instance child, got {other:?}"),
        })
        .collect();
    assert_eq!(
        children,
        vec![created[0].as_str(), created[1].as_str(), created[2].as_str()]
    );
}

#[tokio::test]
async fn customize_overrides_reach_the_document() {
    let mut build = empty_build();
    build.style_sources = vec![StyleSource::Token {
        id: "token-button".to_string(),
        name: "Button".to_string(),
    }];
    let api = Arc::new(FixedBuildApi { build });

    let model = ScriptedModel::replying(
        r#"```json
{"Button":["backgroundColor:backgroundColor.accent","borderRadius:borderRadius.full"]}
```"#,
    );
    let mut context = ChainContext::new(api, "project-1")
        .with_prompt("request", "make buttons pill shaped and vivid")
        .with_prompt("theme", raw_theme_json());

    let success = CustomizeChain.run(&model, &mut context).await.unwrap();
    let tokens: Vec<Token> = serde_json::from_value(success.json[0].clone()).unwrap();
    assert_eq!(tokens[0].id, format!("{OVERRIDE_PREFIX}token-button"));

    // Apply the overrides to a store that has a styled button
    let store = DocumentStore::new("Body", metas());
    let root = store.root_instance_id();
    let template = jsx::parse("<Box></Box>").unwrap();
    let created = merge_section(&store, &root, &template, &[], 0).unwrap();

    store
        .create_transaction(|data| {
            create_tokens(data, &tokens);
            let token_ids: Vec<String> = tokens.iter().map(|t| t.id.clone()).collect();
            add_tokens_to_instances(data, &created, &token_ids);
            Ok(())
        })
        .unwrap();

    let data = store.snapshot();
    assert!(data
        .style_sources
        .contains_key(&format!("{OVERRIDE_PREFIX}token-button")));
    let selection = &data.style_source_selections[&created[0]];
    assert_eq!(
        selection.values[0],
        format!("{OVERRIDE_PREFIX}token-button")
    );
    // The override carries both resolved declarations
    let decls: Vec<_> = data
        .styles
        .values()
        .filter(|stored| stored.style_source_id.starts_with(OVERRIDE_PREFIX))
        .collect();
    assert_eq!(decls.len(), 2);
}
