use std::sync::Arc;
use std::time::{Duration, Instant};

use clean_my_web::{
    agent::{
        application::ApplicationPass,
        command::{Command, Response},
        page_agent::PageAgent,
    },
    dom::document::ReadyState,
    locator::{
        descriptor::ElementDescriptor,
        markers::{INDICATOR_CLASS, STYLE_ELEMENT_ID},
        resolve::Tier,
        visibility::is_hidden,
    },
    session::event::DomEvent,
    trace::logger::TraceLogger,
};

mod common;
use crate::common::utils::{HOST, NEWS_PAGE, agent_on, all, memory_sites, one, page};

/// Select `selector` through the UI flow and return the committed descriptor.
fn select(agent: &mut PageAgent, selector: &str, index: usize) -> ElementDescriptor {
    if !agent.is_selecting() {
        agent.handle(Command::ToggleSelectionMode);
    }
    let target = all(agent.document(), selector)[index];
    agent.dispatch(DomEvent::PointerMove { target, x: 0, y: 0 });
    agent
        .dispatch(DomEvent::Click { target })
        .committed
        .expect("selection commits")
}

// =========================================================================
// End-to-end scenarios
// =========================================================================

#[test]
fn cookie_banner_stays_hidden_on_the_next_visit() {
    let sites = memory_sites();
    let mut first_visit = agent_on(NEWS_PAGE, &sites);
    let descriptor = select(&mut first_visit, "#cookie-banner", 0);
    first_visit.handle(Command::ToggleSelectionMode);

    let stored = sites.load(HOST).unwrap();
    assert_eq!(stored, vec![descriptor]);
    assert_eq!(stored[0].xpath.as_deref(), Some(r#"//*[@id="cookie-banner"]"#));

    let next_visit = agent_on(NEWS_PAGE, &sites);
    let doc = next_visit.document();
    assert!(is_hidden(doc, one(doc, "#cookie-banner")));

    let report = next_visit.last_report().unwrap();
    assert_eq!(report.hidden_count(), 1);
    assert_eq!(report.applied[0].tier, Some(Tier::Path));
}

#[test]
fn second_promo_only_is_hidden_on_reload() {
    let sites = memory_sites();
    let mut first_visit = agent_on(NEWS_PAGE, &sites);
    select(&mut first_visit, "div.promo", 1);

    let next_visit = agent_on(NEWS_PAGE, &sites);
    let doc = next_visit.document();
    let promos = all(doc, "div.promo");
    assert!(!is_hidden(doc, promos[0]));
    assert!(is_hidden(doc, promos[1]));
    assert_eq!(next_visit.last_report().unwrap().hidden_count(), 1);
}

#[test]
fn reload_command_restores_the_page_then_reapplies() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    select(&mut agent, "nav", 0);
    assert!(agent.is_selecting());

    assert_eq!(agent.handle(Command::ReloadPage), Response::ok());

    let doc = agent.document();
    assert!(!agent.is_selecting());
    assert!(all(doc, &format!(".{}", INDICATOR_CLASS)).is_empty());
    assert!(is_hidden(doc, one(doc, "nav")));
    assert_eq!(doc.ready_state(), ReadyState::Complete);
}

// =========================================================================
// Application pass
// =========================================================================

#[test]
fn disabled_site_is_left_alone() {
    let sites = memory_sites();
    sites
        .save(HOST, &[ElementDescriptor::legacy("div", None, &["promo"])])
        .unwrap();
    sites.set_disabled(HOST, true).unwrap();

    let agent = agent_on(NEWS_PAGE, &sites);

    let report = agent.last_report().unwrap();
    assert!(report.disabled);
    assert!(report.applied.is_empty());
    for promo in all(agent.document(), "div.promo") {
        assert!(!is_hidden(agent.document(), promo));
    }
}

#[test]
fn re_enabled_site_is_applied_again() {
    let sites = memory_sites();
    sites
        .save(HOST, &[ElementDescriptor::legacy("div", None, &["promo"])])
        .unwrap();
    sites.set_disabled(HOST, true).unwrap();
    sites.set_disabled(HOST, false).unwrap();

    let agent = agent_on(NEWS_PAGE, &sites);

    assert_eq!(agent.last_report().unwrap().hidden_count(), 2);
}

#[test]
fn reset_all_leaves_nothing_to_apply() {
    let sites = memory_sites();
    let mut first_visit = agent_on(NEWS_PAGE, &sites);
    select(&mut first_visit, "nav", 0);
    sites
        .save("other.org", &[ElementDescriptor::legacy("div", None, &["ad"])])
        .unwrap();
    sites.set_disabled("other.org", true).unwrap();

    sites.reset_all().unwrap();

    assert!(sites.raw().entries().unwrap().is_empty());
    let next_visit = agent_on(NEWS_PAGE, &sites);
    let report = next_visit.last_report().unwrap();
    assert!(!report.disabled);
    assert!(report.applied.is_empty());
    assert!(!is_hidden(next_visit.document(), one(next_visit.document(), "nav")));
}

#[test]
fn loading_document_defers_the_pass_until_content_loaded() {
    let sites = memory_sites();
    sites
        .save(HOST, &[ElementDescriptor::legacy("nav", None, &["menu"])])
        .unwrap();
    let mut doc = page(NEWS_PAGE);
    doc.set_ready_state(ReadyState::Loading);

    let mut agent = PageAgent::new(HOST, doc, sites.clone()).with_settle_delay(Duration::ZERO);
    assert!(agent.start().is_none());
    let nav = one(agent.document(), "nav");
    assert!(!is_hidden(agent.document(), nav));

    agent.dispatch(DomEvent::ContentLoaded);

    assert!(is_hidden(agent.document(), nav));
    assert_eq!(agent.document().ready_state(), ReadyState::Complete);
    assert_eq!(agent.last_report().unwrap().hidden_count(), 1);
}

#[test]
fn one_miss_does_not_stop_the_others() {
    let sites = memory_sites();
    let mut gone = ElementDescriptor::legacy("aside", Some("removed"), &[]);
    gone.xpath = Some("/html/body/aside[1]".into());
    sites
        .save(
            HOST,
            &[
                gone,
                ElementDescriptor::legacy("div", Some("123"), &[]),
                ElementDescriptor::legacy("section", None, &["sidebar"]),
            ],
        )
        .unwrap();

    let agent = agent_on(NEWS_PAGE, &sites);

    let report = agent.last_report().unwrap();
    assert_eq!(report.applied.len(), 3);
    assert_eq!(report.misses().count(), 2);
    assert_eq!(report.applied[2].tier, Some(Tier::Legacy));
    assert!(is_hidden(agent.document(), one(agent.document(), "section")));
}

#[test]
fn pass_injects_styles_even_with_nothing_stored() {
    let sites = memory_sites();
    let agent = agent_on(NEWS_PAGE, &sites);

    assert!(agent.document().find_by_id(STYLE_ELEMENT_ID).is_some());
    assert!(agent.last_report().unwrap().applied.is_empty());
}

#[test]
fn settling_delay_is_waited_before_resolving() {
    let sites = memory_sites();
    sites
        .save(HOST, &[ElementDescriptor::legacy("nav", None, &["menu"])])
        .unwrap();
    let mut doc = page(NEWS_PAGE);
    let pass = ApplicationPass::new(Duration::from_millis(30));

    let started = Instant::now();
    let report = pass
        .run(&mut doc, &sites, HOST, &TraceLogger::disabled())
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(report.hidden_count(), 1);
}

// =========================================================================
// Hide / show commands
// =========================================================================

#[test]
fn hide_and_show_commands_toggle_the_marker() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    let descriptor = ElementDescriptor::legacy("div", None, &["ad", "banner"]);
    let ad = one(agent.document(), "div.ad.banner");

    assert_eq!(agent.handle(Command::HideElement(descriptor.clone())), Response::ok());
    assert!(is_hidden(agent.document(), ad));

    assert_eq!(agent.handle(Command::ShowElement(descriptor)), Response::ok());
    assert!(!is_hidden(agent.document(), ad));
}

#[test]
fn show_of_unknown_element_is_still_acknowledged() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);

    let response = agent.handle(Command::ShowElement(ElementDescriptor::legacy(
        "div",
        Some("nope"),
        &[],
    )));

    assert!(response.is_success());
}

#[test]
fn show_after_select_uses_the_unique_id() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    let descriptor = select(&mut agent, "div.promo", 0);
    let promo = all(agent.document(), "div.promo")[0];

    agent.handle(Command::ShowElement(descriptor));

    assert!(!is_hidden(agent.document(), promo));
    assert!(!agent.document().has_attr(promo, "data-cmw-unique-id"));
}

#[test]
fn wire_messages_are_decoded_into_commands() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    let nav = one(agent.document(), "nav");

    let response = agent.handle_message(serde_json::json!({
        "action": "hide-element",
        "tagName": "NAV",
        "classes": ["menu"]
    }));

    assert_eq!(response, Response::ok());
    assert!(is_hidden(agent.document(), nav));
}

#[test]
fn malformed_wire_message_gets_a_failure_response() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    let before = agent.document().elements().len();

    let unknown = agent.handle_message(serde_json::json!({ "action": "format-disk" }));
    let no_tag = agent.handle_message(serde_json::json!({ "action": "hide-element", "id": "x" }));

    for response in [&unknown, &no_tag] {
        assert!(!response.is_success());
        match response {
            Response::Ack { error: Some(error), .. } => {
                assert!(error.starts_with("unrecognized message"), "{error}")
            }
            other => panic!("expected failure ack, got {other:?}"),
        }
    }
    assert_eq!(agent.document().elements().len(), before);
    assert!(!agent.is_selecting());
}

// =========================================================================
// Journal
// =========================================================================

#[test]
fn journal_records_one_line_per_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.jsonl");
    let sites = memory_sites();
    sites
        .save(HOST, &[ElementDescriptor::legacy("nav", None, &["menu"])])
        .unwrap();

    let mut agent = PageAgent::new(HOST, page(NEWS_PAGE), sites)
        .with_settle_delay(Duration::ZERO)
        .with_tracer(Arc::new(TraceLogger::new(path.to_str().unwrap())));
    agent.start();
    agent.handle(Command::ShowElement(ElementDescriptor::legacy("nav", None, &["menu"])));

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["operation"], "apply");
    assert_eq!(lines[0]["tier"], "legacy");
    assert_eq!(lines[0]["matched"], 1);
    assert_eq!(lines[1]["operation"], "show");
    assert_eq!(lines[1]["host"], HOST);
}
