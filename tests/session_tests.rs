use std::sync::mpsc;

use clean_my_web::{
    agent::{
        command::{Command, Notification, Response},
        notify::ChannelNotifier,
    },
    locator::markers::{BADGE_CLASS, HOVER_CLASS, INDICATOR_CLASS, STYLE_ELEMENT_ID},
    locator::visibility::is_hidden,
    session::{
        event::{DomEvent, ESCAPE_KEY},
        overlay::badge_label,
    },
};

mod common;
use crate::common::utils::{HOST, NEWS_PAGE, agent_on, all, memory_sites, one, page};

fn highlighted(doc: &clean_my_web::dom::document::Document) -> usize {
    all(doc, &format!(".{}", HOVER_CLASS)).len()
}

// =========================================================================
// Enable / disable
// =========================================================================

#[test]
fn toggle_reports_the_new_mode() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);

    assert_eq!(
        agent.handle(Command::ToggleSelectionMode),
        Response::Mode { active: true }
    );
    assert!(agent.is_selecting());
    assert_eq!(
        agent.handle(Command::ToggleSelectionMode),
        Response::Mode { active: false }
    );
    assert!(!agent.is_selecting());
}

#[test]
fn enabling_adds_overlay_and_crosshair() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    agent.handle(Command::ToggleSelectionMode);

    let doc = agent.document();
    let body = doc.body().unwrap();
    assert_eq!(doc.style_property(body, "cursor").as_deref(), Some("crosshair"));

    let indicator = one(doc, &format!(".{}", INDICATOR_CLASS));
    let text = doc.text_content(indicator);
    assert!(text.contains("Selection Mode Active"));
    assert!(text.contains("Click elements to hide \u{2022} ESC to exit"));

    let badge = one(doc, &format!(".{}", BADGE_CLASS));
    assert_eq!(doc.style_property(badge, "display").as_deref(), Some("none"));
}

#[test]
fn style_sheet_is_injected_once() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    for _ in 0..3 {
        agent.handle(Command::ToggleSelectionMode);
    }

    let styles = all(agent.document(), &format!("style#{}", STYLE_ELEMENT_ID));
    assert_eq!(styles.len(), 1);
    let head = agent.document().head().unwrap();
    assert_eq!(agent.document().parent(styles[0]), Some(head));
}

#[test]
fn disabling_restores_the_page_and_reuses_the_badge() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    agent.handle(Command::ToggleSelectionMode);
    let promo = one(agent.document(), "div.promo");
    agent.dispatch(DomEvent::PointerMove { target: promo, x: 5, y: 5 });

    agent.handle(Command::ToggleSelectionMode);

    let doc = agent.document();
    let body = doc.body().unwrap();
    assert_eq!(doc.style_property(body, "cursor"), None);
    assert!(all(doc, &format!(".{}", INDICATOR_CLASS)).is_empty());
    assert_eq!(highlighted(doc), 0);
    let badge = one(doc, &format!(".{}", BADGE_CLASS));
    assert_eq!(doc.style_property(badge, "display").as_deref(), Some("none"));

    agent.handle(Command::ToggleSelectionMode);
    assert_eq!(all(agent.document(), &format!(".{}", BADGE_CLASS)).len(), 1);
}

// =========================================================================
// Hover
// =========================================================================

#[test]
fn hover_a_then_b_leaves_only_b_highlighted() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    agent.handle(Command::ToggleSelectionMode);

    let a = one(agent.document(), "nav");
    let b = one(agent.document(), "section");
    agent.dispatch(DomEvent::PointerMove { target: a, x: 10, y: 10 });
    agent.dispatch(DomEvent::PointerMove { target: b, x: 20, y: 20 });

    let doc = agent.document();
    assert!(!doc.has_class(a, HOVER_CLASS));
    assert!(doc.has_class(b, HOVER_CLASS));
    assert_eq!(highlighted(doc), 1);
    assert_eq!(agent.session().unwrap().hovered(), Some(b));
    assert!(sites.load(HOST).unwrap().is_empty());
}

#[test]
fn badge_follows_the_pointer() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    agent.handle(Command::ToggleSelectionMode);
    let section = one(agent.document(), "section");

    agent.dispatch(DomEvent::PointerMove { target: section, x: 10, y: 10 });
    agent.dispatch(DomEvent::PointerMove { target: section, x: 100, y: 50 });

    let doc = agent.document();
    let badge = agent.session().unwrap().badge().unwrap();
    assert_eq!(doc.style_property(badge, "display").as_deref(), Some("block"));
    assert_eq!(doc.style_property(badge, "left").as_deref(), Some("115px"));
    assert_eq!(doc.style_property(badge, "top").as_deref(), Some("65px"));
    assert_eq!(doc.text_content(badge), "section.ad.banner");
    assert_eq!(highlighted(doc), 1);
}

#[test]
fn badge_label_shows_id_and_two_classes() {
    let doc = page(r#"<body><div id="x" class="a cmw-hover-highlight b c">t</div><p>u</p></body>"#);
    assert_eq!(badge_label(&doc, one(&doc, "div")), "div#x.a.b");
    assert_eq!(badge_label(&doc, one(&doc, "p")), "p");
}

#[test]
fn hovered_classless_element_has_no_trailing_dot() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    agent.handle(Command::ToggleSelectionMode);
    let header = one(agent.document(), "header");
    agent.dispatch(DomEvent::PointerMove { target: header, x: 5, y: 5 });

    let doc = agent.document();
    assert!(doc.has_class(header, HOVER_CLASS));
    assert_eq!(badge_label(doc, header), "header");
}

#[test]
fn overlay_is_never_highlighted() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    agent.handle(Command::ToggleSelectionMode);
    let indicator = agent.session().unwrap().indicator().unwrap();
    let inner = agent.document().descendant_elements(indicator)[0];
    let badge = agent.session().unwrap().badge().unwrap();

    for target in [indicator, inner, badge] {
        agent.dispatch(DomEvent::PointerMove { target, x: 1, y: 1 });
    }

    assert_eq!(highlighted(agent.document()), 0);
    assert_eq!(agent.session().unwrap().hovered(), None);
}

#[test]
fn hover_without_selection_mode_does_nothing() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    let nav = one(agent.document(), "nav");

    agent.dispatch(DomEvent::PointerMove { target: nav, x: 1, y: 1 });

    assert_eq!(highlighted(agent.document()), 0);
}

// =========================================================================
// Click
// =========================================================================

#[test]
fn click_hides_persists_and_notifies() {
    let sites = memory_sites();
    let (tx, rx) = mpsc::channel();
    let mut agent = agent_on(NEWS_PAGE, &sites).with_notifier(Box::new(ChannelNotifier::new(tx)));
    agent.handle(Command::ToggleSelectionMode);
    let promo = all(agent.document(), "div.promo")[1];
    agent.dispatch(DomEvent::PointerMove { target: promo, x: 0, y: 0 });

    let outcome = agent.dispatch(DomEvent::Click { target: promo });

    assert!(outcome.default_prevented);
    assert!(!outcome.deactivated);
    let committed = outcome.committed.expect("click commits a descriptor");
    assert_eq!(committed.xpath.as_deref(), Some("/html/body/main[1]/div[2]"));

    assert!(is_hidden(agent.document(), promo));
    assert_eq!(highlighted(agent.document()), 0);
    // Selection mode stays on after a commit.
    assert!(agent.is_selecting());

    assert_eq!(sites.load(HOST).unwrap(), vec![committed.clone()]);
    assert_eq!(
        rx.try_recv().unwrap(),
        Notification::ElementHidden { element: committed }
    );
}

#[test]
fn click_on_overlay_passes_through() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    agent.handle(Command::ToggleSelectionMode);
    let indicator = agent.session().unwrap().indicator().unwrap();

    let outcome = agent.dispatch(DomEvent::Click { target: indicator });

    assert!(!outcome.default_prevented);
    assert!(outcome.committed.is_none());
    assert!(sites.load(HOST).unwrap().is_empty());
}

#[test]
fn click_without_selection_mode_is_ignored() {
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);
    let nav = one(agent.document(), "nav");

    let outcome = agent.dispatch(DomEvent::Click { target: nav });

    assert!(!outcome.default_prevented);
    assert!(!is_hidden(agent.document(), nav));
}

#[test]
fn commit_without_listener_still_persists() {
    let sites = memory_sites();
    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut agent = agent_on(NEWS_PAGE, &sites).with_notifier(Box::new(ChannelNotifier::new(tx)));
    agent.handle(Command::ToggleSelectionMode);
    let nav = one(agent.document(), "nav");

    agent.dispatch(DomEvent::Click { target: nav });

    assert_eq!(sites.load(HOST).unwrap().len(), 1);
}

// =========================================================================
// Escape
// =========================================================================

#[test]
fn escape_ends_selection_and_tells_the_panel() {
    let sites = memory_sites();
    let (tx, rx) = mpsc::channel();
    let mut agent = agent_on(NEWS_PAGE, &sites).with_notifier(Box::new(ChannelNotifier::new(tx)));
    agent.handle(Command::ToggleSelectionMode);
    let nav = one(agent.document(), "nav");
    agent.dispatch(DomEvent::PointerMove { target: nav, x: 0, y: 0 });

    let outcome = agent.dispatch(DomEvent::KeyDown { key: ESCAPE_KEY.into() });

    assert!(outcome.deactivated);
    assert!(!agent.is_selecting());
    assert_eq!(highlighted(agent.document()), 0);
    assert_eq!(rx.try_recv().unwrap(), Notification::SelectionModeOff);
}

#[test]
fn other_keys_and_idle_escape_are_ignored() {
    let sites = memory_sites();
    let (tx, rx) = mpsc::channel();
    let mut agent = agent_on(NEWS_PAGE, &sites).with_notifier(Box::new(ChannelNotifier::new(tx)));

    let idle = agent.dispatch(DomEvent::KeyDown { key: ESCAPE_KEY.into() });
    assert!(!idle.deactivated);

    agent.handle(Command::ToggleSelectionMode);
    let other = agent.dispatch(DomEvent::KeyDown { key: "Enter".into() });
    assert!(!other.deactivated);
    assert!(agent.is_selecting());
    assert!(rx.try_recv().is_err());
}
