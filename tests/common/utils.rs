use std::sync::Arc;
use std::time::Duration;

use clean_my_web::{
    agent::page_agent::PageAgent,
    dom::{
        document::{Document, NodeId},
        html::parse_html,
        selector::{query_selector, query_selector_all},
    },
    store::{site::SiteStore, store::MemoryStore},
};

pub const HOST: &str = "news.example.com";

/// News front page with a cookie banner, two promos and a plain article list.
pub const NEWS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>News</title></head>
<body>
  <div id="cookie-banner" class="banner">We use cookies <button>OK</button></div>
  <header><nav class="menu">Home</nav></header>
  <main>
    <div class="promo">Subscribe now</div>
    <article><p>First story</p></article>
    <div class="promo">Buy the app</div>
    <div class="ad banner">Ad one</div>
    <div class="ad">Ad two</div>
    <section class="ad banner sidebar">Ad three</section>
  </main>
</body>
</html>"#;

pub fn page(html: &str) -> Document {
    parse_html(html)
}

pub fn memory_sites() -> SiteStore {
    SiteStore::new(Arc::new(MemoryStore::new()))
}

/// A started agent over `html` with no settling delay.
pub fn agent_on(html: &str, sites: &SiteStore) -> PageAgent {
    let mut agent = PageAgent::new(HOST, parse_html(html), sites.clone())
        .with_settle_delay(Duration::ZERO);
    agent.start();
    agent
}

pub fn one(doc: &Document, selector: &str) -> NodeId {
    query_selector(doc, selector)
        .expect("valid selector")
        .unwrap_or_else(|| panic!("no element for {}", selector))
}

pub fn all(doc: &Document, selector: &str) -> Vec<NodeId> {
    query_selector_all(doc, selector).expect("valid selector")
}
