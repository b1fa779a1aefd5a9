use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::agent::application::ApplicationReport;
use crate::agent::error::AgentError;
use crate::agent::page_agent::PageAgent;
use crate::browser::page::{fetch_page, load_page_file};
use crate::cli::config::Settings;
use crate::dom::document::Document;
use crate::dom::html::to_html;
use crate::dom::selector::query_selector;
use crate::dom::xpath::evaluate_first;
use crate::locator::describe::describe;
use crate::locator::descriptor::ElementDescriptor;
use crate::report::console::{format_application_report, format_console_report};
use crate::report::report_model::ScriptSuiteReport;
use crate::script::runner::ScriptRunner;
use crate::script::script_model::{ScriptResult, SessionScript};
use crate::store::site::SiteStore;
use crate::store::store::JsonFileStore;
use crate::trace::logger::TraceLogger;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// apply subcommand
// ============================================================================

/// Load a page, run the application pass for its host and report the result.
pub fn cmd_apply(
    settings: &Settings,
    host: Option<&str>,
    html: Option<&str>,
    url: Option<&str>,
    output: Option<&str>,
) -> CmdResult<ApplicationReport> {
    let (host, document) = match (html, url) {
        (Some(path), _) => {
            let host = host.ok_or("--host is required with --html")?;
            (host.to_string(), load_page_file(path)?)
        }
        (None, Some(url)) => {
            let page = fetch_page(url)?;
            (host.map(str::to_string).unwrap_or(page.host), page.document)
        }
        (None, None) => return Err("either --html or --url is required".into()),
    };

    let mut agent = build_agent(settings, &host, document)?;
    let report = agent
        .start()
        .cloned()
        .ok_or("stored elements could not be read")?;

    print!("{}", format_application_report(&report));

    if let Some(path) = output {
        std::fs::write(path, to_html(agent.document()))?;
        info!(path, "page written");
    }
    Ok(report)
}

// ============================================================================
// describe subcommand
// ============================================================================

/// Describe the element a path expression or selector names in a page file.
pub fn cmd_describe(
    settings: &Settings,
    host: &str,
    html: &str,
    xpath: Option<&str>,
    selector: Option<&str>,
    save: bool,
) -> CmdResult<ElementDescriptor> {
    let mut document = load_page_file(html)?;

    let node = match (xpath, selector) {
        (Some(expr), _) => {
            evaluate_first(&document, expr).map_err(|e| AgentError::InvalidTarget(e.to_string()))?
        }
        (None, Some(sel)) => {
            query_selector(&document, sel).map_err(|e| AgentError::InvalidTarget(e.to_string()))?
        }
        (None, None) => return Err("either --xpath or --selector is required".into()),
    };
    let node = node.ok_or_else(|| {
        AgentError::TargetNotFound(xpath.or(selector).unwrap_or_default().to_string())
    })?;

    let descriptor = describe(&mut document, node);
    println!("{}", serde_json::to_string_pretty(&descriptor)?);

    if save {
        let sites = open_sites(settings)?;
        if sites.append(host, &descriptor)? {
            println!("Saved {} for {}", descriptor.key(), host);
        }
    }
    Ok(descriptor)
}

// ============================================================================
// select subcommand
// ============================================================================

/// Replay session scripts and return whether all passed.
pub fn cmd_select(settings: &Settings, script_path: &str, html: Option<&str>, verbose: u8) -> CmdResult<bool> {
    let scripts = load_scripts(script_path)?;

    if scripts.is_empty() {
        eprintln!("No scripts found at: {}", script_path);
        return Ok(true);
    }

    let start = std::time::Instant::now();
    let mut results = Vec::new();
    for script in &scripts {
        if verbose > 0 {
            eprintln!("  Running: {}", script.name);
        }
        results.push(run_script(settings, script, html));
    }

    let report = ScriptSuiteReport::from_results(script_path, results)
        .with_duration(start.elapsed().as_millis());
    print!("{}", format_console_report(&report));
    Ok(report.all_passed())
}

fn run_script(settings: &Settings, script: &SessionScript, html: Option<&str>) -> ScriptResult {
    let setup = html
        .or(script.page.as_deref())
        .ok_or_else(|| "script has no page and --html was not given".to_string())
        .and_then(|page| load_page_file(page).map_err(|e| e.to_string()))
        .and_then(|document| build_agent(settings, &script.host, document).map_err(|e| e.to_string()));

    match setup {
        Ok(mut agent) => {
            agent.start();
            ScriptRunner::run(script, &mut agent)
        }
        Err(error) => ScriptResult {
            script_name: script.name.clone(),
            passed: false,
            steps_run: 0,
            assertion_results: Vec::new(),
            error: Some(error),
        },
    }
}

/// Load scripts from a single YAML file or a directory of YAML files.
pub fn load_scripts(path: &str) -> CmdResult<Vec<SessionScript>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        let mut scripts = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let p = entry?.path();
            if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                let content = std::fs::read_to_string(&p)?;
                scripts.push(serde_yaml::from_str::<SessionScript>(&content)?);
            }
        }
        // Deterministic order
        scripts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(scripts)
    } else {
        let content = std::fs::read_to_string(path)?;
        Ok(vec![serde_yaml::from_str(&content)?])
    }
}

// ============================================================================
// site management subcommands
// ============================================================================

pub fn cmd_sites(settings: &Settings) -> CmdResult<()> {
    let sites = open_sites(settings)?.all_sites()?;
    if sites.is_empty() {
        println!("No sites with hidden elements");
        return Ok(());
    }

    for site in &sites {
        let flag = if site.disabled { " (disabled)" } else { "" };
        println!("{}: {} hidden{}", site.host, site.descriptors.len(), flag);
        for descriptor in &site.descriptors {
            println!("  {}  {}", descriptor.key(), descriptor.display_label());
        }
    }
    Ok(())
}

/// Forget one stored element; returns whether the key was found.
pub fn cmd_show(settings: &Settings, host: &str, key: &str) -> CmdResult<bool> {
    match open_sites(settings)?.remove_key(host, key)? {
        Some(descriptor) => {
            println!("\u{2713} Element shown: {}", descriptor.display_label());
            Ok(true)
        }
        None => {
            eprintln!("No stored element {} for {}", key, host);
            Ok(false)
        }
    }
}

pub fn cmd_reset(settings: &Settings, host: Option<&str>, all: bool) -> CmdResult<()> {
    let sites = open_sites(settings)?;
    match host {
        Some(host) if !all => {
            sites.reset_site(host)?;
            println!("\u{2713} Reset {}", host);
        }
        _ => {
            if sites.all_sites()?.is_empty() {
                println!("No sites to reset");
                return Ok(());
            }
            sites.reset_all()?;
            println!("\u{2713} All sites reset");
        }
    }
    Ok(())
}

pub fn cmd_set_disabled(settings: &Settings, host: &str, disabled: bool) -> CmdResult<()> {
    open_sites(settings)?.set_disabled(host, disabled)?;
    let state = if disabled { "Disabled" } else { "Enabled" };
    println!("\u{2713} {} on {}", state, host);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

pub fn open_sites(settings: &Settings) -> CmdResult<SiteStore> {
    let store = JsonFileStore::open(Path::new(&settings.store_path))?;
    Ok(SiteStore::new(Arc::new(store)))
}

fn build_agent(settings: &Settings, host: &str, document: Document) -> CmdResult<PageAgent> {
    let tracer = match &settings.trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    Ok(PageAgent::new(host, document, open_sites(settings)?)
        .with_settle_delay(Duration::from_millis(settings.settle_delay_ms))
        .with_tracer(Arc::new(tracer)))
}
