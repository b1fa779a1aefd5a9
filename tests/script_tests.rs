use clean_my_web::{
    locator::descriptor::ElementDescriptor,
    report::{
        console::{format_application_report, format_console_report},
        report_model::ScriptSuiteReport,
    },
    script::{
        runner::ScriptRunner,
        script_model::{AssertionSpec, ScriptStep, SessionScript, Target},
    },
};

mod common;
use crate::common::utils::{HOST, NEWS_PAGE, agent_on, memory_sites};

const COOKIE_SCRIPT: &str = r##"
name: hide cookie banner
host: news.example.com
steps:
  - action: toggle_selection
  - action: hover
    target: { selector: "#cookie-banner" }
    x: 40
    y: 12
  - action: assert
    assertions:
      - type: highlighted
        target: { selector: "#cookie-banner" }
      - type: selection_active
        expected: true
  - action: click
    target: { selector: "#cookie-banner" }
  - action: key
    key: Escape
  - action: assert
    assertions:
      - type: hidden
        target: { xpath: '//*[@id="cookie-banner"]' }
      - type: no_highlight
      - type: selection_active
        expected: false
      - type: stored_count
        expected: 1
  - action: reload
  - action: assert
    assertions:
      - type: hidden
        target: { selector: "#cookie-banner" }
      - type: visible
        target: { selector: "nav" }
"##;

// =========================================================================
// Script model
// =========================================================================

#[test]
fn script_parses_from_yaml() {
    let script: SessionScript = serde_yaml::from_str(COOKIE_SCRIPT).unwrap();

    assert_eq!(script.name, "hide cookie banner");
    assert_eq!(script.host, HOST);
    assert!(script.page.is_none());
    assert_eq!(script.steps.len(), 8);
    assert_eq!(script.steps[0], ScriptStep::ToggleSelection);
    assert_eq!(
        script.steps[1],
        ScriptStep::Hover {
            target: Target::selector("#cookie-banner"),
            x: 40,
            y: 12,
        }
    );
}

#[test]
fn hide_step_takes_a_stored_descriptor() {
    let step: ScriptStep = serde_yaml::from_str(
        "action: hide\ndescriptor:\n  tagName: DIV\n  classes: [ad, banner]\n",
    )
    .unwrap();

    assert_eq!(
        step,
        ScriptStep::Hide {
            descriptor: ElementDescriptor::legacy("DIV", None, &["ad", "banner"]),
        }
    );
}

// =========================================================================
// Runner
// =========================================================================

#[test]
fn cookie_script_passes() {
    let script: SessionScript = serde_yaml::from_str(COOKIE_SCRIPT).unwrap();
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);

    let result = ScriptRunner::run(&script, &mut agent);

    assert!(result.error.is_none(), "{:?}", result.error);
    for ar in &result.assertion_results {
        assert!(ar.passed, "step {}: {:?}", ar.step_index, ar.message);
    }
    assert!(result.passed);
    assert_eq!(result.steps_run, 8);
    assert_eq!(result.assertion_results.len(), 8);
}

#[test]
fn failing_assertion_is_collected_not_fatal() {
    let script = SessionScript {
        name: "wrong count".into(),
        host: HOST.into(),
        page: None,
        steps: vec![
            ScriptStep::Hide {
                descriptor: ElementDescriptor::legacy("div", None, &["promo"]),
            },
            ScriptStep::Assert {
                assertions: vec![
                    AssertionSpec::Hidden {
                        target: Target::selector("div.promo"),
                    },
                    AssertionSpec::StoredCount { expected: 2 },
                ],
            },
            ScriptStep::ToggleSelection,
        ],
    };
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);

    let result = ScriptRunner::run(&script, &mut agent);

    assert!(!result.passed);
    assert!(result.error.is_none());
    assert_eq!(result.steps_run, 3);
    assert!(result.assertion_results[0].passed);
    let count = &result.assertion_results[1];
    assert!(!count.passed);
    assert_eq!(count.actual.as_deref(), Some("0"));
}

#[test]
fn unmatched_target_stops_the_script() {
    let script = SessionScript {
        name: "missing target".into(),
        host: HOST.into(),
        page: None,
        steps: vec![
            ScriptStep::ToggleSelection,
            ScriptStep::Click {
                target: Target::xpath("/html/body/aside[1]"),
            },
            ScriptStep::Reload,
        ],
    };
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);

    let result = ScriptRunner::run(&script, &mut agent);

    assert!(!result.passed);
    assert_eq!(result.steps_run, 2);
    assert!(result.error.unwrap().starts_with("Step 1 failed"));
    // The reload never ran.
    assert!(agent.is_selecting());
}

#[test]
fn invalid_selector_target_fails_the_assertion() {
    let script = SessionScript {
        name: "bad selector".into(),
        host: HOST.into(),
        page: None,
        steps: vec![ScriptStep::Assert {
            assertions: vec![AssertionSpec::Visible {
                target: Target::selector("div#1abc"),
            }],
        }],
    };
    let sites = memory_sites();
    let mut agent = agent_on(NEWS_PAGE, &sites);

    let result = ScriptRunner::run(&script, &mut agent);

    assert!(!result.passed);
    assert!(result.error.is_none());
    assert!(
        result.assertion_results[0]
            .message
            .as_deref()
            .unwrap()
            .contains("invalid target")
    );
}

// =========================================================================
// Reports
// =========================================================================

#[test]
fn console_report_lists_failures() {
    let sites = memory_sites();
    let passing: SessionScript = serde_yaml::from_str(COOKIE_SCRIPT).unwrap();
    let failing = SessionScript {
        name: "expects nothing stored".into(),
        host: HOST.into(),
        page: None,
        steps: vec![ScriptStep::Assert {
            assertions: vec![AssertionSpec::StoredCount { expected: 0 }],
        }],
    };

    let results = vec![
        ScriptRunner::run(&passing, &mut agent_on(NEWS_PAGE, &sites)),
        // The first script stored the banner under the same host.
        ScriptRunner::run(&failing, &mut agent_on(NEWS_PAGE, &sites)),
    ];
    let report = ScriptSuiteReport::from_results("scripts", results).with_duration(1500);
    let text = format_console_report(&report);

    assert!(!report.all_passed());
    assert!(text.contains("\u{2713} PASS  hide cookie banner (8 steps, 8 assertions)"));
    assert!(text.contains("\u{2717} FAIL  expects nothing stored (1 steps, 1 assertions)"));
    assert!(text.contains("[FAIL] Step 0: StoredCount: 1 elements stored but expected 0"));
    assert!(text.contains("=== Results: 1 passed, 1 failed (2 total) in 1.5s ==="));
}

#[test]
fn application_report_shows_tier_per_element() {
    let sites = memory_sites();
    sites
        .save(
            HOST,
            &[
                ElementDescriptor::legacy("div", None, &["promo"]),
                ElementDescriptor::legacy("aside", Some("gone"), &[]),
            ],
        )
        .unwrap();
    let agent = agent_on(NEWS_PAGE, &sites);

    let text = format_application_report(agent.last_report().unwrap());

    assert!(text.starts_with("news.example.com: 2 stored, 2 hidden\n"));
    assert!(text.contains("Legacy"));
    assert!(text.contains("miss"));
    assert!(text.contains("ASIDE#gone"));
}
