use serde::{Deserialize, Serialize};

use crate::locator::descriptor::ElementDescriptor;

/// A recorded selection session, replayed against a page agent.
///
/// Deserialized from YAML:
///
/// ```yaml
/// name: hide cookie banner
/// host: example.com
/// page: fixtures/home.html
/// steps:
///   - action: toggle_selection
///   - action: hover
///     target: { selector: "#cookie-banner" }
///   - action: click
///     target: { selector: "#cookie-banner" }
///   - action: assert
///     assertions:
///       - type: hidden
///         target: { selector: "#cookie-banner" }
///       - type: stored_count
///         expected: 1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionScript {
    pub name: String,

    /// Hostname the session runs under
    pub host: String,

    /// HTML file to load; the CLI may supply one instead
    #[serde(default)]
    pub page: Option<String>,

    pub steps: Vec<ScriptStep>,
}

/// One interaction or check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Panel toggle button
    ToggleSelection,

    /// Pointer moves over an element
    Hover {
        target: Target,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        y: i32,
    },

    Click {
        target: Target,
    },

    /// Key press, e.g. `Escape`
    Key {
        key: String,
    },

    /// Send a hide-element command
    Hide {
        descriptor: ElementDescriptor,
    },

    /// Send a show-element command
    Show {
        descriptor: ElementDescriptor,
    },

    /// Reload the page and rerun the application pass
    Reload,

    Assert {
        assertions: Vec<AssertionSpec>,
    },
}

/// How a script names an element: a path expression or a CSS selector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl Target {
    pub fn xpath(expr: &str) -> Self {
        Self {
            xpath: Some(expr.to_string()),
            selector: None,
        }
    }

    pub fn selector(selector: &str) -> Self {
        Self {
            xpath: None,
            selector: Some(selector.to_string()),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.xpath, &self.selector) {
            (Some(x), _) => write!(f, "xpath '{}'", x),
            (None, Some(s)) => write!(f, "selector '{}'", s),
            (None, None) => write!(f, "(empty target)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssertionSpec {
    /// Every element matching the target carries the hidden marker
    Hidden { target: Target },

    /// No element matching the target carries the hidden marker
    Visible { target: Target },

    /// The target is the one highlighted element
    Highlighted { target: Target },

    /// Nothing on the page is highlighted
    NoHighlight,

    SelectionActive { expected: bool },

    /// Number of descriptors stored for the script's host
    StoredCount { expected: usize },
}

impl AssertionSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            AssertionSpec::Hidden { .. } => "Hidden",
            AssertionSpec::Visible { .. } => "Visible",
            AssertionSpec::Highlighted { .. } => "Highlighted",
            AssertionSpec::NoHighlight => "NoHighlight",
            AssertionSpec::SelectionActive { .. } => "SelectionActive",
            AssertionSpec::StoredCount { .. } => "StoredCount",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Step the assertion belongs to (0-indexed)
    pub step_index: usize,
    pub spec: AssertionSpec,
    pub passed: bool,
    pub actual: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptResult {
    pub script_name: String,

    /// All steps ran and every assertion passed
    pub passed: bool,

    pub steps_run: usize,
    pub assertion_results: Vec<AssertionResult>,

    /// Set when a step could not run (as opposed to an assertion failing)
    pub error: Option<String>,
}
