use tracing::debug;

use crate::{
    agent::{command::Command, error::AgentError, page_agent::PageAgent},
    dom::{
        document::{Document, NodeId},
        selector::query_selector_all,
        xpath::XPath,
    },
    locator::{markers::HOVER_CLASS, visibility::is_hidden},
    script::{
        context::ScriptContext,
        script_model::{AssertionResult, AssertionSpec, ScriptResult, ScriptStep, SessionScript, Target},
    },
    session::event::DomEvent,
};

/// Replays a [`SessionScript`] step by step against a page agent.
pub struct ScriptRunner;

impl ScriptRunner {
    /// Run every step in order, stopping at the first step that cannot run.
    ///
    /// Assertion failures do not stop the script; they are collected in the
    /// result.
    pub fn run(script: &SessionScript, agent: &mut PageAgent) -> ScriptResult {
        let mut ctx = ScriptContext::new();

        for (i, step) in script.steps.iter().enumerate() {
            ctx.current_step = i;

            if let Err(e) = Self::execute_step(step, i, agent, &mut ctx) {
                return ScriptResult {
                    script_name: script.name.clone(),
                    passed: false,
                    steps_run: i + 1,
                    assertion_results: ctx.assertion_results,
                    error: Some(format!("Step {} failed: {}", i, e)),
                };
            }
        }

        ScriptResult {
            script_name: script.name.clone(),
            passed: ctx.all_passed(),
            steps_run: script.steps.len(),
            assertion_results: ctx.assertion_results,
            error: None,
        }
    }

    fn execute_step(
        step: &ScriptStep,
        step_index: usize,
        agent: &mut PageAgent,
        ctx: &mut ScriptContext,
    ) -> Result<(), AgentError> {
        debug!(step_index, ?step, "script step");
        match step {
            ScriptStep::ToggleSelection => {
                agent.handle(Command::ToggleSelectionMode);
            }
            ScriptStep::Hover { target, x, y } => {
                let node = Self::first_target(agent.document(), target)?;
                agent.dispatch(DomEvent::PointerMove {
                    target: node,
                    x: *x,
                    y: *y,
                });
            }
            ScriptStep::Click { target } => {
                let node = Self::first_target(agent.document(), target)?;
                agent.dispatch(DomEvent::Click { target: node });
            }
            ScriptStep::Key { key } => {
                agent.dispatch(DomEvent::KeyDown { key: key.clone() });
            }
            ScriptStep::Hide { descriptor } => {
                agent.handle(Command::HideElement(descriptor.clone()));
            }
            ScriptStep::Show { descriptor } => {
                agent.handle(Command::ShowElement(descriptor.clone()));
            }
            ScriptStep::Reload => {
                agent.handle(Command::ReloadPage);
            }
            ScriptStep::Assert { assertions } => {
                let results = assertions
                    .iter()
                    .map(|spec| Self::evaluate_one(spec, step_index, agent))
                    .collect();
                ctx.record_assertions(results);
            }
        }
        Ok(())
    }

    fn evaluate_one(spec: &AssertionSpec, step_index: usize, agent: &PageAgent) -> AssertionResult {
        let outcome = match spec {
            AssertionSpec::Hidden { target } => {
                Self::targets(agent.document(), target).map(|nodes| {
                    let hidden = nodes
                        .iter()
                        .filter(|&&n| is_hidden(agent.document(), n))
                        .count();
                    let passed = !nodes.is_empty() && hidden == nodes.len();
                    let actual = format!("{} of {} hidden", hidden, nodes.len());
                    let message = (!passed).then(|| format!("{} is not hidden", target));
                    (passed, Some(actual), message)
                })
            }

            AssertionSpec::Visible { target } => {
                Self::targets(agent.document(), target).map(|nodes| {
                    let hidden = nodes
                        .iter()
                        .filter(|&&n| is_hidden(agent.document(), n))
                        .count();
                    let passed = !nodes.is_empty() && hidden == 0;
                    let actual = format!("{} of {} hidden", hidden, nodes.len());
                    let message = (!passed).then(|| {
                        if nodes.is_empty() {
                            format!("{} matched no element", target)
                        } else {
                            format!("{} is hidden", target)
                        }
                    });
                    (passed, Some(actual), message)
                })
            }

            AssertionSpec::Highlighted { target } => {
                Self::first_target(agent.document(), target).map(|node| {
                    let highlighted = Self::highlighted(agent.document());
                    let passed = highlighted == [node];
                    let actual = format!("{} highlighted", highlighted.len());
                    let message =
                        (!passed).then(|| format!("{} is not the only highlighted element", target));
                    (passed, Some(actual), message)
                })
            }

            AssertionSpec::NoHighlight => {
                let highlighted = Self::highlighted(agent.document());
                let passed = highlighted.is_empty();
                Ok((
                    passed,
                    Some(format!("{} highlighted", highlighted.len())),
                    (!passed).then(|| "an element is still highlighted".to_string()),
                ))
            }

            AssertionSpec::SelectionActive { expected } => {
                let active = agent.is_selecting();
                let passed = active == *expected;
                Ok((
                    passed,
                    Some(active.to_string()),
                    (!passed).then(|| format!("selection mode is {} but expected {}", active, expected)),
                ))
            }

            AssertionSpec::StoredCount { expected } => agent
                .sites()
                .load(agent.host())
                .map_err(AgentError::from)
                .map(|stored| {
                    let count = stored.len();
                    let passed = count == *expected;
                    (
                        passed,
                        Some(count.to_string()),
                        (!passed)
                            .then(|| format!("{} elements stored but expected {}", count, expected)),
                    )
                }),
        };

        match outcome {
            Ok((passed, actual, message)) => AssertionResult {
                step_index,
                spec: spec.clone(),
                passed,
                actual,
                message,
            },
            Err(e) => AssertionResult {
                step_index,
                spec: spec.clone(),
                passed: false,
                actual: None,
                message: Some(e.to_string()),
            },
        }
    }

    /// Every element the target names, in document order.
    fn targets(doc: &Document, target: &Target) -> Result<Vec<NodeId>, AgentError> {
        match (&target.xpath, &target.selector) {
            (Some(expr), _) => XPath::parse(expr)
                .map(|xpath| xpath.select(doc))
                .map_err(|e| AgentError::InvalidTarget(e.to_string())),
            (None, Some(selector)) => query_selector_all(doc, selector)
                .map_err(|e| AgentError::InvalidTarget(e.to_string())),
            (None, None) => Err(AgentError::InvalidTarget(target.to_string())),
        }
    }

    fn first_target(doc: &Document, target: &Target) -> Result<NodeId, AgentError> {
        Self::targets(doc, target)?
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::TargetNotFound(target.to_string()))
    }

    fn highlighted(doc: &Document) -> Vec<NodeId> {
        doc.elements()
            .into_iter()
            .filter(|&n| doc.has_class(n, HOVER_CLASS))
            .collect()
    }
}
