use crate::script::script_model::AssertionResult;

/// Execution state of a running script.
#[derive(Debug, Clone, Default)]
pub struct ScriptContext {
    pub current_step: usize,
    pub assertion_results: Vec<AssertionResult>,
}

impl ScriptContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_assertions(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }

    pub fn pass_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| r.passed).count()
    }

    pub fn fail_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| !r.passed).count()
    }
}
