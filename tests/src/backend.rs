use reclaim_foundation::BranchAndBoundBackend;
use reclaim_kernel::backend::{
    BackendError, MipProblem, MipSolution, OptimizationBackend, SolveOptions, SolveStatus,
};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// What the mock answers for one solve call.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Forward to the real branch-and-bound backend.
    Delegate,
    /// Report a status without an assignment.
    Status(SolveStatus),
    /// Return a fixed solution as is.
    Solution(MipSolution),
    /// Fail the call.
    Error(BackendError),
}

/// A mock backend that implements `OptimizationBackend`.
///
/// Responses are consumed from a script in order; once the script is empty
/// the fallback response is used. Every problem it receives is recorded, so
/// tests can inspect the formulation a strategy produced.
#[derive(Clone)]
pub struct MockOptimizationBackend {
    name: String,
    script: Arc<RwLock<VecDeque<ScriptedResponse>>>,
    fallback: ScriptedResponse,
    problems: Arc<RwLock<Vec<MipProblem>>>,
    options: Arc<RwLock<Vec<SolveOptions>>>,
    inner: BranchAndBoundBackend,
}

impl Default for MockOptimizationBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOptimizationBackend {
    /// A mock that delegates every call to the real solver.
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            script: Arc::new(RwLock::new(VecDeque::new())),
            fallback: ScriptedResponse::Delegate,
            problems: Arc::new(RwLock::new(Vec::new())),
            options: Arc::new(RwLock::new(Vec::new())),
            inner: BranchAndBoundBackend::new(),
        }
    }

    /// A mock that always reports `status`.
    pub fn with_status(status: SolveStatus) -> Self {
        let mut backend = Self::new();
        backend.set_fallback(ScriptedResponse::Status(status));
        backend
    }

    /// A mock that always fails with `error`.
    pub fn failing(error: BackendError) -> Self {
        let mut backend = Self::new();
        backend.set_fallback(ScriptedResponse::Error(error));
        backend
    }

    /// Queue a response for the next unanswered call.
    pub fn push_response(&self, response: ScriptedResponse) {
        if let Ok(mut script) = self.script.write() {
            script.push_back(response);
        }
    }

    /// Set the response used once the script is exhausted.
    pub fn set_fallback(&mut self, response: ScriptedResponse) {
        self.fallback = response;
    }

    pub fn call_count(&self) -> usize {
        self.problems.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Problems received so far, oldest first.
    pub fn problems(&self) -> Vec<MipProblem> {
        self.problems.read().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn last_problem(&self) -> Option<MipProblem> {
        self.problems.read().ok().and_then(|p| p.last().cloned())
    }

    pub fn last_options(&self) -> Option<SolveOptions> {
        self.options.read().ok().and_then(|o| o.last().cloned())
    }

    pub fn name_str(&self) -> &str {
        &self.name
    }
}

impl OptimizationBackend for MockOptimizationBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(
        &self,
        problem: &MipProblem,
        options: &SolveOptions,
    ) -> Result<MipSolution, BackendError> {
        if let Ok(mut problems) = self.problems.write() {
            problems.push(problem.clone());
        }
        if let Ok(mut recorded) = self.options.write() {
            recorded.push(options.clone());
        }

        let response = self
            .script
            .write()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| self.fallback.clone());

        match response {
            ScriptedResponse::Delegate => self.inner.solve(problem, options),
            ScriptedResponse::Status(status) => Ok(MipSolution::without_assignment(status, 0)),
            ScriptedResponse::Solution(solution) => Ok(solution),
            ScriptedResponse::Error(error) => Err(error),
        }
    }
}
