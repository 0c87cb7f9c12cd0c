use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{OracleError, OracleRequest, TextOracle};

/// Deterministic test double: replays a scripted sequence of outcomes.
///
/// Once the script is exhausted the last entry repeats, so tests can
/// script "always succeeds with X" with a single entry. Also records
/// every request for assertions on prompts and call counts.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<String, OracleError>>>,
    last: Mutex<Option<Result<String, OracleError>>>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<Result<String, OracleError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// An oracle that returns the same completion for every call.
    pub fn always(completion: impl Into<String>) -> Self {
        Self::new(vec![Ok(completion.into())])
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = script.pop_front() {
            *last = Some(next.clone());
            next
        } else if let Some(ref repeat) = *last {
            repeat.clone()
        } else {
            Err(OracleError::ServiceError("script is empty".to_string()))
        }
    }
}
