use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::analysis::{RangePolicy, TaskAnalysis};
use crate::context::ContextSample;
use crate::error::AnalysisError;
use crate::llm::LLMClient;
use crate::prompt::{MAX_CONTEXT_SAMPLES, TaskAnalysisRequest};

/// Turns a task title, description and context into a [`TaskAnalysis`] by
/// asking a language model.
///
/// Holds no state between calls, so one analyzer may serve any number of
/// concurrent callers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use taskwise::{TaskAnalyzer, llm::mock_chat::MockChat};
/// # tokio_test::block_on(async {
/// let analyzer = TaskAnalyzer::new(Arc::new(MockChat::default()));
/// let analysis = analyzer.analyze_task("Plan sprint", None, &[]).await.unwrap();
/// assert_eq!(analysis.priority.value, 3);
/// # });
/// ```
#[derive(Clone)]
pub struct TaskAnalyzer {
    llm: Arc<dyn LLMClient>,
    max_context_samples: usize,
    policy: RangePolicy,
}

impl TaskAnalyzer {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self {
            llm,
            max_context_samples: MAX_CONTEXT_SAMPLES,
            policy: RangePolicy::default(),
        }
    }

    /// Caps how many context samples go into the prompt.
    pub fn max_context_samples(mut self, max: usize) -> Self {
        self.max_context_samples = max;
        self
    }

    /// Chooses how out-of-range model values are handled.
    pub fn range_policy(mut self, policy: RangePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Analyzes one task with a single model round trip.
    ///
    /// Fails with [`AnalysisError::InvalidInput`] for a blank title before the
    /// model is contacted, [`AnalysisError::ModelUnavailable`] if the call does
    /// not complete, and [`AnalysisError::MalformedResponse`] if the reply is
    /// not a valid analysis. Nothing is retried.
    pub async fn analyze_task(
        &self,
        title: &str,
        description: Option<&str>,
        samples: &[ContextSample],
    ) -> Result<TaskAnalysis, AnalysisError> {
        let request =
            TaskAnalysisRequest::new(title, description, samples, self.max_context_samples)?;
        let messages = request.messages()?;
        trace!(
            target: "llm",
            title = request.title(),
            samples = request.samples().len(),
            "analysis prompt built"
        );

        let start = Instant::now();
        let raw = self.llm.chat(&messages).await?;
        debug!(target: "llm", elapsed = ?start.elapsed(), "analysis response received");

        TaskAnalysis::parse(&raw, self.policy).inspect_err(|e| {
            debug!(target: "llm", error = %e, %raw, "invalid analysis response");
        })
    }
}
