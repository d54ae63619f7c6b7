//! Generate → review → (refactor → re-review) pipeline.
//!
//! One run is strictly sequential: every step needs the previous step's
//! output, so at most one provider call is in flight per run. Runs share no
//! state and may execute concurrently.

use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::code::GeneratedCode;
use crate::domain::review::{ReviewResult, ReviewerIdentity};
use crate::domain::run_result::RunResult;
use crate::error::{ArchitectError, ArchitectResult};
use crate::generator::CodeGenerator;
use crate::prompts::refactor_prompt;
use crate::reviewer::CodeReviewer;
use crate::state_machine::{PipelineState, PipelineStateMachine};

/// Self-correction is bounded to a single pass.
pub const MAX_REFACTOR_PASSES: u32 = 1;

pub struct Orchestrator {
    generator: Arc<dyn CodeGenerator>,
    primary: Arc<dyn CodeReviewer>,
    fallback: Arc<dyn CodeReviewer>,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn CodeGenerator>,
        primary: Arc<dyn CodeReviewer>,
        fallback: Arc<dyn CodeReviewer>,
    ) -> Self {
        Self {
            generator,
            primary,
            fallback,
        }
    }

    /// Run the whole pipeline for one task.
    ///
    /// Never fails: generation errors and fallback-review errors become a
    /// `Critical failure: ...` [`RunResult`].
    pub async fn run(&self, task: &str) -> RunResult {
        let run_id = Uuid::new_v4();

        async move {
            info!(task_len = task.len(), "Starting run");
            let mut state = PipelineState::Generating;

            match self.execute(task, &mut state).await {
                Ok(result) => {
                    info!(reviewer_used = %result.reviewer_used, "Run completed");
                    result
                }
                Err(e) => Self::fail(&mut state, e),
            }
        }
        .instrument(info_span!("run", run_id = %run_id))
        .await
    }

    async fn execute(&self, task: &str, state: &mut PipelineState) -> ArchitectResult<RunResult> {
        let mut code = self.generator.generate(task).await?;

        Self::advance(state, PipelineState::Reviewing)?;
        let (mut review, mut reviewer) = self.review_with_fallback(&code, false).await?;

        let mut passes = 0;
        while !review.is_lgtm() && passes < MAX_REFACTOR_PASSES {
            Self::advance(state, PipelineState::Refactoring)?;
            info!(findings = review.as_str().lines().count(), "Review found issues, refactoring");

            let prompt = refactor_prompt(review.as_str(), code.as_str());
            code = self.generator.generate(&prompt).await?;
            passes += 1;

            Self::advance(state, PipelineState::ReReviewing)?;
            (review, reviewer) = self.review_with_fallback(&code, true).await?;
        }

        if !review.is_lgtm() {
            info!("Issues remain after refactor, returning code as-is");
        }

        Self::advance(state, PipelineState::Done)?;
        Ok(RunResult::completed(code, review, reviewer))
    }

    /// Review with the primary reviewer, substituting the fallback on any
    /// primary failure. Fallback failures propagate.
    async fn review_with_fallback(
        &self,
        code: &GeneratedCode,
        after_refactor: bool,
    ) -> ArchitectResult<(ReviewResult, ReviewerIdentity)> {
        match self.primary.review(code.as_str()).await {
            Ok(review) => Ok((review, ReviewerIdentity::for_pass(false, after_refactor))),
            Err(e) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Primary reviewer failed, using fallback"
                );
                let review = self.fallback.review(code.as_str()).await?;
                Ok((review, ReviewerIdentity::for_pass(true, after_refactor)))
            }
        }
    }

    /// Move to `Failed` and build the failure record for `e`.
    fn fail(state: &mut PipelineState, e: ArchitectError) -> RunResult {
        error!(state = %state, error = %e, "Run failed");
        if let Err(transition) = Self::advance(state, PipelineState::Failed) {
            warn!(error = %transition, "Could not mark run as failed");
        }
        RunResult::failure(e)
    }

    fn advance(state: &mut PipelineState, next: PipelineState) -> ArchitectResult<()> {
        PipelineStateMachine::validate_transition(*state, next)?;
        debug!(from = %state, to = %next, "Pipeline transition");
        *state = next;
        Ok(())
    }
}
