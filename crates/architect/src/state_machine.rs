use std::fmt;

use crate::error::{ArchitectError, ArchitectResult};

/// Stage of one generate/review/refactor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Generating,
    Reviewing,
    Refactoring,
    ReReviewing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generating => "generating",
            Self::Reviewing => "reviewing",
            Self::Refactoring => "refactoring",
            Self::ReReviewing => "re_reviewing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct PipelineStateMachine;

impl PipelineStateMachine {
    pub fn validate_transition(from: PipelineState, to: PipelineState) -> ArchitectResult<()> {
        if Self::allowed_transitions(from).contains(&to) {
            Ok(())
        } else {
            Err(ArchitectError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    // ReReviewing never leads back to Refactoring: at most one correction pass.
    fn allowed_transitions(from: PipelineState) -> Vec<PipelineState> {
        use PipelineState::*;
        match from {
            Generating => vec![Reviewing, Failed],
            Reviewing => vec![Refactoring, Done, Failed],
            Refactoring => vec![ReReviewing, Failed],
            ReReviewing => vec![Done, Failed],
            Done | Failed => vec![],
        }
    }

    pub fn can_transition(from: PipelineState, to: PipelineState) -> bool {
        Self::validate_transition(from, to).is_ok()
    }
}
