use std::fmt;

/// Where a publish run currently is.
///
/// Runs move strictly forward through the variants in declaration order;
/// `Failed` and `Cancelled` are terminal and can be entered from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    Building,
    AwaitingMessage,
    Committing,
    Pulling,
    Pushing,
    Done,
    /// The run stopped at `step`.
    Failed { step: Step },
    Cancelled,
}

/// The step a failure happened in, used to pick the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Validate,
    Build,
    Prompt,
    Commit,
    Pull,
    Push,
}

impl PublishState {
    /// Short status-bar text for this state.
    pub fn label(&self) -> &'static str {
        match self {
            PublishState::Idle => "idle",
            PublishState::Building => "building…",
            PublishState::AwaitingMessage => "awaiting commit…",
            PublishState::Committing => "committing…",
            PublishState::Pulling => "pulling…",
            PublishState::Pushing => "publishing…",
            PublishState::Done => "published",
            PublishState::Failed { step: Step::Build } => "build failed",
            PublishState::Failed { step: Step::Validate } => "config invalid",
            PublishState::Failed { .. } => "publish failed",
            PublishState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PublishState::Done | PublishState::Failed { .. } | PublishState::Cancelled
        )
    }

    /// Step that a failure while in this state is attributed to.
    pub fn step(&self) -> Step {
        match self {
            PublishState::Idle => Step::Validate,
            PublishState::Building => Step::Build,
            PublishState::AwaitingMessage => Step::Prompt,
            PublishState::Committing => Step::Commit,
            PublishState::Pulling => Step::Pull,
            PublishState::Pushing | PublishState::Done => Step::Push,
            PublishState::Failed { step } => *step,
            PublishState::Cancelled => Step::Prompt,
        }
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
