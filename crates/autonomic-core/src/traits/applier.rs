use crate::errors::AutonomicResult;
use crate::models::ProposedAction;
use crate::pattern::Pattern;

/// External collaborator that receives the reviewable action list.
/// It decides whether anything is actually applied.
pub trait ActionApplier: Send + Sync {
    fn propose(&self, actions: &[ProposedAction]) -> AutonomicResult<()>;
}

/// Turns an accepted pattern into the opaque `action_description`.
pub trait ActionDescriber: Send + Sync {
    fn describe(&self, pattern: &Pattern) -> String;
}

/// Default describer: renders the structural description.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderedDescriber;

impl ActionDescriber for RenderedDescriber {
    fn describe(&self, pattern: &Pattern) -> String {
        format!("tier {} pattern: {}", pattern.tier, pattern.description)
    }
}
