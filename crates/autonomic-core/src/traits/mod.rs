mod applier;
mod pattern_store;

pub use applier::{ActionApplier, ActionDescriber, RenderedDescriber};
pub use pattern_store::IPatternStore;
