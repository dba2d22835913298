mod proposed_action;
mod store_stats;

pub use proposed_action::ProposedAction;
pub use store_stats::StoreStats;
