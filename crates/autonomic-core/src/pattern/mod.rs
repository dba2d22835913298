pub mod confidence;
pub mod equivalence;
pub mod pattern;
pub mod structure;

pub use self::pattern::{Pattern, PatternId, PatternStatus, RejectionReason};
pub use confidence::Confidence;
pub use equivalence::{CanonicalEquivalence, StructuralEquivalence};
pub use structure::StructuralDescription;
