pub mod context;
pub mod observation;

pub use self::context::{Context, ContextStatus, StateTransition};
pub use observation::{Observation, ObservationValue, ValueKind};
