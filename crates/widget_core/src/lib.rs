//! Widget core: pure presentation state machine for user-triggered action chains.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, StepRequest, StepSource};
pub use msg::Msg;
pub use state::{ChainPhase, Generation, StepResult, WidgetState};
pub use update::update;
pub use view_model::{StepRowView, WidgetViewModel};
