//! Device console sessions
//!
//! One session logs into a device, runs its command list, logs out and
//! hands back everything it received. The logic lives in the pure
//! [`SessionMachine`]; [`SessionRunner`] feeds it socket events and
//! deadlines and performs the actions it returns.

mod buffer;
mod machine;
mod plan;
mod runner;
mod state;

pub use buffer::CueBuffer;
pub use machine::SessionMachine;
pub use plan::SessionPlan;
pub use runner::{Connector, SessionRunner, TcpConnector, Transport};
pub use state::{Action, Event, Outgoing, SessionOutcome, SessionState};
