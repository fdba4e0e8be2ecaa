mod driver;
pub mod state;

pub use driver::{CommandChannel, LinkEvents};
pub use state::{Action, ChannelPhase, ChannelState, DrainOrder};
