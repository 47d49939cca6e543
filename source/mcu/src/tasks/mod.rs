pub mod commands;
pub mod control;
pub mod sampler;
pub mod scheduler;
pub mod stats;
pub mod telemetry;

pub use commands::CommandParser;
pub use control::{reload_ticks, Button, ChannelControl, ControlHandle};
pub use sampler::Sampler;
pub use scheduler::Supervisor;
pub use stats::{Statistics, StatsChannel, StatsCommands, StatsTx};
pub use telemetry::{Outbox, Transmitter, SOURCE_COUNT};
