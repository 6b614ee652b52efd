//! Handlers for frames arriving from the flight controller.

mod command;
mod rc;
mod readiness;
mod telemetry;

pub use command::CommandHandler;
pub use rc::{normalize, RcHandler};
pub use readiness::{ReadinessHandler, RemoteReady};
pub use telemetry::{GpsHandler, PingHandler};
