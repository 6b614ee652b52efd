//! Serial-to-TCP telemetry gateway.
//!
//! A [`Gateway`] owns one serial link to a flight controller and a TCP
//! listener. Everything the flight controller sends is decoded, acted on
//! locally (gimbal and camera control, command acknowledgements) and then
//! repeated verbatim to every connected client. Only the oldest connected
//! client may write back to the serial link.
//!
//! The loop is single threaded and waits on one `poll(2)` call. A separate
//! heartbeat thread shares the serial writer through a mutex.

pub mod actuation;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod handlers;
pub mod heartbeat;
pub mod link;
pub mod pidfile;
pub mod queue;
pub mod registry;
pub mod session;
pub mod shutdown;
pub mod siyi;
pub mod tunes;

pub use actuation::{Backend, Camera, Device, DeviceState, Gimbal, NullDevice};
pub use config::{
    AxisConfig, DeviceConfig, DeviceKind, GatewayConfig, HeartbeatConfig, RcConfig,
    SerialSection, ServerSection,
};
pub use dispatch::{DispatchTable, Handler, HandlerContext};
pub use error::{GatewayError, Result};
pub use handlers::RemoteReady;
pub use pidfile::{PidFile, DEFAULT_PID_FILE};
pub use queue::{CommandAccumulator, CommandRecord, COMMAND_RECORD_SIZE, PLAY_TUNE};
pub use registry::{ArbitrationPolicy, ClientId, ClientRegistry};
pub use session::Gateway;
pub use shutdown::{ShutdownCause, ShutdownHandle};
pub use siyi::SiyiGimbal;
