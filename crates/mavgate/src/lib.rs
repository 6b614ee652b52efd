//! Flight controller gateway for companion computers.
//!
//! mavgate bridges a flight controller's serial link to TCP clients,
//! drives a camera gimbal from RC input, and answers camera commands.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial link, TCP listener and command FIFO
//! - [`frame`]: CRC-checked framing and payload codecs
//! - [`gateway`]: the serving session, arbitration and actuation

/// Re-export transport types.
pub mod transport {
    pub use mavgate_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mavgate_frame::*;
}

/// Re-export gateway types.
pub mod gateway {
    pub use mavgate_gateway::*;
}
