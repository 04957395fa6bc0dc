//! Host message bus vocabulary and traits.
//!
//! Messages travel as `{ "type": "SCREAMING_SNAKE", "data": {...} }`
//! envelopes. Inbound envelopes are parsed into [`BusRequest`]; the runtime
//! sends [`OutboundMessage`] values through a [`HostBus`].

mod envelope;
mod inbound;
mod outbound;
mod traits;

pub use envelope::*;
pub use inbound::*;
pub use outbound::*;
pub use traits::*;

/// Browser tab identifier.
pub type TabId = i64;
