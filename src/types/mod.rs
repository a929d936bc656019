//! Core type definitions using newtype patterns for type safety.
//!
//! A `Setpoint` can only be built from input that already passed the
//! instrument's limits, so the transport never sees an unchecked value.

mod port_id;
mod quantity;
mod record_id;
mod setpoint;

pub use port_id::PortId;
pub use quantity::{Limits, Quantity};
pub use record_id::{RecordId, RecordIdError};
pub use setpoint::Setpoint;
