//! Coordination primitives shared by the bounded queues.

mod permit_gate;

pub use permit_gate::{AcquireFuture, PermitGate};
