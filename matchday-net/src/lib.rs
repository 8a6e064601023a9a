//! Protocol layer for the matchday client.
//!
//! This crate provides the STOMP frame codec, the report-body grammar, the
//! receipt/subscription bookkeeping, and the live session with its receiver
//! thread.

pub mod client;
pub mod frame;
pub mod framing;
pub mod protocol;
pub mod registry;
pub mod report;

pub use client::{ConnectOptions, Session};
pub use frame::Frame;
pub use protocol::{Engine, SessionEvent};
pub use registry::{ReceiptOutcome, Registry};
pub use report::ReportBody;
