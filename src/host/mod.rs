//! Stdio JSON host bridge: envelope contract, command router and line loop.

pub mod channel;
pub mod contract;
pub mod stdio;
