//! Conversation memory implementations for Council.

pub mod noop;
pub mod rolling;

pub use noop::NoopMemory;
pub use rolling::RollingMemory;
