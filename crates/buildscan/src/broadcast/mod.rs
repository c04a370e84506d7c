//! Real-time event streaming for presentation code.

pub mod lifecycle;

pub use lifecycle::{LifecycleBroadcaster, LifecycleEvent};
