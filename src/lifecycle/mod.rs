//! Process lifecycle signals

mod signals;

pub use signals::{LifecycleSignal, Signals};
