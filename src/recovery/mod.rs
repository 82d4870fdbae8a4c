//! Automatic reconnection after meeting disconnects

pub mod watchdog;

pub use watchdog::{
    backoff_for, ReconnectHandler, RecoveryState, RecoveryStatus, RecoveryWatchdog,
};
