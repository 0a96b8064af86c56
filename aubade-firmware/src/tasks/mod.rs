//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod bridge_rx;
pub mod bridge_tx;
pub mod controller;
pub mod stepper;
pub mod tick;

pub use bridge_rx::bridge_rx_task;
pub use bridge_tx::bridge_tx_task;
pub use controller::controller_task;
pub use stepper::stepper_task;
pub use tick::tick_task;
