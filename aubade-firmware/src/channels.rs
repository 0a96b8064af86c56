//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicI32, Ordering};

use aubade_core::motion::MotorCommand;
use aubade_core::remote::Command;
use aubade_protocol::ControllerMessage;

/// Channel capacity for dashboard commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for frames queued toward the bridge
const OUTBOUND_CHANNEL_SIZE: usize = 8;

/// Decoded dashboard commands from the bridge
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Messages waiting to be sent to the bridge
pub static OUTBOUND: Channel<CriticalSectionRawMutex, ControllerMessage, OUTBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Motor command signal (updated by controller)
pub static MOTOR_CMD: Signal<CriticalSectionRawMutex, MotorCommand> = Signal::new();

/// Network time from the bridge, Unix epoch seconds
pub static TIME_SYNC: Signal<CriticalSectionRawMutex, u32> = Signal::new();

/// Signal that a heartbeat (PING) was received from the bridge
pub static HEARTBEAT_RECEIVED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Absolute motor position in steps (written by the stepper task)
static MOTOR_POSITION: AtomicI32 = AtomicI32::new(0);

pub fn motor_position() -> i32 {
    MOTOR_POSITION.load(Ordering::Relaxed)
}

pub fn set_motor_position(position: i32) {
    MOTOR_POSITION.store(position, Ordering::Relaxed);
}

/// Queue a message for the bridge, dropping it if the queue is full
pub fn send_to_bridge(msg: ControllerMessage) {
    if OUTBOUND.try_send(msg).is_err() {
        defmt::warn!("Outbound queue full, dropping {:?}", msg);
    }
}
