//! Bridge UART receive task
//!
//! Receives frames from the network bridge and dispatches dashboard
//! commands, network time and heartbeats.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use aubade_core::remote::{self, Command};
use aubade_protocol::{BridgeMessage, ControllerMessage, FrameParser, PinWrite};

use crate::channels::{send_to_bridge, COMMAND_CHANNEL, HEARTBEAT_RECEIVED, TIME_SYNC};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Bridge RX task - receives and parses frames from the bridge
#[embassy_executor::task]
pub async fn bridge_rx_task(mut rx: BufferedUartRx) {
    info!("Bridge RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match BridgeMessage::from_frame(&frame) {
                            Ok(msg) => handle_bridge_message(msg),
                            Err(e) => warn!("Failed to parse bridge message: {:?}", e),
                        },
                        Ok(None) => {}
                        Err(e) => warn!("Frame parse error: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}

fn handle_bridge_message(msg: BridgeMessage) {
    match msg {
        BridgeMessage::Ping => {
            trace!("PING received");
            HEARTBEAT_RECEIVED.signal(());
            send_to_bridge(ControllerMessage::Pong);
        }
        BridgeMessage::Time { epoch_s } => {
            TIME_SYNC.signal(epoch_s);
        }
        BridgeMessage::TimeUnavailable => {
            warn!("Failed to obtain time");
        }
        BridgeMessage::PinWrite(write) => handle_pin_write(write),
    }
}

fn handle_pin_write(write: PinWrite) {
    debug!("V{} <- {:?}", write.pin.number(), write.value);

    match remote::decode(&write) {
        Ok(Some(command)) => {
            // Trigger buttons stay pressed on the dashboard until reset
            if matches!(
                command,
                Command::OpenFull | Command::CloseFull | Command::EmergencyStop
            ) {
                send_to_bridge(ControllerMessage::PinUpdate(PinWrite::int(write.pin, 0)));
            }

            if COMMAND_CHANNEL.try_send(command).is_err() {
                warn!("Command channel full, dropping {:?}", command);
            }
        }
        Ok(None) => trace!("V{} carries no command", write.pin.number()),
        Err(e) => warn!("Rejected dashboard input: {:?}", e),
    }
}
