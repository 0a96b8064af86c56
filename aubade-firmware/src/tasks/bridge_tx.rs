//! Bridge UART transmit task
//!
//! Sends heartbeat responses, time requests and status reports to the
//! network bridge.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use aubade_protocol::frame::MAX_FRAME_SIZE;
use aubade_protocol::ControllerMessage;

use crate::channels::OUTBOUND;

/// Bridge TX task - sends queued messages to the bridge
#[embassy_executor::task]
pub async fn bridge_tx_task(mut tx: BufferedUartTx) {
    info!("Bridge TX task started");

    loop {
        let msg = OUTBOUND.receive().await;
        send(&mut tx, &msg).await;
    }
}

async fn send(tx: &mut BufferedUartTx, msg: &ControllerMessage) {
    let frame = match msg.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to encode {:?}: {:?}", msg, e);
            return;
        }
    };

    let mut buf = [0u8; MAX_FRAME_SIZE];
    match frame.encode(&mut buf) {
        Ok(len) => {
            if let Err(e) = tx.write_all(&buf[..len]).await {
                warn!("UART write error: {:?}", e);
            } else {
                trace!("TX: {:?}", msg);
            }
        }
        Err(e) => warn!("Failed to encode frame: {:?}", e),
    }
}
