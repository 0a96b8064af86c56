//! Main controller task
//!
//! Owns the blind controller. Receives dashboard commands, ticks and
//! network time, forwards motor commands to the stepper task and reports
//! status to the bridge.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_time::Instant;

use aubade_core::clock::ClockError;
use aubade_core::config::BlindConfig;
use aubade_core::controller::{BlindController, ControllerOutput};
use aubade_core::motion::MoveResult;
use aubade_protocol::ControllerMessage;

use crate::channels::{
    motor_position, send_to_bridge, COMMAND_CHANNEL, HEARTBEAT_RECEIVED, MOTOR_CMD, TIME_SYNC,
};
use crate::tasks::tick::TICK_SIGNAL;

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(config: &'static BlindConfig) {
    info!("Controller task started");

    let mut controller = BlindController::new(config);
    let check_interval_ms = config.schedule.check_interval_ms as u64;
    let status_interval_ms = config.bridge.status_interval_ms as u64;

    info!(
        "Schedule: open {:02}:{:02}, close {:02}:{:02}, gradual start {:02}:{:02}",
        config.schedule.schedule.open.hour(),
        config.schedule.schedule.open.minute(),
        config.schedule.schedule.close.hour(),
        config.schedule.schedule.close.minute(),
        controller.gradual_start().hour(),
        controller.gradual_start().minute()
    );

    let mut last_tick_ms = now_ms();
    let mut last_check_ms: Option<u64> = None;
    let mut last_status_ms = 0u64;
    let mut link_healthy = true;

    loop {
        let previous_state = controller.state();

        match select3(COMMAND_CHANNEL.receive(), TICK_SIGNAL.wait(), TIME_SYNC.wait()).await {
            Either3::First(command) => {
                info!("Command: {:?}", command);
                controller.handle_command(command, motor_position(), now_ms());
            }

            Either3::Second(now) => {
                if HEARTBEAT_RECEIVED.signaled() {
                    HEARTBEAT_RECEIVED.reset();
                    controller.heartbeat_received();
                }
                controller.update_time(now.saturating_sub(last_tick_ms) as u32);
                last_tick_ms = now;

                let healthy = controller.is_link_healthy();
                if healthy != link_healthy {
                    if healthy {
                        info!("Bridge link restored");
                    } else {
                        warn!("Bridge link lost, schedule continues on local clock");
                    }
                    link_healthy = healthy;
                }

                if controller.time_request_due(now) {
                    debug!("Requesting network time");
                    send_to_bridge(ControllerMessage::TimeRequest);
                }

                if last_check_ms.map_or(true, |t| now.saturating_sub(t) >= check_interval_ms) {
                    last_check_ms = Some(now);
                    schedule_check(&mut controller, now);
                }

                if now.saturating_sub(last_status_ms) >= status_interval_ms {
                    last_status_ms = now;
                    send_to_bridge(ControllerMessage::Status(
                        controller.status_report(motor_position()),
                    ));
                }
            }

            Either3::Third(epoch_s) => {
                info!("Network time synced: {}", epoch_s);
                controller.sync_time(epoch_s, now_ms());
            }
        }

        let output = controller.poll(now_ms(), motor_position());
        apply_output(output);

        let state = controller.state();
        if state != previous_state {
            info!("State: {:?} -> {:?}", previous_state, state);
        }
    }
}

/// Evaluate the schedule and log the status block
fn schedule_check(controller: &mut BlindController, now: u64) {
    let actions = match controller.schedule_tick(now) {
        Ok(actions) => actions,
        Err(ClockError::NotSynced) => {
            warn!("Failed to obtain time, retrying next check");
            return;
        }
    };

    for action in &actions {
        info!("Schedule: {:?}", action);
    }

    if let Ok(time) = controller.local_time(now) {
        let flags = controller.flags();
        let gradual = controller.gradual_start();
        info!(
            "Time {:02}:{:02} | opened={} closed={} gradual={} | position={} | gradual start {:02}:{:02}",
            time.hour(),
            time.minute(),
            flags.opened_today,
            flags.closed_today,
            flags.gradual_started,
            motor_position(),
            gradual.hour(),
            gradual.minute()
        );
    }
}

fn apply_output(output: ControllerOutput) {
    if let Some(command) = output.command {
        debug!("Motor command: {:?}", command);
        MOTOR_CMD.signal(command);
    }

    for outcome in &output.outcomes {
        match outcome.result {
            MoveResult::TimedOut => warn!(
                "{:?} timed out at {} after {} ms",
                outcome.kind, outcome.position, outcome.elapsed_ms
            ),
            MoveResult::Reached => info!(
                "{:?} reached {} in {} ms",
                outcome.kind, outcome.position, outcome.elapsed_ms
            ),
            result => info!(
                "{:?} ended ({:?}) at {}",
                outcome.kind, result, outcome.position
            ),
        }
    }
}
