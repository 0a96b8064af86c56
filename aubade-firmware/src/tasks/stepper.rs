//! Stepper motor control task
//!
//! Receives motor commands from the controller and generates steps for
//! the ULN2003 coil driver from the trapezoidal planner.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Instant, Ticker};

use aubade_core::motion::{MotorCommand, StepPlanner, TravelConfig};
use aubade_core::traits::{Direction, StepperDriver};
use aubade_drivers::stepper::Uln2003;

use crate::channels::{set_motor_position, MOTOR_CMD};

/// Planner update interval (1ms)
const UPDATE_INTERVAL_MS: u64 = 1;

/// Stepper control task for the blind motor
#[embassy_executor::task]
pub async fn stepper_task(
    mut driver: Uln2003<Output<'static>>,
    travel: TravelConfig,
    release_when_idle: bool,
) {
    info!("Stepper task started");

    let mut planner = StepPlanner::new(travel.accel_sps2);
    set_motor_position(planner.position());

    let mut ticker = Ticker::every(Duration::from_millis(UPDATE_INTERVAL_MS));
    let mut last_update = Instant::now();

    loop {
        match select(MOTOR_CMD.wait(), ticker.next()).await {
            Either::First(MotorCommand::MoveTo {
                target,
                max_speed_sps,
            }) => {
                debug!(
                    "Move to {} at {} steps/s (from {})",
                    target,
                    max_speed_sps,
                    planner.position()
                );
                planner.set_target(target, max_speed_sps);
            }
            Either::First(MotorCommand::Halt) => {
                debug!("Motor halt at {}", planner.position());
                planner.halt();
            }
            Either::Second(_) => {}
        }

        let now = Instant::now();
        let delta_ms = (now - last_update).as_millis() as u32;
        last_update = now;

        let steps = planner.update(delta_ms);
        if let Some(direction) = Direction::from_delta(steps) {
            for _ in 0..steps.unsigned_abs() {
                if let Err(e) = driver.step(direction) {
                    error!("Coil drive failed: {:?}", e);
                    break;
                }
            }
            set_motor_position(planner.position());
        }

        if release_when_idle && planner.is_idle() && driver.is_energized() {
            trace!("Releasing coils at {}", planner.position());
            if let Err(e) = driver.release() {
                error!("Coil release failed: {:?}", e);
            }
        }
    }
}
