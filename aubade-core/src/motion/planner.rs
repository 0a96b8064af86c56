//! Trapezoidal step planner
//!
//! Integer-only acceleration planner for a position-controlled stepper.
//! Speeds are tracked in milli-steps per second so low accelerations still
//! ramp smoothly at a 1 ms update rate.

/// Current motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Motor is stopped
    Stopped,
    /// Motor is accelerating toward the speed cap
    Accelerating,
    /// Motor is at the speed cap
    AtSpeed,
    /// Motor is braking for the target or a reversal
    Decelerating,
}

/// Position planner producing step pulses over time
#[derive(Debug, Clone)]
pub struct StepPlanner {
    position: i32,
    target: i32,
    /// Current speed magnitude (milli-steps/s)
    speed_msps: u32,
    /// Sign of travel while the speed is non-zero
    heading: i8,
    max_speed_msps: u32,
    /// Acceleration (milli-steps/s²)
    accel_msps2: u32,
    /// Speed reached one step after starting from rest
    min_speed_msps: u32,
    /// Progress toward the next step (milli-steps)
    step_accum: u32,
    state: MotionState,
}

impl StepPlanner {
    /// Create a planner at position zero
    pub fn new(accel_sps2: u16) -> Self {
        let mut planner = Self {
            position: 0,
            target: 0,
            speed_msps: 0,
            heading: 0,
            max_speed_msps: 0,
            accel_msps2: 0,
            min_speed_msps: 0,
            step_accum: 0,
            state: MotionState::Stopped,
        };
        planner.set_acceleration(accel_sps2);
        planner
    }

    /// Change the acceleration; zero disables ramping
    pub fn set_acceleration(&mut self, accel_sps2: u16) {
        self.accel_msps2 = accel_sps2 as u32 * 1000;
        self.update_min_speed();
    }

    /// Retarget the planner
    ///
    /// A move in progress brakes and reverses if the new target is behind it.
    pub fn set_target(&mut self, target: i32, max_speed_sps: u16) {
        self.target = target;
        self.max_speed_msps = max_speed_sps as u32 * 1000;
        self.update_min_speed();
    }

    /// Stop immediately at the current position
    pub fn halt(&mut self) {
        self.target = self.position;
        self.speed_msps = 0;
        self.heading = 0;
        self.step_accum = 0;
        self.state = MotionState::Stopped;
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn distance_to_go(&self) -> i64 {
        self.target as i64 - self.position as i64
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Current speed in whole steps/s
    pub fn speed_sps(&self) -> u32 {
        self.speed_msps / 1000
    }

    /// Stopped at the target
    pub fn is_idle(&self) -> bool {
        self.speed_msps == 0 && self.position == self.target
    }

    /// Advance the planner by `delta_ms`
    ///
    /// Returns the signed number of steps to issue; the planner position
    /// already includes them.
    pub fn update(&mut self, delta_ms: u32) -> i32 {
        let distance = self.distance_to_go();
        if distance == 0 {
            self.halt();
            return 0;
        }

        let wanted: i8 = if distance > 0 { 1 } else { -1 };
        if self.speed_msps == 0 {
            self.heading = wanted;
        }

        let dv = if self.accel_msps2 == 0 {
            u32::MAX
        } else {
            (self.accel_msps2 as u64 * delta_ms as u64 / 1000) as u32
        };

        if self.heading != wanted {
            // Brake before reversing
            self.speed_msps = self.speed_msps.saturating_sub(dv);
            self.state = MotionState::Decelerating;
        } else if distance.unsigned_abs() <= self.stopping_distance() {
            self.speed_msps = self.speed_msps.saturating_sub(dv).max(self.min_speed_msps);
            self.state = MotionState::Decelerating;
        } else if self.speed_msps > self.max_speed_msps {
            self.speed_msps = self.speed_msps.saturating_sub(dv).max(self.max_speed_msps);
            self.state = MotionState::Decelerating;
        } else if self.speed_msps < self.max_speed_msps {
            self.speed_msps = self
                .speed_msps
                .saturating_add(dv)
                .max(self.min_speed_msps)
                .min(self.max_speed_msps);
            self.state = MotionState::Accelerating;
        } else {
            self.state = MotionState::AtSpeed;
        }

        if self.speed_msps == 0 {
            self.step_accum = 0;
            self.heading = 0;
            if self.max_speed_msps == 0 {
                self.state = MotionState::Stopped;
            }
            return 0;
        }

        let progress = self.speed_msps as u64 * delta_ms as u64 / 1000 + self.step_accum as u64;
        let mut steps = progress / 1000;
        self.step_accum = (progress % 1000) as u32;

        if self.heading == wanted && steps >= distance.unsigned_abs() {
            steps = distance.unsigned_abs();
            self.step_accum = 0;
        }

        let delta = self.heading as i64 * steps as i64;
        self.position = (self.position as i64 + delta) as i32;

        if self.position == self.target {
            self.speed_msps = 0;
            self.heading = 0;
            self.state = MotionState::Stopped;
        }

        delta as i32
    }

    /// Steps needed to brake from the current speed
    fn stopping_distance(&self) -> u64 {
        if self.accel_msps2 == 0 {
            return 0;
        }
        let v = self.speed_msps as u64;
        v * v / (2000 * self.accel_msps2 as u64)
    }

    fn update_min_speed(&mut self) {
        // v² = 2·a·d for a single step from rest
        let min = isqrt(2000 * self.accel_msps2 as u64) as u32;
        self.min_speed_msps = min.min(self.max_speed_msps);
    }
}

fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
