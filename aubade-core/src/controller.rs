//! Blind controller
//!
//! Coordinates the daily schedule, the blind state machine, the move
//! executor and the safety monitor. The firmware owns one controller and
//! feeds it dashboard commands, schedule ticks and network time; motor
//! commands come back out of [`BlindController::poll`].
//!
//! Conflicts between inputs are settled here:
//! - scheduled and remote moves queue behind the active move
//! - manual override preempts any move; queued moves wait for the release
//! - emergency stop preempts everything and clears the queue

use heapless::{Deque, Vec};

use aubade_protocol::StatusReport;

use crate::clock::wall::DEFAULT_RETRY_INTERVAL_MS;
use crate::clock::{ClockError, TimeOfDay, WallClock};
use crate::config::BlindConfig;
use crate::motion::{ActiveMove, MotorCommand, MoveExecutor, MoveOutcome, MoveResult, TravelConfig};
use crate::remote::Command;
use crate::safety::{SafetyMonitor, SafetyStatus};
use crate::schedule::{DailyFlags, Schedule, ScheduleEvaluator, ScheduledAction, MAX_ACTIONS};
use crate::state::{Event, ManualDirection, MoveKind, State};

/// Moves waiting behind the active one
pub const MAX_PENDING: usize = 4;

/// Finished moves reported by a single poll
pub const MAX_OUTCOMES: usize = 8;

/// Result of a controller poll
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerOutput {
    /// New command for the motor task, if the motor must change course
    pub command: Option<MotorCommand>,
    /// Moves that ended since the last poll
    pub outcomes: Vec<MoveOutcome, MAX_OUTCOMES>,
}

/// Hold-to-run buttons currently held on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ManualButtons {
    up: bool,
    down: bool,
}

impl ManualButtons {
    /// Down wins when both are held
    fn direction(&self) -> Option<ManualDirection> {
        if self.down {
            Some(ManualDirection::Down)
        } else if self.up {
            Some(ManualDirection::Up)
        } else {
            None
        }
    }
}

/// Blind controller
pub struct BlindController {
    state: State,
    evaluator: ScheduleEvaluator,
    clock: WallClock,
    travel: TravelConfig,
    executor: MoveExecutor,
    safety: SafetyMonitor,
    pending: Deque<MoveKind, MAX_PENDING>,
    buttons: ManualButtons,
    command: Option<MotorCommand>,
    outcomes: Vec<MoveOutcome, MAX_OUTCOMES>,
}

impl BlindController {
    pub fn new(config: &BlindConfig) -> Self {
        let evaluator = ScheduleEvaluator::new(config.schedule.schedule)
            .with_gradual_lead(config.schedule.gradual_lead_min);
        let clock = WallClock::new(config.clock.utc_offset_s, config.clock.dst_offset_s)
            .with_intervals(config.clock.resync_interval_ms, DEFAULT_RETRY_INTERVAL_MS);

        Self {
            state: State::Idle,
            evaluator,
            clock,
            travel: config.travel,
            executor: MoveExecutor::new(config.travel.move_timeout_ms),
            safety: SafetyMonitor::new(config.bridge.heartbeat_timeout_ms),
            pending: Deque::new(),
            buttons: ManualButtons::default(),
            command: None,
            outcomes: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn flags(&self) -> DailyFlags {
        self.evaluator.flags()
    }

    pub fn schedule(&self) -> Schedule {
        self.evaluator.schedule()
    }

    pub fn gradual_start(&self) -> TimeOfDay {
        self.evaluator.gradual_start()
    }

    pub fn active_move(&self) -> Option<&ActiveMove> {
        self.executor.active()
    }

    pub fn pending_moves(&self) -> usize {
        self.pending.len()
    }

    pub fn local_time(&self, now_ms: u64) -> Result<TimeOfDay, ClockError> {
        self.clock.local_time(now_ms)
    }

    /// Apply a dashboard command
    ///
    /// Motor changes are collected and handed out by the next [`poll`].
    ///
    /// [`poll`]: BlindController::poll
    pub fn handle_command(&mut self, command: Command, position: i32, now_ms: u64) {
        match command {
            Command::Manual { direction, pressed } => {
                match direction {
                    ManualDirection::Up => self.buttons.up = pressed,
                    ManualDirection::Down => self.buttons.down = pressed,
                }
                self.apply_manual(position, now_ms);
            }
            Command::OpenFull => self.enqueue(MoveKind::FullOpen),
            Command::CloseFull => self.enqueue(MoveKind::FullClose),
            Command::EmergencyStop => self.emergency_stop(position, now_ms),
            Command::SetOpenTime(time) => self.evaluator.set_open_time(time),
            Command::SetCloseTime(time) => self.evaluator.set_close_time(time),
        }
    }

    /// Evaluate the schedule at the current wall clock time
    ///
    /// Triggered moves are queued. Fails without touching any state when
    /// network time has not arrived yet.
    pub fn schedule_tick(
        &mut self,
        now_ms: u64,
    ) -> Result<Vec<ScheduledAction, MAX_ACTIONS>, ClockError> {
        let now = self.clock.local_time(now_ms)?;
        let actions = self.evaluator.evaluate(now);

        for action in &actions {
            match action {
                ScheduledAction::GradualOpen => self.enqueue(MoveKind::GradualOpen),
                ScheduledAction::FullOpen => self.enqueue(MoveKind::FullOpen),
                ScheduledAction::FullClose => self.enqueue(MoveKind::FullClose),
                ScheduledAction::MidnightReset => {}
            }
        }

        Ok(actions)
    }

    /// Advance moves against the motor position
    ///
    /// Observes a pending emergency stop, ends finished or timed out moves
    /// and starts the next queued move once the blind is idle.
    pub fn poll(&mut self, now_ms: u64, position: i32) -> ControllerOutput {
        if self.safety.take_emergency_stop() {
            self.state = self.state.transition(Event::StopObserved);
        }

        if let Some(outcome) = self.executor.check(position, now_ms) {
            if outcome.result == MoveResult::TimedOut {
                self.command = Some(MotorCommand::Halt);
            }
            self.state = self.state.transition(Event::MoveEnded);
            self.record(outcome);
        }

        if self.state == State::Idle && !self.executor.is_busy() {
            if let Some(kind) = self.pending.pop_front() {
                self.start_move(kind, position, now_ms);
            }
        }

        ControllerOutput {
            command: self.command.take(),
            outcomes: core::mem::take(&mut self.outcomes),
        }
    }

    /// Record network time from the bridge
    pub fn sync_time(&mut self, epoch_s: u32, now_ms: u64) {
        self.clock.sync(epoch_s, now_ms);
    }

    /// Whether a time request should be sent to the bridge now
    pub fn time_request_due(&mut self, now_ms: u64) -> bool {
        self.clock.poll_resync(now_ms)
    }

    pub fn heartbeat_received(&mut self) {
        self.safety.heartbeat_received();
    }

    /// Advance link health tracking
    pub fn update_time(&mut self, delta_ms: u32) {
        self.safety.update_time(delta_ms);
    }

    pub fn safety_status(&self) -> SafetyStatus {
        self.safety.check()
    }

    pub fn is_link_healthy(&self) -> bool {
        self.safety.is_link_healthy()
    }

    /// Snapshot for the dashboard
    pub fn status_report(&self, position: i32) -> StatusReport {
        let flags = self.evaluator.flags();
        StatusReport {
            state: self.state.reported(),
            position,
            target: self.executor.active().map(|m| m.target),
            opened_today: flags.opened_today,
            closed_today: flags.closed_today,
            gradual_started: flags.gradual_started,
            clock_synced: self.clock.is_synced(),
        }
    }

    /// Queue a move, dropping the oldest when full
    fn enqueue(&mut self, kind: MoveKind) {
        let last = match self.pending.back() {
            Some(queued) => Some(*queued),
            None => self.executor.active().map(|active| active.kind),
        };
        if last == Some(kind) {
            return;
        }
        if self.pending.is_full() {
            self.pending.pop_front();
        }
        let _ = self.pending.push_back(kind);
    }

    fn start_move(&mut self, kind: MoveKind, position: i32, now_ms: u64) {
        let target = self.travel.target_for(kind, position);
        if let Some(preempted) = self.executor.start(kind, target, position, now_ms) {
            self.record(preempted);
        }
        self.state = self.state.transition(Event::MoveStarted(kind));
        self.command = Some(MotorCommand::MoveTo {
            target,
            max_speed_sps: self.travel.speed_for(kind),
        });
    }

    fn apply_manual(&mut self, position: i32, now_ms: u64) {
        if self.state == State::EmergencyStop {
            return;
        }

        match self.buttons.direction() {
            Some(direction) if self.state != State::Manual(direction) => {
                self.start_move(MoveKind::Manual(direction), position, now_ms);
            }
            Some(_) => {}
            None if self.state.is_manual() => {
                self.command = Some(MotorCommand::Halt);
                if let Some(outcome) = self.executor.finish(MoveResult::Released, position, now_ms) {
                    self.record(outcome);
                }
                self.state = self.state.transition(Event::MoveEnded);
            }
            None => {}
        }
    }

    fn emergency_stop(&mut self, position: i32, now_ms: u64) {
        self.state = self.state.transition(Event::EmergencyStopRequested);
        self.safety.request_emergency_stop();
        self.pending.clear();
        self.buttons = ManualButtons::default();
        self.command = Some(MotorCommand::Halt);
        if let Some(outcome) = self.executor.finish(MoveResult::Stopped, position, now_ms) {
            self.record(outcome);
        }
    }

    fn record(&mut self, outcome: MoveOutcome) {
        // Outcomes past capacity are dropped
        let _ = self.outcomes.push(outcome);
    }
}
