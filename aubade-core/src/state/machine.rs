//! State machine definition

use aubade_protocol::ReportedState;

use super::events::Event;

/// Direction of a hold-to-run manual move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManualDirection {
    /// Toward the open position
    Up,
    /// Toward the closed position
    Down,
}

/// Kinds of move the blind can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveKind {
    GradualOpen,
    FullOpen,
    FullClose,
    Manual(ManualDirection),
}

/// Blind states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Motor at rest
    Idle,
    /// Partial pre-open in progress
    GradualOpen,
    /// Moving to the full-open position
    FullOpen,
    /// Moving to the closed position
    FullClose,
    /// Hold-to-run move while a dashboard button is held
    Manual(ManualDirection),
    /// Motor halted; cleared once the stop has been observed
    EmergencyStop,
}

impl From<MoveKind> for State {
    fn from(kind: MoveKind) -> Self {
        match kind {
            MoveKind::GradualOpen => State::GradualOpen,
            MoveKind::FullOpen => State::FullOpen,
            MoveKind::FullClose => State::FullClose,
            MoveKind::Manual(direction) => State::Manual(direction),
        }
    }
}

impl State {
    /// Check if a move is in progress
    pub fn is_moving(&self) -> bool {
        matches!(
            self,
            State::GradualOpen | State::FullOpen | State::FullClose | State::Manual(_)
        )
    }

    /// Check if a manual move is in progress
    pub fn is_manual(&self) -> bool {
        matches!(self, State::Manual(_))
    }

    /// State as shown on the dashboard
    pub fn reported(&self) -> ReportedState {
        match self {
            State::Idle => ReportedState::Idle,
            State::GradualOpen => ReportedState::GradualOpen,
            State::FullOpen => ReportedState::FullOpen,
            State::FullClose => ReportedState::FullClose,
            State::Manual(ManualDirection::Up) => ReportedState::ManualUp,
            State::Manual(ManualDirection::Down) => ReportedState::ManualDown,
            State::EmergencyStop => ReportedState::EmergencyStop,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Emergency stop preempts everything
            (_, EmergencyStopRequested) => EmergencyStop,
            (EmergencyStop, StopObserved) => Idle,
            (EmergencyStop, _) => EmergencyStop,

            // Manual override preempts any move
            (Manual(current), MoveStarted(MoveKind::Manual(direction))) if current == direction => {
                self
            }
            (_, MoveStarted(MoveKind::Manual(direction))) => Manual(direction),

            // Scheduled and remote moves only start from rest
            (Idle, MoveStarted(kind)) => kind.into(),

            // Any move ends in Idle, whatever the reason
            (state, MoveEnded) if state.is_moving() => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_to_move() {
        assert_eq!(
            State::Idle.transition(Event::MoveStarted(MoveKind::FullOpen)),
            State::FullOpen
        );
        assert_eq!(
            State::Idle.transition(Event::MoveStarted(MoveKind::GradualOpen)),
            State::GradualOpen
        );
        assert_eq!(
            State::Idle.transition(Event::MoveStarted(MoveKind::FullClose)),
            State::FullClose
        );
    }

    #[test]
    fn test_move_does_not_start_over_another() {
        let state = State::FullOpen;
        assert_eq!(
            state.transition(Event::MoveStarted(MoveKind::FullClose)),
            State::FullOpen
        );
    }

    #[test]
    fn test_manual_preempts_move() {
        let states = [State::Idle, State::GradualOpen, State::FullOpen, State::FullClose];
        for state in states {
            let next = state.transition(Event::MoveStarted(MoveKind::Manual(ManualDirection::Down)));
            assert_eq!(next, State::Manual(ManualDirection::Down));
        }

        let up = State::Manual(ManualDirection::Up);
        assert_eq!(
            up.transition(Event::MoveStarted(MoveKind::Manual(ManualDirection::Down))),
            State::Manual(ManualDirection::Down)
        );
    }

    #[test]
    fn test_emergency_stop_from_any_state() {
        let states = [
            State::Idle,
            State::GradualOpen,
            State::FullOpen,
            State::FullClose,
            State::Manual(ManualDirection::Up),
        ];

        for state in states {
            assert_eq!(
                state.transition(Event::EmergencyStopRequested),
                State::EmergencyStop
            );
        }
    }

    #[test]
    fn test_emergency_stop_holds_until_observed() {
        let stopped = State::EmergencyStop;
        assert_eq!(
            stopped.transition(Event::MoveStarted(MoveKind::FullOpen)),
            State::EmergencyStop
        );
        assert_eq!(
            stopped.transition(Event::MoveStarted(MoveKind::Manual(ManualDirection::Up))),
            State::EmergencyStop
        );
        assert_eq!(stopped.transition(Event::MoveEnded), State::EmergencyStop);
        assert_eq!(stopped.transition(Event::StopObserved), State::Idle);
    }

    #[test]
    fn test_move_ended_returns_to_idle() {
        let states = [
            State::GradualOpen,
            State::FullOpen,
            State::FullClose,
            State::Manual(ManualDirection::Down),
        ];
        for state in states {
            assert_eq!(state.transition(Event::MoveEnded), State::Idle);
        }
        assert_eq!(State::Idle.transition(Event::MoveEnded), State::Idle);
    }

    #[test]
    fn test_reported_state() {
        assert_eq!(
            State::Manual(ManualDirection::Up).reported(),
            ReportedState::ManualUp
        );
        assert_eq!(State::EmergencyStop.reported(), ReportedState::EmergencyStop);
    }
}
