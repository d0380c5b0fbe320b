//! Match State
//!
//! Two-player outcome tracking. `InProgress` moves to exactly one terminal
//! outcome and never back.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::game::entity::Entity;
use crate::game::input::PlayerSlot;

/// Outcome of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    /// Nobody has reached a goal yet
    #[default]
    InProgress,
    /// Player 1 reached its goal first
    Player1Won,
    /// Player 2 reached its goal first
    Player2Won,
}

impl MatchState {
    /// Evaluate the goal predicates and record a winner.
    ///
    /// Player 1 is checked first; when both have arrived in the same check,
    /// player 2 is never queried and player 1 wins. A terminal state is
    /// returned unchanged without querying either entity.
    pub fn check<E: Entity>(&mut self, player1: &E, player2: &E) -> MatchState {
        if self.is_terminal() {
            return *self;
        }

        if player1.has_reached_goal() {
            *self = MatchState::Player1Won;
        } else if player2.has_reached_goal() {
            *self = MatchState::Player2Won;
        }
        *self
    }

    /// Terminal state won by `player`.
    pub const fn won_by(player: PlayerSlot) -> Self {
        match player {
            PlayerSlot::One => MatchState::Player1Won,
            PlayerSlot::Two => MatchState::Player2Won,
        }
    }

    /// True while the match is still running.
    #[inline]
    pub fn is_in_progress(self) -> bool {
        matches!(self, MatchState::InProgress)
    }

    /// True once a winner exists.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_in_progress()
    }

    /// The winning player, if any.
    pub fn winner(self) -> Option<PlayerSlot> {
        match self {
            MatchState::InProgress => None,
            MatchState::Player1Won => Some(PlayerSlot::One),
            MatchState::Player2Won => Some(PlayerSlot::Two),
        }
    }

    /// The losing player, if any.
    pub fn loser(self) -> Option<PlayerSlot> {
        self.winner().map(PlayerSlot::other)
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            None => write!(f, "in progress"),
            Some(player) => write!(f, "{player} won"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use crate::core::vec2::Vec2;

    /// Fixed goal predicate that counts how often it is queried.
    struct Goal {
        reached: bool,
        queries: Cell<u32>,
    }

    impl Goal {
        fn new(reached: bool) -> Self {
            Self { reached, queries: Cell::new(0) }
        }
    }

    impl Entity for Goal {
        fn attempt_move(&mut self, _dx: f32, _dy: f32) -> bool {
            false
        }

        fn has_reached_goal(&self) -> bool {
            self.queries.set(self.queries.get() + 1);
            self.reached
        }

        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
    }

    #[test]
    fn test_no_goal_stays_in_progress() {
        let mut state = MatchState::default();
        assert_eq!(state.check(&Goal::new(false), &Goal::new(false)), MatchState::InProgress);
        assert!(state.is_in_progress());
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_player_two_wins_alone() {
        let mut state = MatchState::InProgress;
        assert_eq!(state.check(&Goal::new(false), &Goal::new(true)), MatchState::Player2Won);
        assert_eq!(state.winner(), Some(PlayerSlot::Two));
        assert_eq!(state.loser(), Some(PlayerSlot::One));
    }

    #[test]
    fn test_simultaneous_arrival_goes_to_player_one() {
        let p1 = Goal::new(true);
        let p2 = Goal::new(true);
        let mut state = MatchState::InProgress;

        assert_eq!(state.check(&p1, &p2), MatchState::Player1Won);
        assert_eq!(p1.queries.get(), 1);
        assert_eq!(p2.queries.get(), 0, "player 2 is not evaluated once player 1 has won");
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut state = MatchState::won_by(PlayerSlot::Two);
        let p1 = Goal::new(true);
        let p2 = Goal::new(false);

        assert_eq!(state.check(&p1, &p2), MatchState::Player2Won);
        assert_eq!(p1.queries.get(), 0);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(MatchState::InProgress.to_string(), "in progress");
        assert_eq!(MatchState::Player1Won.to_string(), "player 1 won");
    }
}
