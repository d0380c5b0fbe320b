//! Input Capture and Intent Mapping
//!
//! Key events from the platform are reduced to `(player, direction, pressed)`
//! triples and stored as eight flags in an owned `InputState`. The simulation
//! reads a per-player `IntentVector` from it once per tick.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;

// =============================================================================
// PLAYER SLOT
// =============================================================================

/// One of the two same-screen players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerSlot {
    /// Player 1 (arrow keys by default)
    One = 0,
    /// Player 2 (W/A/S/D by default)
    Two = 1,
}

impl PlayerSlot {
    /// Both slots in evaluation order.
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    /// Array index of this slot.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The opposing slot.
    #[inline]
    pub const fn other(self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerSlot::One => write!(f, "player 1"),
            PlayerSlot::Two => write!(f, "player 2"),
        }
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// A discrete directional control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Toward row 0 (y - 1)
    Up = 0,
    /// Toward the last row (y + 1)
    Down = 1,
    /// Toward column 0 (x - 1)
    Left = 2,
    /// Toward the last column (x + 1)
    Right = 3,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Flag bit for this direction within one player's nibble.
    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Unit step as `(dx, dy)`.
    #[inline]
    pub const fn unit(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

// =============================================================================
// INTENT VECTOR
// =============================================================================

/// Signed per-axis direction a player is requesting this tick.
///
/// Each component is in `{-1, 0, +1}`. Diagonals are not normalized, so a
/// diagonal intent covers more ground per tick than an axial one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentVector {
    /// -1 left, +1 right
    pub x: i8,
    /// -1 up, +1 down
    pub y: i8,
}

impl IntentVector {
    /// No intent.
    pub const IDLE: Self = Self { x: 0, y: 0 };

    /// Create an intent, clamping each component to `{-1, 0, +1}`.
    #[inline]
    pub const fn new(x: i8, y: i8) -> Self {
        Self {
            x: if x > 0 { 1 } else if x < 0 { -1 } else { 0 },
            y: if y > 0 { 1 } else if y < 0 { -1 } else { 0 },
        }
    }

    /// True when neither axis has intent.
    #[inline]
    pub fn is_idle(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Intent as an unscaled maze-space vector.
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

// =============================================================================
// INPUT EVENT
// =============================================================================

/// A single press or release, already mapped to a player and direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEvent {
    /// Which player's control set
    pub player: PlayerSlot,
    /// Which control
    pub direction: Direction,
    /// Pressed (true) or released (false)
    pub pressed: bool,
}

impl InputEvent {
    /// A press event.
    pub const fn press(player: PlayerSlot, direction: Direction) -> Self {
        Self { player, direction, pressed: true }
    }

    /// A release event.
    pub const fn release(player: PlayerSlot, direction: Direction) -> Self {
        Self { player, direction, pressed: false }
    }
}

// =============================================================================
// INPUT STATE
// =============================================================================

/// Pressed/released state of both players' directional controls.
///
/// Packed as one nibble per player. Opposing directions may both be held;
/// they cancel in `current_intent`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputState {
    flags: [u8; 2],
}

impl InputState {
    /// Create with nothing pressed.
    pub const fn new() -> Self {
        Self { flags: [0; 2] }
    }

    /// Overwrite one flag. Last write wins; repeating a write is a no-op.
    #[inline]
    pub fn set_direction(&mut self, player: PlayerSlot, direction: Direction, pressed: bool) {
        let flags = &mut self.flags[player.index()];
        if pressed {
            *flags |= direction.bit();
        } else {
            *flags &= !direction.bit();
        }
    }

    /// Apply a mapped key event.
    #[inline]
    pub fn apply(&mut self, event: InputEvent) {
        self.set_direction(event.player, event.direction, event.pressed);
    }

    /// Check a single flag.
    #[inline]
    pub fn is_pressed(&self, player: PlayerSlot, direction: Direction) -> bool {
        self.flags[player.index()] & direction.bit() != 0
    }

    /// Check whether any of a player's controls is held.
    #[inline]
    pub fn any_pressed(&self, player: PlayerSlot) -> bool {
        self.flags[player.index()] != 0
    }

    /// Signed axis sums of a player's held controls.
    pub fn current_intent(&self, player: PlayerSlot) -> IntentVector {
        let mut x = 0i8;
        let mut y = 0i8;
        for direction in Direction::ALL {
            if self.is_pressed(player, direction) {
                let (dx, dy) = direction.unit();
                x += dx;
                y += dy;
            }
        }
        IntentVector::new(x, y)
    }

    /// Release every control of both players.
    pub fn release_all(&mut self) {
        self.flags = [0; 2];
    }
}

// =============================================================================
// KEY MAP
// =============================================================================

/// Maps platform key symbols to player controls.
///
/// Generic over the key type so the core has no keyboard layout of its own.
#[derive(Clone, Debug)]
pub struct KeyMap<K: Ord> {
    bindings: BTreeMap<K, (PlayerSlot, Direction)>,
}

impl<K: Ord> Default for KeyMap<K> {
    fn default() -> Self {
        Self { bindings: BTreeMap::new() }
    }
}

impl<K: Ord> KeyMap<K> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key, replacing any previous binding of the same key.
    pub fn bind(&mut self, key: K, player: PlayerSlot, direction: Direction) -> &mut Self {
        self.bindings.insert(key, (player, direction));
        self
    }

    /// Bind four keys to one player's up/down/left/right.
    pub fn bind_player(&mut self, player: PlayerSlot, [up, down, left, right]: [K; 4]) -> &mut Self {
        self.bind(up, player, Direction::Up)
            .bind(down, player, Direction::Down)
            .bind(left, player, Direction::Left)
            .bind(right, player, Direction::Right)
    }

    /// Translate a key transition. Unbound keys yield `None`.
    pub fn translate(&self, key: &K, pressed: bool) -> Option<InputEvent> {
        self.bindings
            .get(key)
            .map(|&(player, direction)| InputEvent { player, direction, pressed })
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_direction_last_write_wins() {
        let mut input = InputState::new();
        input.set_direction(PlayerSlot::One, Direction::Left, true);
        input.set_direction(PlayerSlot::One, Direction::Left, true);
        assert!(input.is_pressed(PlayerSlot::One, Direction::Left));
        assert!(!input.is_pressed(PlayerSlot::Two, Direction::Left));

        input.set_direction(PlayerSlot::One, Direction::Left, false);
        input.set_direction(PlayerSlot::One, Direction::Left, false);
        assert!(!input.is_pressed(PlayerSlot::One, Direction::Left));
        assert_eq!(input, InputState::new());
    }

    #[test]
    fn test_intent_axis_sums() {
        let mut input = InputState::new();
        input.set_direction(PlayerSlot::Two, Direction::Right, true);
        input.set_direction(PlayerSlot::Two, Direction::Up, true);
        assert_eq!(input.current_intent(PlayerSlot::Two), IntentVector::new(1, -1));
        assert!(input.current_intent(PlayerSlot::One).is_idle());
    }

    #[test]
    fn test_opposing_directions_cancel() {
        let mut input = InputState::new();
        input.set_direction(PlayerSlot::One, Direction::Left, true);
        input.set_direction(PlayerSlot::One, Direction::Right, true);
        input.set_direction(PlayerSlot::One, Direction::Down, true);
        assert_eq!(input.current_intent(PlayerSlot::One), IntentVector::new(0, 1));
        assert!(input.any_pressed(PlayerSlot::One));
    }

    #[test]
    fn test_press_release_within_one_tick() {
        let mut input = InputState::new();
        input.apply(InputEvent::press(PlayerSlot::One, Direction::Up));
        input.apply(InputEvent::release(PlayerSlot::One, Direction::Up));
        assert_eq!(input.current_intent(PlayerSlot::One).y, 0);
        assert!(!input.any_pressed(PlayerSlot::One));
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        for player in PlayerSlot::ALL {
            for direction in Direction::ALL {
                input.set_direction(player, direction, true);
            }
        }
        input.release_all();
        assert!(!input.any_pressed(PlayerSlot::One));
        assert!(!input.any_pressed(PlayerSlot::Two));
    }

    #[test]
    fn test_key_map_translate() {
        let mut keys = KeyMap::new();
        keys.bind_player(PlayerSlot::One, ["up", "down", "left", "right"])
            .bind_player(PlayerSlot::Two, ["w", "s", "a", "d"]);
        assert_eq!(keys.len(), 8);

        assert_eq!(
            keys.translate(&"a", true),
            Some(InputEvent::press(PlayerSlot::Two, Direction::Left))
        );
        assert_eq!(
            keys.translate(&"down", false),
            Some(InputEvent::release(PlayerSlot::One, Direction::Down))
        );
        assert_eq!(keys.translate(&"space", true), None);
    }

    #[test]
    fn test_intent_clamps() {
        assert_eq!(IntentVector::new(5, -9), IntentVector::new(1, -1));
        assert_eq!(IntentVector::new(0, 0), IntentVector::IDLE);
    }

    proptest! {
        #[test]
        fn prop_opposing_axis_is_zero(nibble in 0u8..16, player_two in any::<bool>()) {
            let player = if player_two { PlayerSlot::Two } else { PlayerSlot::One };
            let mut input = InputState::new();
            for direction in Direction::ALL {
                input.set_direction(player, direction, nibble & (1 << direction as u8) != 0);
            }
            let intent = input.current_intent(player);
            if input.is_pressed(player, Direction::Left) && input.is_pressed(player, Direction::Right) {
                prop_assert_eq!(intent.x, 0);
            }
            if input.is_pressed(player, Direction::Up) && input.is_pressed(player, Direction::Down) {
                prop_assert_eq!(intent.y, 0);
            }
            prop_assert!((-1..=1).contains(&intent.x));
            prop_assert!((-1..=1).contains(&intent.y));
            prop_assert!(input.current_intent(player.other()).is_idle());
        }
    }
}
