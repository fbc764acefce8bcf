//! Gamepad button edge tracking.
//!
//! Platforms report gamepads as a per-player bitmask of held buttons. The
//! tracker diffs successive masks into press and release events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Player slot a gamepad is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerIndex(pub u8);

/// Gamepad buttons, in platform bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamepadButton {
    /// Bottom face button.
    A,
    /// Right face button.
    B,
    /// Left face button.
    X,
    /// Top face button.
    Y,
    /// Left bumper.
    LeftShoulder,
    /// Right bumper.
    RightShoulder,
    /// Back or select.
    Back,
    /// Start or menu.
    Start,
    /// Left stick click.
    LeftStick,
    /// Right stick click.
    RightStick,
    /// D-pad up.
    DPadUp,
    /// D-pad down.
    DPadDown,
    /// D-pad left.
    DPadLeft,
    /// D-pad right.
    DPadRight,
}

impl GamepadButton {
    /// Every button, in bit order.
    pub const ALL: [Self; 14] = [
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::Back,
        Self::Start,
        Self::LeftStick,
        Self::RightStick,
        Self::DPadUp,
        Self::DPadDown,
        Self::DPadLeft,
        Self::DPadRight,
    ];

    /// Map a platform button index. Unmapped indices are logged and dropped.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        let button = usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied());
        if button.is_none() {
            tracing::warn!(index, "unmapped gamepad button index");
        }
        button
    }

    /// Platform bit index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    const fn bit(self) -> u32 {
        1 << self.index()
    }
}

/// Edge direction of a button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    /// Went down this frame.
    Pressed,
    /// Went up this frame.
    Released,
}

/// A gamepad button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GamepadEvent {
    /// Player whose pad changed.
    pub player: PlayerIndex,
    /// Button that changed.
    pub button: GamepadButton,
    /// Direction of the change.
    pub state: ButtonState,
}

/// Per-player held-button masks.
#[derive(Debug, Clone, Default)]
pub struct GamepadTracker {
    held: BTreeMap<PlayerIndex, u32>,
}

impl GamepadTracker {
    /// Create a tracker with no pads connected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the raw held-button mask for a player.
    ///
    /// Bits with no [`GamepadButton`] mapping are logged and ignored.
    pub fn update_mask(&mut self, player: PlayerIndex, mask: u32) -> Vec<GamepadEvent> {
        let mut known = 0;
        for index in (0..u32::BITS).filter(|i| mask & (1 << i) != 0) {
            if let Some(button) = GamepadButton::from_index(index) {
                known |= button.bit();
            }
        }
        self.apply(player, known)
    }

    /// Feed the set of held buttons for a player.
    pub fn update(&mut self, player: PlayerIndex, held: &[GamepadButton]) -> Vec<GamepadEvent> {
        let mask = held.iter().fold(0, |mask, button| mask | button.bit());
        self.apply(player, mask)
    }

    /// Release every held button of a disconnected pad.
    pub fn disconnect(&mut self, player: PlayerIndex) -> Vec<GamepadEvent> {
        let events = self.apply(player, 0);
        self.held.remove(&player);
        if !events.is_empty() {
            tracing::debug!(player = player.0, released = events.len(), "gamepad disconnected");
        }
        events
    }

    /// Check if a button is held.
    #[must_use]
    pub fn is_held(&self, player: PlayerIndex, button: GamepadButton) -> bool {
        self.held
            .get(&player)
            .is_some_and(|mask| mask & button.bit() != 0)
    }

    /// Players with at least one held button.
    pub fn active_players(&self) -> impl Iterator<Item = PlayerIndex> + '_ {
        self.held
            .iter()
            .filter(|(_, &mask)| mask != 0)
            .map(|(&player, _)| player)
    }

    fn apply(&mut self, player: PlayerIndex, mask: u32) -> Vec<GamepadEvent> {
        let previous = self.held.insert(player, mask).unwrap_or(0);
        let changed = previous ^ mask;
        GamepadButton::ALL
            .iter()
            .filter(|button| changed & button.bit() != 0)
            .map(|&button| GamepadEvent {
                player,
                button,
                state: if mask & button.bit() != 0 {
                    ButtonState::Pressed
                } else {
                    ButtonState::Released
                },
            })
            .collect()
    }
}
