//! Held-action input snapshot
//!
//! The driver records which logical actions are currently held; players read
//! the snapshot for their own control scheme at the start of each update.

/// Logical movement action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }
}

/// Keyboard layout a player is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlScheme {
    #[default]
    Wasd,
    Arrows,
}

impl ControlScheme {
    fn index(self) -> usize {
        match self {
            ControlScheme::Wasd => 0,
            ControlScheme::Arrows => 1,
        }
    }
}

/// Map a DOM `KeyboardEvent.code` to a scheme and action
pub fn key_binding(code: &str) -> Option<(ControlScheme, Action)> {
    use Action::*;
    use ControlScheme::*;

    let binding = match code {
        "KeyW" => (Wasd, Up),
        "KeyS" => (Wasd, Down),
        "KeyA" => (Wasd, Left),
        "KeyD" => (Wasd, Right),
        "ArrowUp" => (Arrows, Up),
        "ArrowDown" => (Arrows, Down),
        "ArrowLeft" => (Arrows, Left),
        "ArrowRight" => (Arrows, Right),
        _ => return None,
    };
    Some(binding)
}

/// Snapshot of currently held actions, per control scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: [[bool; 4]; 2],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, scheme: ControlScheme, action: Action, held: bool) {
        self.held[scheme.index()][action.index()] = held;
    }

    pub fn is_held(&self, scheme: ControlScheme, action: Action) -> bool {
        self.held[scheme.index()][action.index()]
    }

    /// Record a key transition by DOM key code. Returns true if the key is bound.
    pub fn set_key(&mut self, code: &str, held: bool) -> bool {
        match key_binding(code) {
            Some((scheme, action)) => {
                self.set(scheme, action, held);
                true
            }
            None => false,
        }
    }

    /// Release everything (e.g. on focus loss)
    pub fn clear(&mut self) {
        self.held = [[false; 4]; 2];
    }
}
