use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks raw keyboard and cursor state between frames.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.key_event(key, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::Focused(false) => {
                self.keys_down.clear();
                self.mouse_position = None;
            }
            _ => {}
        }
    }

    pub fn key_event(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_down.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_down.insert(key);
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Record a cursor position. The first position only anchors the cursor.
    pub fn cursor_moved(&mut self, position: Vec2) {
        if let Some(last) = self.mouse_position {
            self.mouse_delta += position - last;
        }
        self.mouse_position = Some(position);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Mouse movement delta this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }
}

/// Everything the scene can be asked to do from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Rotate the directional light by +1° per frame.
    RotateLightLeft,
    /// Rotate the directional light by −1° per frame.
    RotateLightRight,
    Wireframe,
    Points,
    Fill,
    StartTour,
    ToggleDepthMap,
    GrowTrees,
    ShrinkTrees,
    ShootArrow,
    CancelArrow,
    MigrateDucks,
    TogglePlane,
    Quit,
}

impl Action {
    /// Held actions fire on every frame the key is down; the rest fire once per press.
    pub fn is_held(self) -> bool {
        matches!(
            self,
            Action::MoveForward
                | Action::MoveBackward
                | Action::MoveLeft
                | Action::MoveRight
                | Action::MoveUp
                | Action::MoveDown
                | Action::RotateLightLeft
                | Action::RotateLightRight
                | Action::GrowTrees
                | Action::ShrinkTrees
        )
    }
}

/// Default key bindings.
pub const KEY_BINDINGS: &[(KeyCode, Action)] = &[
    (KeyCode::KeyW, Action::MoveForward),
    (KeyCode::KeyS, Action::MoveBackward),
    (KeyCode::KeyA, Action::MoveLeft),
    (KeyCode::KeyD, Action::MoveRight),
    (KeyCode::ArrowUp, Action::MoveUp),
    (KeyCode::ArrowDown, Action::MoveDown),
    (KeyCode::KeyJ, Action::RotateLightLeft),
    (KeyCode::KeyK, Action::RotateLightRight),
    (KeyCode::Digit1, Action::Wireframe),
    (KeyCode::Digit2, Action::Points),
    (KeyCode::Digit3, Action::Fill),
    (KeyCode::KeyQ, Action::StartTour),
    (KeyCode::KeyR, Action::ToggleDepthMap),
    (KeyCode::KeyC, Action::GrowTrees),
    (KeyCode::KeyV, Action::ShrinkTrees),
    (KeyCode::KeyB, Action::ShootArrow),
    (KeyCode::KeyN, Action::CancelArrow),
    (KeyCode::KeyT, Action::MigrateDucks),
    (KeyCode::KeyP, Action::TogglePlane),
    (KeyCode::Escape, Action::Quit),
];

/// Look up the action bound to a key.
pub fn action_for(key: KeyCode) -> Option<Action> {
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, action)| *action)
}

/// The actions active for one frame, decoupled from the keyboard.
///
/// The update step only ever sees this snapshot, which lets tests drive
/// frames without a window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionState {
    active: HashSet<Action>,
    pub mouse_delta: Vec2,
}

impl ActionState {
    /// Snapshot the bound actions from the tracked input.
    pub fn from_input(input: &Input) -> Self {
        let active = KEY_BINDINGS
            .iter()
            .filter(|(key, action)| {
                if action.is_held() {
                    input.key_down(*key)
                } else {
                    input.key_pressed(*key)
                }
            })
            .map(|(_, action)| *action)
            .collect();

        Self {
            active,
            mouse_delta: input.mouse_delta(),
        }
    }

    /// Mark an action active for this frame.
    pub fn with(mut self, action: Action) -> Self {
        self.active.insert(action);
        self
    }

    pub fn with_mouse_delta(mut self, delta: Vec2) -> Self {
        self.mouse_delta = delta;
        self
    }

    pub fn active(&self, action: Action) -> bool {
        self.active.contains(&action)
    }
}

/// Accumulated yaw/pitch driven by mouse movement, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseLook {
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
    pub pitch_limit: f32,
}

impl MouseLook {
    pub const START_YAW: f32 = -90.0;
    pub const START_PITCH: f32 = 0.0;

    pub fn new(sensitivity: f32, pitch_limit: f32) -> Self {
        Self {
            yaw: Self::START_YAW,
            pitch: Self::START_PITCH,
            sensitivity,
            pitch_limit,
        }
    }

    /// Accumulate a cursor delta. Returns the new `(pitch, yaw)` when the cursor moved.
    ///
    /// Screen y grows downward, so moving the cursor up raises the pitch.
    pub fn apply(&mut self, delta: Vec2) -> Option<(f32, f32)> {
        if delta == Vec2::ZERO {
            return None;
        }
        self.yaw += delta.x * self.sensitivity;
        self.pitch = (self.pitch - delta.y * self.sensitivity)
            .clamp(-self.pitch_limit, self.pitch_limit);
        Some((self.pitch, self.yaw))
    }

    pub fn reset(&mut self) {
        self.yaw = Self::START_YAW;
        self.pitch = Self::START_PITCH;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn press_is_reported_once() {
        let mut input = Input::new();
        input.key_event(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.key_pressed(KeyCode::KeyW));
        assert!(input.key_down(KeyCode::KeyW));

        input.begin_frame();
        input.key_event(KeyCode::KeyW, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::KeyW));
        assert!(input.key_down(KeyCode::KeyW));

        input.key_event(KeyCode::KeyW, ElementState::Released);
        assert!(input.key_released(KeyCode::KeyW));
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn first_cursor_event_only_anchors() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(500.0, 300.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.cursor_moved(Vec2::new(510.0, 290.0));
        input.cursor_moved(Vec2::new(512.0, 291.0));
        assert_eq!(input.mouse_delta(), Vec2::new(12.0, -9.0));
    }

    #[test]
    fn bindings_cover_every_control() {
        assert_eq!(action_for(KeyCode::KeyW), Some(Action::MoveForward));
        assert_eq!(action_for(KeyCode::ArrowDown), Some(Action::MoveDown));
        assert_eq!(action_for(KeyCode::KeyJ), Some(Action::RotateLightLeft));
        assert_eq!(action_for(KeyCode::Digit2), Some(Action::Points));
        assert_eq!(action_for(KeyCode::KeyR), Some(Action::ToggleDepthMap));
        assert_eq!(action_for(KeyCode::KeyT), Some(Action::MigrateDucks));
        assert_eq!(action_for(KeyCode::Escape), Some(Action::Quit));
        assert_eq!(action_for(KeyCode::KeyZ), None);
    }

    #[test]
    fn toggles_fire_on_press_edge_only() {
        let mut input = Input::new();
        input.key_event(KeyCode::KeyR, ElementState::Pressed);
        input.key_event(KeyCode::KeyW, ElementState::Pressed);
        let first = ActionState::from_input(&input);
        assert!(first.active(Action::ToggleDepthMap));
        assert!(first.active(Action::MoveForward));

        input.begin_frame();
        let second = ActionState::from_input(&input);
        assert!(!second.active(Action::ToggleDepthMap));
        assert!(second.active(Action::MoveForward));
    }

    #[test]
    fn mouse_look_inverts_y_and_clamps_pitch() {
        let mut look = MouseLook::new(0.1, 89.0);
        assert_eq!(look.apply(Vec2::ZERO), None);

        let (pitch, yaw) = look.apply(Vec2::new(100.0, -50.0)).unwrap();
        assert_relative_eq!(yaw, -80.0, epsilon = 1e-4);
        assert_relative_eq!(pitch, 5.0, epsilon = 1e-4);

        let (pitch, _) = look.apply(Vec2::new(0.0, -10_000.0)).unwrap();
        assert_eq!(pitch, 89.0);

        look.reset();
        assert_eq!((look.pitch, look.yaw), (0.0, -90.0));
    }
}
