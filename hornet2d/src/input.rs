use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Tracks keyboard state across frames.
///
/// Distinguishes between a key being held (`is_key_down`) and the frame
/// edge where it transitioned (`is_key_pressed` / `is_key_released`).
/// Edge flags are valid for exactly one frame.
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
        }
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Handle a keyboard input event from winit.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match event.state {
                ElementState::Pressed => self.press(keycode),
                ElementState::Released => self.release(keycode),
            }
        }
    }

    fn press(&mut self, keycode: KeyCode) {
        // OS key repeat delivers Pressed repeatedly while held; only the
        // first transition counts as a press edge.
        if !self.keys_down.contains(&keycode) {
            self.keys_pressed.insert(keycode);
        }
        self.keys_down.insert(keycode);
    }

    fn release(&mut self, keycode: KeyCode) {
        self.keys_down.remove(&keycode);
        self.keys_released.insert(keycode);
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// A logical input action (e.g. "fire", "confirm").
///
/// This is a lightweight, data-driven layer on top of `InputState`.
/// Game code binds one or more keys to each action and then queries the
/// action state instead of referencing key codes directly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub String);

impl ActionId {
    /// Create a new action identifier from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        ActionId(name.into())
    }
}

/// A one-dimensional axis binding (e.g. -1..1 horizontal movement).
#[derive(Clone, Debug)]
pub struct AxisBinding {
    /// Keys contributing negative direction (e.g. A, Left).
    pub negative: Vec<KeyCode>,
    /// Keys contributing positive direction (e.g. D, Right).
    pub positive: Vec<KeyCode>,
}

impl AxisBinding {
    /// Create a new axis binding from negative and positive key sets.
    pub fn new(negative: Vec<KeyCode>, positive: Vec<KeyCode>) -> Self {
        Self { negative, positive }
    }
}

/// High-level input mapping from actions/axes to physical keys.
///
/// Games store an `InputMap` in their own state, configure bindings once,
/// and query actions/axes during `update()`.
#[derive(Clone, Debug, Default)]
pub struct InputMap {
    actions: HashMap<ActionId, Vec<KeyCode>>,
    axes: HashMap<ActionId, AxisBinding>,
}

impl InputMap {
    /// Create an empty input map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action.
    pub fn bind_key(&mut self, action: ActionId, key: KeyCode) {
        self.actions.entry(action).or_default().push(key);
    }

    /// Define or replace an axis binding.
    pub fn set_axis(&mut self, axis: ActionId, binding: AxisBinding) {
        self.axes.insert(axis, binding);
    }

    /// Check if an action is currently held down.
    pub fn action_down(&self, input: &InputState, action: &ActionId) -> bool {
        self.actions
            .get(action)
            .map(|keys| keys.iter().any(|&k| input.is_key_down(k)))
            .unwrap_or(false)
    }

    /// Check if an action was pressed this frame.
    pub fn action_pressed(&self, input: &InputState, action: &ActionId) -> bool {
        self.actions
            .get(action)
            .map(|keys| keys.iter().any(|&k| input.is_key_pressed(k)))
            .unwrap_or(false)
    }

    /// Get the value of an axis in the range [-1.0, 1.0].
    ///
    /// Negative keys contribute -1.0, positive keys +1.0.
    /// If both sides are held, they cancel out.
    pub fn axis(&self, input: &InputState, axis: &ActionId) -> f32 {
        if let Some(binding) = self.axes.get(axis) {
            let mut value = 0.0;
            if binding.negative.iter().any(|&k| input.is_key_down(k)) {
                value -= 1.0;
            }
            if binding.positive.iter().any(|&k| input.is_key_down(k)) {
                value += 1.0;
            }
            value
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_edge_lasts_one_frame() {
        let mut input = InputState::new();
        input.press(KeyCode::Enter);
        assert!(input.is_key_pressed(KeyCode::Enter));
        assert!(input.is_key_down(KeyCode::Enter));

        input.begin_frame();
        assert!(!input.is_key_pressed(KeyCode::Enter));
        assert!(input.is_key_down(KeyCode::Enter));
    }

    #[test]
    fn key_repeat_does_not_retrigger_press() {
        let mut input = InputState::new();
        input.press(KeyCode::Space);
        input.begin_frame();
        // OS key repeat while held
        input.press(KeyCode::Space);
        assert!(!input.is_key_pressed(KeyCode::Space));
        assert!(input.is_key_down(KeyCode::Space));
    }

    #[test]
    fn release_clears_down_state() {
        let mut input = InputState::new();
        input.press(KeyCode::ArrowLeft);
        input.begin_frame();
        input.release(KeyCode::ArrowLeft);
        assert!(!input.is_key_down(KeyCode::ArrowLeft));
        assert!(input.is_key_released(KeyCode::ArrowLeft));
    }

    #[test]
    fn axis_combines_opposing_keys() {
        let mut map = InputMap::new();
        map.set_axis(
            ActionId::new("horizontal"),
            AxisBinding::new(
                vec![KeyCode::ArrowLeft, KeyCode::KeyA],
                vec![KeyCode::ArrowRight, KeyCode::KeyD],
            ),
        );

        let mut input = InputState::new();
        let axis = ActionId::new("horizontal");
        assert_eq!(map.axis(&input, &axis), 0.0);

        input.press(KeyCode::ArrowLeft);
        assert_eq!(map.axis(&input, &axis), -1.0);

        input.press(KeyCode::KeyD);
        assert_eq!(map.axis(&input, &axis), 0.0);

        input.release(KeyCode::ArrowLeft);
        assert_eq!(map.axis(&input, &axis), 1.0);
    }

    #[test]
    fn action_binding_queries() {
        let mut map = InputMap::new();
        let fire = ActionId::new("fire");
        map.bind_key(fire.clone(), KeyCode::Space);

        let mut input = InputState::new();
        assert!(!map.action_down(&input, &fire));

        input.press(KeyCode::Space);
        assert!(map.action_down(&input, &fire));
        assert!(map.action_pressed(&input, &fire));
    }
}
