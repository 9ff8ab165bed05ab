//! hornet2d - a minimal 2D sprite framework for fixed-screen arcade games.
//!
//! Provides a window/event loop, keyboard input with per-frame edge
//! detection, a cached texture loader, a batched sprite renderer, and a
//! stack-based state machine for modal screens.

pub mod assets;
pub mod engine;
pub mod input;
pub mod math;
pub mod render;
pub mod state;

pub use crate::assets::AssetManager;
pub use crate::engine::{Engine, EngineConfig, EngineContext, Game};
pub use crate::input::{ActionId, AxisBinding, InputMap, InputState};
pub use crate::math::{Camera2D, Rect, Transform2D, Vec2};
pub use crate::render::{Frame, Renderer, Sprite, TextureHandle};
pub use crate::state::{State, StateMachine, StateMachineLike};
pub use winit::keyboard::KeyCode;
