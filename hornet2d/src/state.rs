use anyhow::Result;

use crate::engine::EngineContext;
use crate::render::{Frame, Renderer};

/// Trait for types that can manage state transitions.
/// This allows states to transition without direct access to StateMachine.
pub trait StateMachineLike {
    /// Push a new state onto the stack.
    fn push(&mut self, state: Box<dyn State>);

    /// Pop the current top state.
    fn pop(&mut self);

    /// Replace the current top state.
    fn replace(&mut self, state: Box<dyn State>);
}

/// A game state (screen) managed by a [`StateMachine`].
///
/// States are a natural fit for modal arcade screens: a start screen
/// replaces itself with gameplay, gameplay replaces itself with an
/// outcome screen, and so on.
pub trait State {
    /// Called when this state is entered (pushed onto the stack).
    fn on_enter(&mut self, _ctx: &mut EngineContext) -> Result<()> {
        Ok(())
    }

    /// Called when this state is exited (popped from the stack).
    fn on_exit(&mut self, _ctx: &mut EngineContext) -> Result<()> {
        Ok(())
    }

    /// Update this state. Called every frame.
    /// The state machine is provided so states can transition to other states.
    fn update(
        &mut self,
        ctx: &mut EngineContext,
        state_machine: &mut dyn StateMachineLike,
    ) -> Result<()>;

    /// Draw this state. Called every frame after update.
    /// The frame is already begun by StateMachine, so states should only draw to it.
    fn draw(&mut self, renderer: &mut Renderer, frame: &mut Frame) -> Result<()>;
}

/// Internal helper to allow states to queue transitions without borrow conflicts.
struct StateTransitionHelper<'a> {
    pending_push: &'a mut Option<Box<dyn State>>,
    pending_pop: &'a mut bool,
    pending_replace: &'a mut Option<Box<dyn State>>,
}

impl<'a> StateMachineLike for StateTransitionHelper<'a> {
    fn push(&mut self, state: Box<dyn State>) {
        *self.pending_push = Some(state);
    }

    fn pop(&mut self) {
        *self.pending_pop = true;
    }

    fn replace(&mut self, state: Box<dyn State>) {
        *self.pending_replace = Some(state);
    }
}

/// Manages a stack of game states.
///
/// States are drawn from bottom to top (oldest to newest).
/// Only the top state receives update calls.
/// Transitions requested during update are deferred and applied at the
/// start of the next frame, so a state can request its own replacement
/// without invalidating the current borrow.
pub struct StateMachine {
    states: Vec<Box<dyn State>>,
    pending_push: Option<Box<dyn State>>,
    pending_pop: bool,
    pending_replace: Option<Box<dyn State>>,
}

impl StateMachine {
    /// Create a new empty state machine.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            pending_push: None,
            pending_pop: false,
            pending_replace: None,
        }
    }

    /// Create a state machine with an initial state.
    pub fn with_initial_state(initial: Box<dyn State>) -> Self {
        let mut sm = Self::new();
        // on_enter is called in init() when the engine starts
        sm.states.push(initial);
        sm
    }

    /// Push a new state onto the stack.
    /// The current top state stops receiving updates but is still drawn.
    pub fn push(&mut self, state: Box<dyn State>) {
        self.pending_push = Some(state);
    }

    /// Pop the current top state.
    /// The previous state (if any) resumes receiving updates.
    pub fn pop(&mut self) {
        self.pending_pop = true;
    }

    /// Replace the current top state with a new state.
    /// Equivalent to `pop()` followed by `push()`.
    pub fn replace(&mut self, state: Box<dyn State>) {
        self.pending_replace = Some(state);
    }

    /// Apply pending state transitions.
    /// Called automatically by the engine, but can be called manually if needed.
    pub fn apply_transitions(&mut self, ctx: &mut EngineContext) -> Result<()> {
        // Replace wins over pop/push requested in the same frame
        if let Some(mut new_state) = self.pending_replace.take() {
            if let Some(mut old_state) = self.states.pop() {
                old_state.on_exit(ctx)?;
            }
            new_state.on_enter(ctx)?;
            self.states.push(new_state);
            return Ok(());
        }

        if self.pending_pop {
            self.pending_pop = false;
            if let Some(mut state) = self.states.pop() {
                state.on_exit(ctx)?;
            }
        }

        if let Some(mut new_state) = self.pending_push.take() {
            new_state.on_enter(ctx)?;
            self.states.push(new_state);
        }

        Ok(())
    }

    /// Update the top state (if any).
    /// This method handles the borrow checker issues internally.
    pub fn update_top(&mut self, ctx: &mut EngineContext) -> Result<()> {
        if let Some(state) = self.states.last_mut() {
            let mut helper = StateTransitionHelper {
                pending_push: &mut self.pending_push,
                pending_pop: &mut self.pending_pop,
                pending_replace: &mut self.pending_replace,
            };
            state.update(ctx, &mut helper)?;
        }
        Ok(())
    }

    /// Draw all states from bottom to top (oldest to newest).
    /// The frame should already be begun by the caller.
    pub fn draw_all(&mut self, renderer: &mut Renderer, frame: &mut Frame) -> Result<()> {
        for state in self.states.iter_mut() {
            state.draw(renderer, frame)?;
        }
        Ok(())
    }

    /// Call on_enter for the top state (used for initial state initialization).
    pub fn init_top_state(&mut self, ctx: &mut EngineContext) -> Result<()> {
        if let Some(state) = self.states.last_mut() {
            state.on_enter(ctx)?;
        }
        Ok(())
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
