//! Pointer input state
//!
//! The application writes mouse state into an [`InputHandle`]; elements read
//! it while drawing, and deferred callbacks hold a clone so they observe the
//! state at execution time rather than at build time.

use std::cell::RefCell;
use std::rc::Rc;

use weft_core::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

/// Snapshot of pointer state in root coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    pub mouse_position: Point,
    buttons: [bool; 3],
}

impl InputState {
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn set_button(&mut self, button: MouseButton, down: bool) {
        self.buttons[button.index()] = down;
    }
}

/// Shared, interior-mutable input state
#[derive(Clone, Debug, Default)]
pub struct InputHandle {
    state: Rc<RefCell<InputState>>,
}

impl InputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> InputState {
        *self.state.borrow()
    }

    pub fn mouse_position(&self) -> Point {
        self.state.borrow().mouse_position
    }

    pub fn set_mouse_position(&self, position: Point) {
        self.state.borrow_mut().mouse_position = position;
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.state.borrow().is_button_down(button)
    }

    pub fn set_button(&self, button: MouseButton, down: bool) {
        tracing::trace!(?button, down, "mouse button");
        self.state.borrow_mut().set_button(button, down);
    }

    /// Edit the state in place
    pub fn update(&self, f: impl FnOnce(&mut InputState)) {
        f(&mut self.state.borrow_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let input = InputHandle::new();
        let deferred = input.clone();
        input.set_mouse_position(Point::new(3.0, 4.0));
        input.set_button(MouseButton::Right, true);

        assert_eq!(deferred.mouse_position(), Point::new(3.0, 4.0));
        assert!(deferred.is_button_down(MouseButton::Right));
        assert!(!deferred.is_button_down(MouseButton::Left));

        deferred.update(|state| state.set_button(MouseButton::Right, false));
        assert!(!input.snapshot().is_button_down(MouseButton::Right));
    }
}
