//! A `NavigationAgent` that arrives when told to.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use tourguide_core::Position;
use tourguide_core::collaborators::NavigationAgent;

#[derive(Debug)]
struct NavState {
    position: Position,
    destination: Option<Position>,
    destinations: Vec<Position>,
    look_targets: Vec<Position>,
    stopped: bool,
    speed: f32,
    path_pending: bool,
    has_path: bool,
    stopping_distance: f32,
}

/// A navigation agent that never moves on its own. Tests call `arrive` to
/// place it at its destination, or `set_path_pending` to hold it in the
/// planning phase.
#[derive(Debug, Clone)]
pub struct ScriptedNavigation {
    state: Rc<RefCell<NavState>>,
}

impl ScriptedNavigation {
    /// Creates an agent standing at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Vec3::ZERO)
    }

    /// Creates an agent standing at `position`.
    #[must_use]
    pub fn at(position: Position) -> Self {
        Self {
            state: Rc::new(RefCell::new(NavState {
                position,
                destination: None,
                destinations: Vec::new(),
                look_targets: Vec::new(),
                stopped: false,
                speed: 0.0,
                path_pending: false,
                has_path: false,
                stopping_distance: 0.0,
            })),
        }
    }

    /// Teleports the agent onto its destination and clears the path.
    pub fn arrive(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(destination) = state.destination.take() {
            state.position = destination;
        }
        state.has_path = false;
        state.path_pending = false;
    }

    /// Holds the agent in (or releases it from) path planning.
    pub fn set_path_pending(&self, pending: bool) {
        self.state.borrow_mut().path_pending = pending;
    }

    /// Moves the agent without touching its path.
    pub fn set_position(&self, position: Position) {
        self.state.borrow_mut().position = position;
    }

    /// Every destination requested so far, in order.
    #[must_use]
    pub fn destinations(&self) -> Vec<Position> {
        self.state.borrow().destinations.clone()
    }

    /// Every `look_at` target so far, in order.
    #[must_use]
    pub fn look_targets(&self) -> Vec<Position> {
        self.state.borrow().look_targets.clone()
    }

    /// Whether the agent is halted.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.borrow().stopped
    }

    /// Last speed applied.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.state.borrow().speed
    }
}

impl Default for ScriptedNavigation {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationAgent for ScriptedNavigation {
    fn set_destination(&mut self, destination: Position) {
        let mut state = self.state.borrow_mut();
        state.destination = Some(destination);
        state.destinations.push(destination);
        state.has_path = true;
    }

    fn stop(&mut self) {
        self.state.borrow_mut().stopped = true;
    }

    fn resume(&mut self) {
        self.state.borrow_mut().stopped = false;
    }

    fn set_speed(&mut self, speed: f32) {
        self.state.borrow_mut().speed = speed;
    }

    fn look_at(&mut self, target: Position) {
        self.state.borrow_mut().look_targets.push(target);
    }

    fn position(&self) -> Position {
        self.state.borrow().position
    }

    fn path_pending(&self) -> bool {
        self.state.borrow().path_pending
    }

    fn remaining_distance(&self) -> f32 {
        let state = self.state.borrow();
        state
            .destination
            .map_or(0.0, |destination| state.position.distance(destination))
    }

    fn stopping_distance(&self) -> f32 {
        self.state.borrow().stopping_distance
    }

    fn velocity(&self) -> Vec3 {
        let state = self.state.borrow();
        match state.destination {
            Some(destination) if !state.stopped && state.has_path => {
                (destination - state.position).normalize_or_zero() * state.speed
            }
            _ => Vec3::ZERO,
        }
    }

    fn has_path(&self) -> bool {
        self.state.borrow().has_path
    }
}
