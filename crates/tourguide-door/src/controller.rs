//! Door controller.

use serde::{Deserialize, Serialize};
use tourguide_core::error::StoryError;
use tourguide_core::ids::DoorId;
use tourguide_core::signal::Signal;
use tracing::{debug, info};

use crate::easing::{Easing, lerp_angle};

/// Shortest open transition, in seconds.
const MIN_OPEN_DURATION: f32 = 0.01;

/// Authoring-time configuration for a door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Local yaw in degrees while closed.
    pub closed_angle: f32,
    /// Local yaw in degrees while open.
    pub open_angle: f32,
    /// Seconds the open transition takes.
    pub open_duration: f32,
    /// Curve applied to the open transition.
    pub easing: Easing,
    /// Whether the door starts locked.
    pub start_locked: bool,
    /// Whether the door starts open.
    pub start_open: bool,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            closed_angle: 180.0,
            open_angle: 60.0,
            open_duration: 1.0,
            easing: Easing::EaseInOut,
            start_locked: false,
            start_open: false,
        }
    }
}

/// Externally visible phase of a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorPhase {
    /// Closed and locked.
    ClosedLocked,
    /// Closed and free to open.
    ClosedUnlocked,
    /// Rotating towards the open angle.
    Opening,
    /// Fully open.
    Open,
}

#[derive(Debug, Clone, Copy)]
struct OpenTransition {
    start_angle: f32,
    target_angle: f32,
    elapsed: f32,
    duration: f32,
}

/// A lockable door that swings open over time when asked.
#[derive(Debug)]
pub struct DoorController {
    id: DoorId,
    config: DoorConfig,
    locked: bool,
    open: bool,
    angle: f32,
    transition: Option<OpenTransition>,
    opened: Signal<DoorId>,
    open_failed: Signal<DoorId>,
}

impl DoorController {
    /// Creates a door in the state described by `config`.
    #[must_use]
    pub fn new(id: DoorId, config: DoorConfig) -> Self {
        let angle = if config.start_open {
            config.open_angle
        } else {
            config.closed_angle
        };
        Self {
            id,
            locked: config.start_locked,
            open: config.start_open,
            angle,
            transition: None,
            opened: Signal::new(),
            open_failed: Signal::new(),
            config,
        }
    }

    /// Locks the door.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::AlreadyInProgress` while the door is opening.
    pub fn lock(&mut self) -> Result<(), StoryError> {
        self.ensure_not_animating("lock")?;
        self.locked = true;
        Ok(())
    }

    /// Unlocks the door.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::AlreadyInProgress` while the door is opening.
    pub fn unlock(&mut self) -> Result<(), StoryError> {
        self.ensure_not_animating("unlock")?;
        self.locked = false;
        Ok(())
    }

    fn ensure_not_animating(&self, action: &str) -> Result<(), StoryError> {
        if self.is_animating() {
            debug!(door = %self.id, action, "door is opening, ignoring");
            return Err(StoryError::AlreadyInProgress(format!(
                "door {} is opening",
                self.id
            )));
        }
        Ok(())
    }

    /// Attempts to open the door.
    ///
    /// A locked door raises `on_open_failed` before returning. A successful
    /// attempt starts the open transition; `on_opened` fires from `tick` once
    /// it completes.
    ///
    /// # Errors
    ///
    /// * `StoryError::AlreadyInProgress` if the door is open or opening.
    /// * `StoryError::DoorLocked` if the door is locked.
    pub fn try_open(&mut self) -> Result<(), StoryError> {
        if self.open {
            info!(door = %self.id, "door already open, ignoring open request");
            return Err(StoryError::AlreadyInProgress(format!(
                "door {} is already open",
                self.id
            )));
        }

        if self.locked {
            info!(door = %self.id, "door is locked, open failed");
            self.open_failed.emit(&self.id);
            return Err(StoryError::DoorLocked(self.id.clone()));
        }

        if self.is_animating() {
            info!(door = %self.id, "door is already opening");
            return Err(StoryError::AlreadyInProgress(format!(
                "door {} is opening",
                self.id
            )));
        }

        info!(door = %self.id, duration = self.config.open_duration, "door opening");
        self.transition = Some(OpenTransition {
            start_angle: self.angle,
            target_angle: self.config.open_angle,
            elapsed: 0.0,
            duration: self.config.open_duration.max(MIN_OPEN_DURATION),
        });
        Ok(())
    }

    /// Advances the open transition by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };

        transition.elapsed += dt;
        let progress = (transition.elapsed / transition.duration).clamp(0.0, 1.0);
        self.angle = lerp_angle(
            transition.start_angle,
            transition.target_angle,
            self.config.easing.evaluate(progress),
        );

        if transition.elapsed >= transition.duration {
            // Snap so easing error never leaves the door slightly ajar.
            self.angle = transition.target_angle;
            self.transition = None;
            self.open = true;
            info!(door = %self.id, "door opened");
            self.opened.emit(&self.id);
        }
    }

    /// The door's identifier.
    #[must_use]
    pub fn id(&self) -> &DoorId {
        &self.id
    }

    /// Whether the door is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether the door is fully open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the open transition is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Current local yaw in degrees.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DoorPhase {
        match (self.open, self.is_animating(), self.locked) {
            (true, _, _) => DoorPhase::Open,
            (false, true, _) => DoorPhase::Opening,
            (false, false, true) => DoorPhase::ClosedLocked,
            (false, false, false) => DoorPhase::ClosedUnlocked,
        }
    }

    /// Fires once each time an open transition completes.
    pub fn on_opened(&mut self) -> &mut Signal<DoorId> {
        &mut self.opened
    }

    /// Fires each time `try_open` is refused because the door is locked.
    pub fn on_open_failed(&mut self) -> &mut Signal<DoorId> {
        &mut self.open_failed
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn door_with_log(config: DoorConfig) -> (DoorController, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut door = DoorController::new(DoorId::new("vault"), config);
        let opened = Rc::clone(&log);
        door.on_opened().connect(move |_| {
            opened.borrow_mut().push("opened");
            tourguide_core::signal::Listen::Keep
        });
        let failed = Rc::clone(&log);
        door.on_open_failed().connect(move |_| {
            failed.borrow_mut().push("failed");
            tourguide_core::signal::Listen::Keep
        });
        (door, log)
    }

    #[test]
    fn test_try_open_on_locked_door_reports_failure_and_stays_closed() {
        // Arrange
        let (mut door, log) = door_with_log(DoorConfig {
            start_locked: true,
            ..DoorConfig::default()
        });

        // Act
        let result = door.try_open();
        door.tick(5.0);

        // Assert
        assert_eq!(result, Err(StoryError::DoorLocked(DoorId::new("vault"))));
        assert_eq!(*log.borrow(), vec!["failed"]);
        assert!(!door.is_open());
        assert!(door.is_locked());
        assert_eq!(door.phase(), DoorPhase::ClosedLocked);
    }

    #[test]
    fn test_try_open_on_open_door_raises_no_notification() {
        // Arrange
        let (mut door, log) = door_with_log(DoorConfig {
            start_open: true,
            ..DoorConfig::default()
        });

        // Act
        let result = door.try_open();
        door.tick(5.0);

        // Assert
        assert!(matches!(result, Err(StoryError::AlreadyInProgress(_))));
        assert!(log.borrow().is_empty());
        assert!(door.is_open());
    }

    #[test]
    fn test_open_transition_eases_then_snaps_and_fires_once() {
        // Arrange
        let (mut door, log) = door_with_log(DoorConfig {
            open_duration: 1.0,
            ..DoorConfig::default()
        });

        // Act
        door.try_open().unwrap();
        door.tick(0.25);
        let quarter = door.angle();
        door.tick(0.25);
        let half = door.angle();

        // Assert
        assert_eq!(door.phase(), DoorPhase::Opening);
        // Ease-in-out covers less than a quarter of the arc in the first quarter.
        assert!(quarter < 180.0 && quarter > 150.0);
        assert!((half - 120.0).abs() < 1e-3);
        assert!(log.borrow().is_empty());

        door.tick(0.5);
        door.tick(0.5);
        assert!(door.is_open());
        assert!(!door.is_animating());
        assert!((door.angle() - 60.0).abs() < f32::EPSILON);
        assert_eq!(*log.borrow(), vec!["opened"]);
    }

    #[test]
    fn test_try_open_while_opening_is_ignored() {
        // Arrange
        let (mut door, _log) = door_with_log(DoorConfig::default());
        door.try_open().unwrap();

        // Act
        let result = door.try_open();

        // Assert
        assert!(matches!(result, Err(StoryError::AlreadyInProgress(_))));
        assert_eq!(door.phase(), DoorPhase::Opening);
    }

    #[test]
    fn test_lock_and_unlock_are_refused_while_opening() {
        // Arrange
        let (mut door, _log) = door_with_log(DoorConfig::default());
        door.try_open().unwrap();

        // Act
        let lock = door.lock();

        // Assert
        assert!(matches!(lock, Err(StoryError::AlreadyInProgress(_))));
        assert!(!door.is_locked());
    }

    #[test]
    fn test_unlock_lets_a_locked_door_open() {
        // Arrange
        let (mut door, log) = door_with_log(DoorConfig {
            start_locked: true,
            open_duration: 0.0,
            ..DoorConfig::default()
        });

        // Act
        door.unlock().unwrap();
        door.try_open().unwrap();
        door.tick(0.016);

        // Assert
        assert!(door.is_open());
        assert_eq!(*log.borrow(), vec!["opened"]);
    }

    #[test]
    fn test_config_defaults_fill_missing_yaml_fields() {
        let config: DoorConfig = serde_yaml::from_str("start_locked: true\neasing: linear\n").unwrap();

        assert!(config.start_locked);
        assert_eq!(config.easing, Easing::Linear);
        assert!((config.open_angle - 60.0).abs() < f32::EPSILON);
    }
}
