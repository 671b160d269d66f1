//! The tour stage: owns the guide, doors and sequencer and ticks them in a
//! fixed order.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tourguide_animation::AnimationStateMachine;
use tourguide_core::Position;
use tourguide_core::error::StoryError;
use tourguide_core::ids::DoorId;
use tourguide_door::DoorController;
use tourguide_guide::{GuideAgent, HazardWarning};
use tracing::{debug, warn};

use crate::application::progress::StoryProgress;
use crate::application::sequencer::StepSequencer;
use crate::domain::script::Script;

/// Story-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Start the story on the first tick.
    pub auto_start: bool,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self { auto_start: true }
    }
}

/// Composition root for a tour.
///
/// Each `tick` runs, in order: auto-start, the guide and its hazard zones,
/// the doors, the animation machine and finally the sequencer. Completions
/// raised earlier in a tick are therefore consumed in the same tick.
#[derive(Debug)]
pub struct TourStage {
    config: StoryConfig,
    animation: Rc<RefCell<AnimationStateMachine>>,
    guide: Rc<RefCell<GuideAgent>>,
    doors: Vec<Rc<RefCell<DoorController>>>,
    hazards: Vec<HazardWarning>,
    sequencer: StepSequencer,
    auto_started: bool,
}

impl TourStage {
    /// Creates a stage running `script` with `guide`, which must drive
    /// `animation`.
    #[must_use]
    pub fn new(
        config: StoryConfig,
        script: Script,
        animation: Rc<RefCell<AnimationStateMachine>>,
        guide: GuideAgent,
    ) -> Self {
        let guide = Rc::new(RefCell::new(guide));
        let sequencer = StepSequencer::new(script)
            .with_guide(&guide)
            .with_animation(&animation);
        Self {
            config,
            animation,
            guide,
            doors: Vec::new(),
            hazards: Vec::new(),
            sequencer,
            auto_started: false,
        }
    }

    /// Adds a door the script can open.
    #[must_use]
    pub fn with_door(mut self, door: DoorController) -> Self {
        let door = Rc::new(RefCell::new(door));
        self.sequencer = self.sequencer.with_door(&door);
        self.doors.push(door);
        self
    }

    /// Adds a hazard zone and returns its index.
    pub fn add_hazard(&mut self, hazard: HazardWarning) -> usize {
        self.hazards.push(hazard);
        self.hazards.len() - 1
    }

    /// Reports that the visitor stepped into hazard `index`. Returns whether
    /// the guide issued a warning.
    pub fn visitor_entered(&mut self, index: usize) -> bool {
        let Some(hazard) = self.hazards.get_mut(index) else {
            warn!(hazard = index, "unknown hazard zone");
            return false;
        };
        hazard.on_visitor_enter(&mut self.guide.borrow_mut())
    }

    /// Updates the visitor position the guide faces and waits for.
    pub fn set_visitor(&mut self, visitor: Option<Position>) {
        self.guide.borrow_mut().set_focus(visitor);
    }

    /// Starts (or restarts) the story.
    ///
    /// # Errors
    ///
    /// See [`StepSequencer::start_story`].
    pub fn start_story(&mut self) -> Result<(), StoryError> {
        self.auto_started = true;
        self.sequencer.start_story()
    }

    /// Stops the story. Returns whether it was running.
    pub fn stop_story(&mut self) -> bool {
        self.sequencer.stop()
    }

    /// Advances the whole stage by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.config.auto_start && !self.auto_started {
            debug!("auto-starting story");
            if let Err(error) = self.start_story() {
                warn!(%error, "story did not start");
            }
        }

        {
            let mut guide = self.guide.borrow_mut();
            guide.tick(dt);
            for hazard in &mut self.hazards {
                hazard.tick(dt, &mut guide);
            }
        }
        for door in &self.doors {
            door.borrow_mut().tick(dt);
        }
        self.animation.borrow_mut().tick(dt);
        self.sequencer.tick(dt);
    }

    /// The sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// Mutable access to the sequencer, e.g. to drain its events.
    pub fn sequencer_mut(&mut self) -> &mut StepSequencer {
        &mut self.sequencer
    }

    /// The guide.
    #[must_use]
    pub fn guide(&self) -> &Rc<RefCell<GuideAgent>> {
        &self.guide
    }

    /// The animation state machine.
    #[must_use]
    pub fn animation(&self) -> &Rc<RefCell<AnimationStateMachine>> {
        &self.animation
    }

    /// The door registered under `id`.
    #[must_use]
    pub fn door(&self, id: &DoorId) -> Option<&Rc<RefCell<DoorController>>> {
        self.doors.iter().find(|door| door.borrow().id() == id)
    }

    /// Snapshot of the story's position.
    #[must_use]
    pub fn progress(&self) -> StoryProgress {
        self.sequencer.progress()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use tourguide_animation::AnimationStateId;
    use tourguide_core::ids::AudioClipRef;
    use tourguide_door::DoorConfig;
    use tourguide_guide::GuideConfig;
    use tourguide_test_support::{RecordingAnimator, RecordingAudioPlayer, ScriptedNavigation};

    use super::*;
    use crate::domain::events::StoryEventKind;
    use crate::domain::step::Step;

    const DT: f32 = 0.5;

    struct Fixture {
        stage: TourStage,
        navigation: ScriptedNavigation,
        animator: RecordingAnimator,
    }

    fn fixture(steps: Vec<Step>, doors: Vec<DoorController>) -> Fixture {
        let animator = RecordingAnimator::new()
            .with_clip_length("Victory", 2.0)
            .with_clip_length("Pointing", 0.25);
        let navigation = ScriptedNavigation::new();
        let audio = RecordingAudioPlayer::new()
            .with_clip("welcome", 3.0)
            .with_clip("careful", 1.0);

        let animation = Rc::new(RefCell::new(AnimationStateMachine::with_standard_states(
            Box::new(animator.clone()),
        )));
        let guide = GuideAgent::new(GuideConfig::default(), Rc::clone(&animation))
            .with_navigation(Box::new(navigation.clone()))
            .with_audio(Box::new(audio));

        let stage = doors.into_iter().fold(
            TourStage::new(
                StoryConfig::default(),
                Script::from_steps(steps),
                animation,
                guide,
            ),
            TourStage::with_door,
        );
        Fixture {
            stage,
            navigation,
            animator,
        }
    }

    fn run(stage: &mut TourStage, frames: usize) {
        for _ in 0..frames {
            stage.tick(DT);
        }
    }

    fn ignored_tokens(stage: &TourStage) -> Vec<u64> {
        stage
            .sequencer()
            .events()
            .iter()
            .filter_map(|event| match event.kind {
                StoryEventKind::StaleCompletionIgnored { token } => Some(token),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_move_then_wait_advances_on_arrival_and_timer() {
        // Arrange
        let mut f = fixture(
            vec![Step::move_to(Vec3::new(3.0, 0.0, 0.0)), Step::wait(2.0)],
            Vec::new(),
        );
        run(&mut f.stage, 4);
        assert_eq!(f.stage.progress().index, Some(0));

        // Act
        f.navigation.arrive();
        f.stage.tick(DT);

        // Assert
        assert_eq!(f.stage.progress().index, Some(1));
        assert!(f.stage.progress().running);

        run(&mut f.stage, 3);
        assert_eq!(f.stage.progress().index, Some(1));

        f.stage.tick(DT);
        assert_eq!(f.stage.progress().index, Some(2));
        assert!(!f.stage.progress().running);
    }

    #[test]
    fn test_talk_waits_for_clip_plus_extra_wait() {
        // Arrange
        let mut f = fixture(vec![Step::talk("welcome", 0.5)], Vec::new());

        // Act
        run(&mut f.stage, 6);

        // Assert
        assert!(f.stage.progress().running);
        assert_eq!(f.stage.progress().index, Some(0));

        f.stage.tick(DT);
        assert!(!f.stage.progress().running);
        assert_eq!(f.stage.progress().index, Some(1));
        assert!((f.stage.sequencer().elapsed() - 3.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_locked_door_advances_on_the_first_tick() {
        // Arrange
        let door = DoorController::new(
            DoorId::new("vault"),
            DoorConfig {
                start_locked: true,
                ..DoorConfig::default()
            },
        );
        let mut f = fixture(vec![Step::open_door("vault", false)], vec![door]);

        // Act
        f.stage.tick(DT);

        // Assert
        assert!(!f.stage.progress().running);
        assert_eq!(f.stage.progress().index, Some(1));
        let door = f.stage.door(&DoorId::new("vault")).unwrap().borrow();
        assert!(!door.is_open());
        assert!(door.is_locked());
        assert!(!door.is_animating());
    }

    #[test]
    fn test_unlocked_door_advances_once_it_has_swung_open() {
        // Arrange
        let door = DoorController::new(
            DoorId::new("gate"),
            DoorConfig {
                start_locked: true,
                open_duration: 1.0,
                ..DoorConfig::default()
            },
        );
        let mut f = fixture(
            vec![Step::open_door("gate", true), Step::wait(1.0)],
            vec![door],
        );

        // Act
        f.stage.tick(DT);
        let index_while_opening = f.stage.progress().index;
        f.stage.tick(DT);

        // Assert
        assert_eq!(index_while_opening, Some(0));
        assert_eq!(f.stage.progress().index, Some(1));
        let door = f.stage.door(&DoorId::new("gate")).unwrap().borrow();
        assert!(door.is_open());
        assert!(!door.is_locked());
        assert!((door.angle() - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_auto_animation_waits_for_the_clip_to_finish() {
        // Arrange
        let mut f = fixture(
            vec![Step::play_animation(AnimationStateId::Victory, 0.0)],
            Vec::new(),
        );
        f.stage.tick(DT);
        assert_eq!(
            f.stage.animation().borrow().current_state_id(),
            Some(AnimationStateId::Victory)
        );

        // Act
        for _ in 0..3 {
            f.animator.advance(DT);
            f.stage.tick(DT);
            assert!(f.stage.progress().running);
        }
        f.animator.advance(DT);
        f.stage.tick(DT);

        // Assert
        assert!(!f.stage.progress().running);
        assert_eq!(f.stage.progress().index, Some(1));
    }

    #[test]
    fn test_auto_animation_holds_while_blending() {
        // Arrange
        let mut f = fixture(
            vec![Step::play_animation(AnimationStateId::Victory, 0.0)],
            Vec::new(),
        );
        f.stage.tick(DT);

        // Act
        f.animator.set_normalized_time(1.0);
        f.animator.set_in_transition(true);
        f.stage.tick(DT);
        let held = f.stage.progress().running;
        f.animator.set_in_transition(false);
        f.stage.tick(DT);

        // Assert
        assert!(held);
        assert!(!f.stage.progress().running);
    }

    #[test]
    fn test_auto_animation_shorter_than_a_frame_still_finishes() {
        // Arrange
        let mut f = fixture(
            vec![
                Step::wait(0.5),
                Step::play_animation(AnimationStateId::Pointing, 0.0),
            ],
            Vec::new(),
        );
        f.stage.tick(DT);
        assert_eq!(f.stage.progress().index, Some(1));

        // Act
        f.animator.advance(DT);
        f.stage.tick(DT);
        f.animator.advance(DT);
        f.stage.tick(DT);

        // Assert
        assert!(!f.stage.progress().running);
        assert_eq!(f.stage.progress().index, Some(2));
    }

    #[test]
    fn test_stop_halts_the_guide_and_ignores_a_later_arrival() {
        // Arrange
        let mut f = fixture(
            vec![Step::move_to(Vec3::new(3.0, 0.0, 0.0)), Step::wait(1.0)],
            Vec::new(),
        );
        f.stage.tick(DT);
        let walk = f.stage.sequencer().cursor().active_token().unwrap();
        assert!(f.stage.guide().borrow().is_moving());

        // Act
        let stopped = f.stage.stop_story();
        f.stage.tick(DT);
        let moving_after_stop = f.stage.guide().borrow().is_moving();
        let navigation_stopped = f.navigation.is_stopped();
        let state_after_stop = f.stage.animation().borrow().current_state_id();
        f.stage
            .guide()
            .borrow_mut()
            .go_to(Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        f.navigation.arrive();
        f.stage.tick(DT);

        // Assert
        assert!(stopped);
        assert!(!moving_after_stop);
        assert!(navigation_stopped);
        assert_eq!(state_after_stop, Some(AnimationStateId::Idle));
        assert!(!f.stage.progress().running);
        assert_eq!(f.stage.progress().index, Some(0));
        assert_eq!(ignored_tokens(&f.stage), vec![walk.generation()]);
    }

    #[test]
    fn test_restart_mid_walk_ignores_the_first_run_arrival() {
        // Arrange
        let mut f = fixture(
            vec![Step::move_to(Vec3::new(3.0, 0.0, 0.0)), Step::wait(2.0)],
            Vec::new(),
        );
        f.stage.tick(DT);
        let first_run = f.stage.sequencer().cursor().active_token().unwrap();

        // Act
        f.stage.stop_story();
        f.stage.start_story().unwrap();
        let second_run = f.stage.sequencer().cursor().active_token().unwrap();
        f.navigation.arrive();
        f.stage.tick(DT);

        // Assert
        assert_ne!(first_run, second_run);
        assert_eq!(ignored_tokens(&f.stage), vec![first_run.generation()]);
        assert_eq!(f.stage.progress().index, Some(1));
        assert!(f.stage.progress().running);

        run(&mut f.stage, 3);
        assert_eq!(f.stage.progress().index, Some(1));
        f.stage.tick(DT);
        assert!(!f.stage.progress().running);
    }

    #[test]
    fn test_door_opening_after_its_step_moved_on_is_ignored() {
        // Arrange
        let door = DoorController::new(
            DoorId::new("vault"),
            DoorConfig {
                start_locked: true,
                open_duration: 0.5,
                ..DoorConfig::default()
            },
        );
        let mut f = fixture(
            vec![Step::open_door("vault", false), Step::wait(5.0)],
            vec![door],
        );
        f.stage.tick(DT);
        assert_eq!(f.stage.progress().index, Some(1));
        let vault = Rc::clone(f.stage.door(&DoorId::new("vault")).unwrap());

        // Act
        vault.borrow_mut().unlock().unwrap();
        vault.borrow_mut().try_open().unwrap();
        f.stage.tick(DT);

        // Assert
        assert!(vault.borrow().is_open());
        assert_eq!(ignored_tokens(&f.stage).len(), 1);
        assert_eq!(f.stage.progress().index, Some(1));
        assert!(f.stage.progress().running);

        run(&mut f.stage, 8);
        assert!(f.stage.progress().running);
        f.stage.tick(DT);
        assert!(!f.stage.progress().running);
    }

    #[test]
    fn test_unlock_first_waits_on_a_door_already_opening() {
        // Arrange
        let door = DoorController::new(
            DoorId::new("gate"),
            DoorConfig {
                open_duration: 1.0,
                ..DoorConfig::default()
            },
        );
        let mut f = fixture(vec![Step::open_door("gate", true)], vec![door]);
        let gate = Rc::clone(f.stage.door(&DoorId::new("gate")).unwrap());
        gate.borrow_mut().try_open().unwrap();

        // Act
        f.stage.tick(DT);
        let index_while_opening = f.stage.progress().index;
        f.stage.tick(DT);

        // Assert
        assert_eq!(index_while_opening, Some(0));
        assert!(gate.borrow().is_open());
        assert_eq!(f.stage.progress().index, Some(1));
        assert_eq!(
            f.stage
                .sequencer()
                .events()
                .iter()
                .filter(|event| event.kind.event_type() == "story.step_skipped")
                .count(),
            0
        );
    }

    #[test]
    fn test_hazard_warning_does_not_stall_a_walk() {
        // Arrange
        let mut f = fixture(
            vec![Step::move_to(Vec3::new(5.0, 0.0, 0.0)), Step::wait(1.0)],
            Vec::new(),
        );
        let hazard = f
            .stage
            .add_hazard(HazardWarning::with_cooldown(AudioClipRef::new("careful"), 1.0));
        f.stage.tick(DT);

        // Act
        let warned = f.stage.visitor_entered(hazard);
        run(&mut f.stage, 2);
        f.navigation.arrive();
        f.stage.tick(DT);

        // Assert
        assert!(warned);
        assert_eq!(f.stage.progress().index, Some(1));
        assert_eq!(f.navigation.destinations().len(), 2);
    }

    #[test]
    fn test_story_waits_for_an_explicit_start_without_auto_start() {
        // Arrange
        let animation = Rc::new(RefCell::new(AnimationStateMachine::with_standard_states(
            Box::new(RecordingAnimator::new()),
        )));
        let guide = GuideAgent::new(GuideConfig::default(), Rc::clone(&animation));
        let mut stage = TourStage::new(
            StoryConfig { auto_start: false },
            Script::from_steps(vec![Step::wait(1.0)]),
            animation,
            guide,
        );

        // Act
        run(&mut stage, 4);

        // Assert
        assert_eq!(stage.progress().index, None);
        stage.start_story().unwrap();
        assert_eq!(stage.progress().index, Some(0));
    }

    #[test]
    fn test_finished_story_can_be_replayed() {
        // Arrange
        let mut f = fixture(vec![Step::wait(0.5)], Vec::new());
        f.stage.tick(DT);
        assert!(!f.stage.progress().running);

        // Act
        f.stage.start_story().unwrap();

        // Assert
        assert!(f.stage.progress().running);
        assert_eq!(f.stage.progress().index, Some(0));
        assert!(f.stage.stop_story());
        assert!(!f.stage.progress().running);
    }
}
