//! Headless runs: build a stage from a scene and tick it to the end.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tourguide_animation::AnimationStateMachine;
use tourguide_core::error::StoryError;
use tourguide_door::DoorController;
use tourguide_guide::{GuideAgent, HazardWarning};
use tourguide_story::application::progress::StoryProgress;
use tourguide_story::application::stage::TourStage;
use tourguide_story::domain::events::StoryEvent;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::config::RunConfig;
use crate::error::AppError;
use crate::scene::SceneFile;
use crate::sim::{SimulatedAnimator, SimulatedAudio, SimulatedNavigation};

/// Outcome of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier of this run, also attached to its log span.
    pub run_id: Uuid,
    /// Frames ticked.
    pub frames: u64,
    /// Simulated seconds.
    pub elapsed: f32,
    /// Whether the story ran past its last step.
    pub finished: bool,
    /// Where the story ended up.
    pub progress: StoryProgress,
    /// Every story event, in order.
    pub events: Vec<StoryEvent>,
}

impl RunReport {
    /// Renders the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Report` if serialization fails.
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A stage wired to simulated collaborators.
#[derive(Debug)]
pub struct Simulation {
    stage: TourStage,
    navigation: SimulatedNavigation,
    audio: SimulatedAudio,
    animator: SimulatedAnimator,
    // Sorted latest first so the next visit is at the end.
    hazard_visits: Vec<(f32, usize)>,
    elapsed: f32,
    frames: u64,
}

impl Simulation {
    /// Builds the stage described by `scene`. When the scene disables
    /// auto-start the story is started here instead.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Story` if the scene has no steps.
    pub fn from_scene(scene: &SceneFile) -> Result<Self, AppError> {
        if scene.steps.is_empty() {
            return Err(StoryError::EmptyScript.into());
        }

        let navigation = SimulatedNavigation::at(scene.guide_start);
        let audio = SimulatedAudio::new(scene.clips.clone());
        let animator = SimulatedAnimator::new(
            scene
                .animation_lengths
                .iter()
                .map(|(state, seconds)| (state.trigger_name().to_owned(), *seconds))
                .collect(),
        );

        let animation = Rc::new(RefCell::new(AnimationStateMachine::with_standard_states(
            Box::new(animator.clone()),
        )));
        let guide = GuideAgent::new(scene.guide.clone(), Rc::clone(&animation))
            .with_navigation(Box::new(navigation.clone()))
            .with_audio(Box::new(audio.clone()));

        let stage = TourStage::new(
            scene.story.clone(),
            scene.steps.clone(),
            animation,
            guide,
        );
        let mut stage = scene.doors.iter().fold(stage, |stage, door| {
            stage.with_door(DoorController::new(door.id.clone(), door.config.clone()))
        });
        stage.set_visitor(scene.visitor);

        let mut hazard_visits = Vec::new();
        for spec in &scene.hazards {
            let index = stage.add_hazard(HazardWarning::with_cooldown(
                spec.clip.clone(),
                spec.cooldown,
            ));
            hazard_visits.extend(spec.visitor_enters_at.iter().map(|at| (*at, index)));
        }
        hazard_visits.sort_by(|a, b| b.0.total_cmp(&a.0));

        if !scene.story.auto_start {
            stage.start_story()?;
        }

        Ok(Self {
            stage,
            navigation,
            audio,
            animator,
            hazard_visits,
            elapsed: 0.0,
            frames: 0,
        })
    }

    /// Runs one frame: the simulated world moves, due hazard visits happen,
    /// then the stage ticks.
    pub fn step(&mut self, dt: f32) {
        self.navigation.advance(dt);
        self.audio.advance(dt);
        self.animator.advance(dt);
        self.elapsed += dt;
        self.frames += 1;

        while let Some(&(at, index)) = self.hazard_visits.last() {
            if at > self.elapsed {
                break;
            }
            self.hazard_visits.pop();
            info!(hazard = index, at, "visitor entered hazard zone");
            self.stage.visitor_entered(index);
        }

        self.stage.tick(dt);
    }

    /// Whether the story ran past its last step.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage.progress().is_complete()
    }

    /// Simulated seconds so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames run so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The stage.
    #[must_use]
    pub fn stage(&self) -> &TourStage {
        &self.stage
    }

    /// Mutable access to the stage.
    pub fn stage_mut(&mut self) -> &mut TourStage {
        &mut self.stage
    }
}

/// Plays `scene` until the story finishes or `config.max_seconds` of
/// simulated time pass.
///
/// # Errors
///
/// Returns `AppError::Story` if the scene cannot be started.
pub async fn run_headless(scene: &SceneFile, config: &RunConfig) -> Result<RunReport, AppError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("tour_run", %run_id, tick_hz = config.tick_hz);
    run(scene, config, run_id).instrument(span).await
}

async fn run(scene: &SceneFile, config: &RunConfig, run_id: Uuid) -> Result<RunReport, AppError> {
    let mut simulation = Simulation::from_scene(scene)?;
    let dt = config.dt();
    let mut pacer = config.realtime.then(|| {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    info!(steps = scene.steps.len(), realtime = config.realtime, "tour run started");
    let mut events = Vec::new();
    loop {
        match pacer.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => tokio::task::yield_now().await,
        }

        simulation.step(dt);
        events.extend(simulation.stage_mut().sequencer_mut().drain_events());

        if simulation.is_finished() {
            break;
        }
        if simulation.elapsed() >= config.max_seconds {
            warn!(
                max_seconds = config.max_seconds,
                "tour run hit its time limit before the story finished"
            );
            break;
        }
    }

    let report = RunReport {
        run_id,
        frames: simulation.frames(),
        elapsed: simulation.elapsed(),
        finished: simulation.is_finished(),
        progress: simulation.stage().progress(),
        events,
    };
    info!(
        frames = report.frames,
        elapsed = report.elapsed,
        finished = report.finished,
        "tour run ended"
    );
    Ok(report)
}
