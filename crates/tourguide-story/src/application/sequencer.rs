//! The step sequencer.
//!
//! Walks a script one step at a time. Every dispatched step either arms
//! exactly one completion (a timer, an arrival, a door outcome or an
//! animation poll) or skips itself, so a finite script always runs out.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use tourguide_animation::{AnimationStateMachine, Transition};
use tourguide_core::clock::FrameClock;
use tourguide_core::error::StoryError;
use tourguide_core::ids::DoorId;
use tourguide_door::DoorController;
use tourguide_guide::GuideAgent;
use tracing::{debug, info, warn};

use crate::application::progress::StoryProgress;
use crate::application::timers::TimerQueue;
use crate::domain::cursor::{SequencerCursor, WaitToken};
use crate::domain::events::{StoryEvent, StoryEventKind};
use crate::domain::script::{Script, ScriptEntry};
use crate::domain::step::Step;

/// Shortest wait a timer-backed step will arm, in seconds.
pub const MIN_WAIT: f32 = 0.01;

type Inbox = Rc<RefCell<VecDeque<WaitToken>>>;

#[derive(Debug, Clone, Copy)]
struct AnimationPoll {
    token: WaitToken,
    // False until one poll has passed since a new clip was requested; the
    // animator may still report the previous clip until then.
    settled: bool,
}

/// Runs a script against the guide, its animation machine and the doors.
///
/// Collaborators are held weakly; one that has been dropped counts as
/// missing and makes the steps that need it skip.
#[derive(Debug)]
pub struct StepSequencer {
    script: Script,
    cursor: SequencerCursor,
    guide: Weak<RefCell<GuideAgent>>,
    animation: Weak<RefCell<AnimationStateMachine>>,
    doors: HashMap<DoorId, Weak<RefCell<DoorController>>>,
    timers: TimerQueue,
    poll: Option<AnimationPoll>,
    inbox: Inbox,
    clock: FrameClock,
    events: Vec<StoryEvent>,
}

impl StepSequencer {
    /// Creates a sequencer for `script` with no collaborators attached.
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            script,
            cursor: SequencerCursor::default(),
            guide: Weak::new(),
            animation: Weak::new(),
            doors: HashMap::new(),
            timers: TimerQueue::new(),
            poll: None,
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            clock: FrameClock::new(),
            events: Vec::new(),
        }
    }

    /// Attaches the guide.
    #[must_use]
    pub fn with_guide(mut self, guide: &Rc<RefCell<GuideAgent>>) -> Self {
        self.guide = Rc::downgrade(guide);
        self
    }

    /// Attaches the animation state machine used by `PlayAnimation` steps.
    #[must_use]
    pub fn with_animation(mut self, animation: &Rc<RefCell<AnimationStateMachine>>) -> Self {
        self.animation = Rc::downgrade(animation);
        self
    }

    /// Makes a door addressable by `DoorOpen` steps under its id.
    #[must_use]
    pub fn with_door(mut self, door: &Rc<RefCell<DoorController>>) -> Self {
        let id = door.borrow().id().clone();
        self.doors.insert(id, Rc::downgrade(door));
        self
    }

    /// Starts the story from its first step.
    ///
    /// Starting again after the story finished or was stopped replays it
    /// from the beginning.
    ///
    /// # Errors
    ///
    /// * `StoryError::AlreadyInProgress` if the story is running; nothing
    ///   changes.
    /// * `StoryError::EmptyScript` if there is nothing to run.
    pub fn start_story(&mut self) -> Result<(), StoryError> {
        if self.cursor.is_running() {
            debug!(step = ?self.cursor.index(), "story already running");
            return Err(StoryError::AlreadyInProgress(
                "story is already running".to_owned(),
            ));
        }
        if self.script.is_empty() {
            warn!("script has no steps, nothing to start");
            return Err(StoryError::EmptyScript);
        }

        self.cancel_pending();
        self.inbox.borrow_mut().clear();
        self.cursor.reset();

        let steps = self.script.len();
        info!(steps, "story started");
        self.record(StoryEventKind::StoryStarted { steps });
        self.skip_to_next();
        Ok(())
    }

    /// Stops a running story. Outstanding completions become stale and the
    /// guide abandons any walk and returns to idle. Returns whether a story
    /// was running.
    pub fn stop(&mut self) -> bool {
        if !self.cursor.is_running() {
            return false;
        }

        let index = self.cursor.index();
        self.cancel_pending();
        self.inbox.borrow_mut().clear();
        self.cursor.finish();
        if let Some(guide) = self.guide.upgrade() {
            guide.borrow_mut().halt();
        }

        info!(step = ?index, "story stopped");
        self.record(StoryEventKind::StoryStopped { index });
        true
    }

    /// Advances timers and polls by `dt` seconds, then delivers every
    /// completion queued since the last tick.
    pub fn tick(&mut self, dt: f32) {
        self.clock.advance(dt);

        let fired = self.timers.tick(dt.max(0.0));
        self.inbox.borrow_mut().extend(fired);
        self.poll_animation();

        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(token) = next else {
                break;
            };
            self.complete(token);
        }
    }

    /// Delivers a completion. Honoured only when `token` belongs to the
    /// step currently waiting; returns whether the story advanced.
    pub fn complete(&mut self, token: WaitToken) -> bool {
        if !self.cursor.is_current(token) {
            debug!(%token, "stale completion ignored");
            self.record(StoryEventKind::StaleCompletionIgnored {
                token: token.generation(),
            });
            return false;
        }

        if let Some(index) = self.cursor.index() {
            debug!(step = index, %token, "step completed");
            self.record(StoryEventKind::StepCompleted { index });
        }
        self.skip_to_next();
        true
    }

    fn skip_to_next(&mut self) {
        loop {
            self.cursor.invalidate();
            self.cancel_pending();

            let index = self.cursor.advance();
            let Some(entry) = self.script.get(index).cloned() else {
                self.finish();
                return;
            };

            let token = self.cursor.arm();
            let action = entry.step.action_name();
            info!(step = index, label = %entry.label, action, %token, "step started");
            self.record(StoryEventKind::StepStarted {
                index,
                label: entry.label.clone(),
                action,
            });

            match self.dispatch(index, &entry, token) {
                Ok(()) => return,
                Err(error) => {
                    warn!(step = index, label = %entry.label, %error, "skipping step");
                    self.record(StoryEventKind::StepSkipped {
                        index,
                        reason: error.to_string(),
                    });
                }
            }
        }
    }

    fn dispatch(
        &mut self,
        index: usize,
        entry: &ScriptEntry,
        token: WaitToken,
    ) -> Result<(), StoryError> {
        match &entry.step {
            Step::MoveTo { destination } => {
                let destination = destination.ok_or(StoryError::MissingStepData {
                    step: index,
                    field: "destination",
                })?;
                let guide = self.guide()?;
                let mut guide = guide.borrow_mut();
                guide.go_to(destination)?;

                let inbox = Rc::clone(&self.inbox);
                guide
                    .on_destination_reached()
                    .connect_once(move |()| inbox.borrow_mut().push_back(token));
            }
            Step::Talk { clip, extra_wait } => {
                let clip = clip.as_ref().ok_or(StoryError::MissingStepData {
                    step: index,
                    field: "clip",
                })?;
                let duration = self.guide()?.borrow_mut().speak(clip)?;
                let wait = (duration + extra_wait).max(MIN_WAIT);
                debug!(step = index, %clip, wait, "waiting for clip");
                self.timers.arm(token, wait);
            }
            Step::Wait { duration } => {
                self.timers.arm(token, duration.max(MIN_WAIT));
            }
            Step::PlayAnimation { state, duration } => {
                let animation = self
                    .animation
                    .upgrade()
                    .ok_or(StoryError::MissingCollaborator("animation state machine"))?;
                let transition = animation.borrow_mut().change_state(*state)?;

                if *duration > 0.0 {
                    self.timers.arm(token, *duration);
                } else {
                    let clip_seconds = animation.borrow().animator().state_length();
                    debug!(step = index, %state, clip_seconds, "waiting for clip to finish");
                    self.poll = Some(AnimationPoll {
                        token,
                        settled: transition == Transition::Unchanged,
                    });
                }
            }
            Step::DoorOpen { door, unlock_first } => {
                let id = door.as_ref().ok_or(StoryError::MissingStepData {
                    step: index,
                    field: "door",
                })?;
                let handle = self
                    .doors
                    .get(id)
                    .and_then(Weak::upgrade)
                    .ok_or(StoryError::MissingCollaborator("door"))?;
                let mut door = handle.borrow_mut();

                // An opening door is already unlocked and reports through opened.
                if *unlock_first && !door.is_animating() {
                    door.unlock()?;
                }
                if door.is_open() {
                    return Err(StoryError::AlreadyInProgress(format!(
                        "door {id} is already open"
                    )));
                }

                let inbox = Rc::clone(&self.inbox);
                door.on_opened()
                    .connect_once(move |_| inbox.borrow_mut().push_back(token));
                let inbox = Rc::clone(&self.inbox);
                door.on_open_failed()
                    .connect_once(move |_| inbox.borrow_mut().push_back(token));

                // Locked doors report through open_failed; an in-flight open
                // still reports through opened.
                if let Err(error) = door.try_open() {
                    debug!(step = index, door = %id, %error, "door did not start opening");
                }
            }
        }
        Ok(())
    }

    fn poll_animation(&mut self) {
        let Some(mut poll) = self.poll else {
            return;
        };
        let Some(animation) = self.animation.upgrade() else {
            warn!(token = %poll.token, "animation state machine dropped mid-step");
            self.poll = None;
            self.inbox.borrow_mut().push_back(poll.token);
            return;
        };

        let finished = poll.settled && animation.borrow().clip_finished();
        if finished {
            self.poll = None;
            self.inbox.borrow_mut().push_back(poll.token);
        } else {
            poll.settled = true;
            self.poll = Some(poll);
        }
    }

    fn finish(&mut self) {
        self.cursor.finish();
        self.cancel_pending();
        self.idle_guide();

        let steps = self.script.len();
        info!(steps, "story finished");
        self.record(StoryEventKind::StoryFinished { steps });
    }

    fn cancel_pending(&mut self) {
        self.timers.cancel_all();
        self.poll = None;
    }

    fn idle_guide(&self) {
        if let Some(guide) = self.guide.upgrade() {
            guide.borrow_mut().idle();
        }
    }

    fn guide(&self) -> Result<Rc<RefCell<GuideAgent>>, StoryError> {
        self.guide
            .upgrade()
            .ok_or(StoryError::MissingCollaborator("guide"))
    }

    fn record(&mut self, kind: StoryEventKind) {
        self.events.push(StoryEvent {
            frame: self.clock.frame(),
            elapsed: self.clock.elapsed(),
            kind,
        });
    }

    /// The cursor.
    #[must_use]
    pub fn cursor(&self) -> &SequencerCursor {
        &self.cursor
    }

    /// Whether a story is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.cursor.is_running()
    }

    /// The script being run.
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The entry under the cursor, if it is within the script.
    #[must_use]
    pub fn current_entry(&self) -> Option<&ScriptEntry> {
        self.cursor.index().and_then(|index| self.script.get(index))
    }

    /// Seconds of frame time seen by the sequencer.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    /// Snapshot of the story's position.
    #[must_use]
    pub fn progress(&self) -> StoryProgress {
        let entry = self.current_entry();
        StoryProgress {
            index: self.cursor.index(),
            total: self.script.len(),
            running: self.cursor.is_running(),
            label: entry.map(|entry| entry.label.clone()),
            action: entry.map(|entry| entry.step.action_name()),
        }
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[StoryEvent] {
        &self.events
    }

    /// Takes the recorded events, leaving the outbox empty.
    pub fn drain_events(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.events)
    }
}
