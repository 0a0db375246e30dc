//! Central registry of live Interactants
//!
//! The registry owns every Interactant, the pending-choice map, the view
//! locks and the tick scheduler. All state changes happen on the tick thread,
//! either from [`NpcRegistry::tick`] or from the public operations the host
//! calls between ticks. Chat from other threads arrives through a
//! [`ChatSender`] and is only interpreted when the next tick drains it.

use std::collections::HashMap;

use glam::Vec3;
use mystic_core::{EntityId, Pose, Scheduler, TaskHandle, Tick};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::chat::{classify, ChatInbox, ChatResponse, ChatSender};
use crate::config::{EngineConfig, MessagesConfig};
use crate::effects::Effect;
use crate::error::{AdminError, SpawnError};
use crate::npc::archetype::ArchetypeTable;
use crate::npc::dialogue::{NarrativeAnimator, QuestionAnimator};
use crate::npc::spawn::find_spawn_pose;
use crate::npc::view_lock::ViewLocks;
use crate::npc::{Interactant, InteractantId, InteractantSummary, Phase, Script};
use crate::world::{BodyHandle, Messenger, MovementParams, QuestGranter, StatusKind, WorldAdapter};

/// Lateral offset applied to every third approach step
const APPROACH_JITTER: f32 = 0.25;
/// Distance covered by one backward step
const RETREAT_STRIDE: f32 = 1.0;
/// Longest move a target with a pending choice may make
const MAX_PENDING_MOVE: f32 = 0.2;
const WALK_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    UpdateSweep,
    SpawnSweep,
    ApproachStep(InteractantId),
    DialogueStep(InteractantId),
    GrantQuest(InteractantId),
    DespawnWithEffects(InteractantId),
    RetreatStep(InteractantId),
    DespawnTimeout(InteractantId),
}

/// A body walking off after its Interactant was dismissed for distance or time
#[derive(Debug, Clone, Copy)]
struct Departure {
    body: BodyHandle,
    target: EntityId,
    pose: Pose,
    steps: u32,
    task: TaskHandle,
}

/// Owns all live NPCs and drives them from a single tick thread
pub struct NpcRegistry<W, M, Q> {
    world: W,
    messenger: M,
    quests: Q,
    config: EngineConfig,
    messages: MessagesConfig,
    archetypes: ArchetypeTable,
    notify_sound: Effect,
    rng: StdRng,
    scheduler: Scheduler<TimerEvent>,
    inbox: ChatInbox,
    active: HashMap<InteractantId, Interactant>,
    pending_choices: HashMap<EntityId, InteractantId>,
    locks: ViewLocks,
    departing: HashMap<InteractantId, Departure>,
    sweeps: Vec<TaskHandle>,
}

impl<W: WorldAdapter, M: Messenger, Q: QuestGranter> NpcRegistry<W, M, Q> {
    /// Idle registry with built-in archetypes and default messages
    pub fn new(world: W, messenger: M, quests: Q, config: EngineConfig) -> Self {
        let notify_sound = Effect::from_name(&config.notification.sound, Effect::VillagerAmbient);
        Self {
            world,
            messenger,
            quests,
            config,
            messages: MessagesConfig::default(),
            archetypes: ArchetypeTable::builtin(),
            notify_sound,
            rng: StdRng::from_entropy(),
            scheduler: Scheduler::new(),
            inbox: ChatInbox::new(),
            active: HashMap::new(),
            pending_choices: HashMap::new(),
            locks: ViewLocks::new(),
            departing: HashMap::new(),
            sweeps: Vec::new(),
        }
    }

    /// Replace the player-facing text
    pub fn with_messages(mut self, messages: MessagesConfig) -> Self {
        self.messages = messages;
        self
    }

    /// Replace the archetype table
    pub fn with_archetypes(mut self, archetypes: ArchetypeTable) -> Self {
        self.archetypes = archetypes;
        self
    }

    /// Deterministic randomness for reproducible runs
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// World collaborator
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable world collaborator
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Messenger collaborator
    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Quest collaborator
    pub fn quests(&self) -> &Q {
        &self.quests
    }

    /// Engine tuning in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current scheduler tick
    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    /// Live timer count, sweeps included
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Active Interactant by id
    pub fn get(&self, id: InteractantId) -> Option<&Interactant> {
        self.active.get(&id)
    }

    /// Active Interactant bound to `target`
    pub fn interactant_for(&self, target: EntityId) -> Option<&Interactant> {
        self.active.values().find(|i| i.target == target)
    }

    /// Number of active Interactants
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether `target`'s view is held by an NPC
    pub fn is_locked(&self, target: EntityId) -> bool {
        self.locks.is_locked(target)
    }

    /// Whether `target` has an unanswered offer
    pub fn has_pending_choice(&self, target: EntityId) -> bool {
        self.pending_choices.contains_key(&target)
    }

    /// Handle for submitting chat from any thread
    pub fn chat_sender(&self) -> ChatSender {
        self.inbox.sender()
    }

    /// Schedule the periodic update and spawn sweeps. Calling twice is a no-op.
    pub fn start(&mut self) {
        if !self.sweeps.is_empty() {
            return;
        }
        let update = self.config.update_period_ticks;
        self.sweeps
            .push(self.scheduler.schedule_repeating(update, update, TimerEvent::UpdateSweep));
        let interval = self.config.spawn_interval_ticks();
        self.sweeps
            .push(self.scheduler.schedule_repeating(20, interval, TimerEvent::SpawnSweep));
        info!(
            "NPC engine started: spawn sweep every {} ticks, {} archetypes",
            interval,
            self.archetypes.len()
        );
    }

    /// Advance one tick: interpret queued chat, then run every due timer
    pub fn tick(&mut self) -> Tick {
        for message in self.inbox.drain() {
            if !self.has_pending_choice(message.target) {
                continue;
            }
            match classify(&message.text) {
                Some(ChatResponse::Accept) => {
                    self.on_accept(message.target);
                }
                Some(ChatResponse::Reject) => {
                    self.on_reject(message.target);
                }
                None => {}
            }
        }

        let now = self.scheduler.advance();
        while let Some((handle, event)) = self.scheduler.pop_due() {
            self.dispatch(handle, event);
        }
        now
    }

    fn dispatch(&mut self, handle: TaskHandle, event: TimerEvent) {
        match event {
            TimerEvent::UpdateSweep => self.update_all(),
            TimerEvent::SpawnSweep => self.spawn_sweep(),
            TimerEvent::ApproachStep(id) => self.approach_step(id, handle),
            TimerEvent::DialogueStep(id) => self.dialogue_step(id, handle),
            TimerEvent::GrantQuest(id) => self.grant_quest(id, handle),
            TimerEvent::DespawnWithEffects(id) => {
                if let Some(interactant) = self.active.get_mut(&id) {
                    if interactant.dialogue_task == Some(handle) {
                        interactant.dialogue_task = None;
                        self.destroy(id, Some(Effect::DespawnBurst));
                    }
                }
            }
            TimerEvent::RetreatStep(id) => self.retreat_step(id, handle),
            TimerEvent::DespawnTimeout(id) => self.despawn_timeout(id, handle),
        }
    }

    // -- Spawning ------------------------------------------------------------

    fn spawn_sweep(&mut self) {
        let chance = self.config.spawn_chance_percent.min(100);
        for target in self.world.online_targets() {
            if self.interactant_for(target).is_some() {
                continue;
            }
            if self.rng.gen_range(0..100) >= chance {
                continue;
            }
            if let Err(err) = self.try_spawn_for(target, None) {
                if self.config.debug {
                    debug!("Spawn sweep skipped {}: {}", target, err);
                }
            }
        }
    }

    /// Spawn an NPC for `target`, optionally of a named archetype.
    ///
    /// Fails without touching any state if the target already has an NPC,
    /// is offline, or no clear spot is found. An unknown archetype name
    /// falls back to the default figure.
    pub fn try_spawn_for(
        &mut self,
        target: EntityId,
        archetype: Option<&str>,
    ) -> Result<InteractantId, SpawnError> {
        if self.interactant_for(target).is_some() {
            return Err(SpawnError::TargetEngaged(target));
        }
        let target_pose = self
            .world
            .target_pose(target)
            .ok_or(SpawnError::TargetOffline(target))?;

        let archetype = match archetype {
            Some(key) => self.archetypes.resolve(key),
            None => self
                .archetypes
                .choose(&mut self.rng)
                .cloned()
                .ok_or(SpawnError::NoArchetypes)?,
        };

        let attempts = self.config.spawn_attempts;
        let pose = find_spawn_pose(
            &self.world,
            target_pose.position,
            self.config.spawn_distance,
            attempts,
            &mut self.rng,
        )
        .ok_or(SpawnError::NoClearPosition { target, attempts })?;

        let body = self
            .world
            .spawn_entity(&archetype, pose)
            .ok_or(SpawnError::EntityRefused)?;

        let mut interactant = Interactant::new(archetype, target, body, pose, self.scheduler.now());
        let id = interactant.id;
        interactant.timeout_task = Some(
            self.scheduler
                .schedule_once(self.config.despawn_time_ticks(), TimerEvent::DespawnTimeout(id)),
        );
        debug!(
            "Spawned {} ({}) for target {} at {:?}",
            id, interactant.archetype.key, target, pose.position
        );
        self.active.insert(id, interactant);
        Ok(id)
    }

    // -- Periodic update -----------------------------------------------------

    /// Refresh every Interactant: disconnects, distance timeout, approach
    /// start, view-lock policy and the proximity notification.
    pub fn update_all(&mut self) {
        let ids: Vec<InteractantId> = self.active.keys().copied().collect();
        for id in ids {
            self.update_one(id);
        }
    }

    fn update_one(&mut self, id: InteractantId) {
        let Some(interactant) = self.active.get(&id) else {
            return;
        };
        let target = interactant.target;
        let body = interactant.body;
        let phase = interactant.phase;
        let last_pose = interactant.pose;

        let Some(target_pose) = self.world.target_pose(target) else {
            debug!("Target {} went offline, removing {}", target, id);
            self.destroy(id, None);
            return;
        };
        let pose = self.world.entity_pose(body).unwrap_or(last_pose);
        let notified = match self.active.get_mut(&id) {
            Some(interactant) => {
                interactant.pose = pose;
                interactant.notified_target
            }
            None => return,
        };
        let distance = pose.distance(&target_pose);

        if phase == Phase::Rejecting {
            return;
        }
        if distance > self.config.abandon_radius && !phase.is_conversing() {
            debug!("{} lost target {} at distance {:.1}", id, target, distance);
            let text = self.messages.quest_timeout.clone();
            self.abandon(id, &text);
            return;
        }

        if phase == Phase::Spawned {
            self.begin_approach(id);
        }

        if phase == Phase::AwaitingChoice && distance <= self.config.engagement_radius {
            self.locks.lock(&mut self.world, target, id, pose.position);
        } else if !phase.is_conversing() {
            self.locks.unlock(&mut self.world, target, id);
        }

        if !notified && distance < self.config.abandon_radius / 2.0 {
            self.notify_proximity(id, target_pose.position);
        }
    }

    fn notify_proximity(&mut self, id: InteractantId, position: Vec3) {
        if let Some(interactant) = self.active.get_mut(&id) {
            interactant.notified_target = true;
        }
        let notification = &self.config.notification;
        if !notification.enabled {
            return;
        }
        self.world.play_effect(self.notify_sound, position);
        if notification.particles {
            self.world.play_effect(Effect::NotifyParticles, position);
        }
    }

    // -- Approach ------------------------------------------------------------

    fn begin_approach(&mut self, id: InteractantId) {
        let Some(interactant) = self.active.get_mut(&id) else {
            return;
        };
        let period = self.config.approach_period_ticks;
        interactant.phase = Phase::Approaching;
        interactant.approach_steps = 0;
        interactant.motion_task = Some(self.scheduler.schedule_repeating(
            period,
            period,
            TimerEvent::ApproachStep(id),
        ));
    }

    fn stop_motion(&mut self, id: InteractantId) {
        if let Some(task) = self.active.get_mut(&id).and_then(|i| i.motion_task.take()) {
            self.scheduler.cancel(task);
        }
    }

    fn approach_step(&mut self, id: InteractantId, handle: TaskHandle) {
        let Some(interactant) = self.active.get(&id) else {
            self.scheduler.cancel(handle);
            return;
        };
        if interactant.motion_task != Some(handle) || interactant.phase != Phase::Approaching {
            self.scheduler.cancel(handle);
            return;
        }
        let target = interactant.target;
        let body = interactant.body;

        let Some(target_pose) = self.world.target_pose(target) else {
            self.stop_motion(id);
            return;
        };
        let Some(pose) = self.world.entity_pose(body) else {
            self.destroy(id, None);
            return;
        };

        let facing = pose.looking_at(target_pose.position);
        self.world.set_facing(body, facing.yaw, facing.pitch);
        let distance = pose.distance(&target_pose);
        let steps = match self.active.get_mut(&id) {
            Some(interactant) => {
                interactant.pose = facing;
                interactant.approach_steps += 1;
                interactant.approach_steps
            }
            None => return,
        };

        if distance <= self.config.approach_radius {
            self.stop_motion(id);
            self.begin_offer(id);
            return;
        }

        let mut destination = target_pose.position;
        if steps % 3 == 0 {
            destination.x += self.rng.gen_range(-APPROACH_JITTER..=APPROACH_JITTER);
            destination.z += self.rng.gen_range(-APPROACH_JITTER..=APPROACH_JITTER);
        }
        self.world.move_to(body, destination, WALK_SPEED);

        if steps % 5 == 0 {
            self.world.play_effect(Effect::ApproachTrail, pose.position);
        }
        if steps % 8 == 0 {
            self.world.play_effect(Effect::ApproachShimmer, pose.position);
        }
        if steps % 16 == 0 {
            self.world.play_effect(Effect::ApproachHum, pose.position);
        }

        if steps >= self.config.approach_step_budget {
            debug!("{} gave up approaching after {} steps", id, steps);
            self.stop_motion(id);
        }
    }

    // -- Dialogue ------------------------------------------------------------

    fn begin_offer(&mut self, id: InteractantId) {
        let Some(interactant) = self.active.get_mut(&id) else {
            return;
        };
        if interactant.phase != Phase::Approaching {
            return;
        }
        interactant.phase = Phase::AwaitingChoice;
        interactant.script = Some(Script::Question(QuestionAnimator::new(
            &interactant.archetype.name,
            &interactant.archetype.story,
            self.config.question_hold_firings,
            self.config.choice_text_budget,
            &self.messages.choice_prompt,
        )));
        let period = self.config.dialogue_period_ticks;
        interactant.dialogue_task = Some(self.scheduler.schedule_repeating(
            period,
            period,
            TimerEvent::DialogueStep(id),
        ));
        let target = interactant.target;
        let position = interactant.pose.position;

        self.pending_choices.insert(target, id);
        self.world.play_effect(Effect::OfferOpened, position);
        debug!("{} is offering a quest to {}", id, target);
    }

    fn dialogue_step(&mut self, id: InteractantId, handle: TaskHandle) {
        let Some(interactant) = self.active.get_mut(&id) else {
            self.scheduler.cancel(handle);
            return;
        };
        if interactant.dialogue_task != Some(handle) {
            self.scheduler.cancel(handle);
            return;
        }
        let target = interactant.target;
        let position = interactant.pose.position;

        let (frame, narrative, finished) = match interactant.script.as_mut() {
            Some(Script::Question(animator)) => (animator.fire(), false, false),
            Some(Script::Narrative(animator)) => {
                let frame = animator.fire();
                (frame, true, animator.is_complete())
            }
            None => {
                interactant.dialogue_task = None;
                self.scheduler.cancel(handle);
                return;
            }
        };

        if finished {
            self.scheduler.cancel(handle);
            interactant.script = None;
            interactant.dialogue_task = Some(self.scheduler.schedule_once(
                self.config.post_story_dwell_ticks,
                TimerEvent::GrantQuest(id),
            ));
        }

        self.messenger.notify(target, &frame.text);
        if let Some(cue) = frame.cue {
            self.world.play_effect(cue, position);
        }
        // The narrative keeps the target facing the NPC
        if narrative {
            self.locks.lock(&mut self.world, target, id, position);
        }
    }

    fn grant_quest(&mut self, id: InteractantId, handle: TaskHandle) {
        let Some(interactant) = self.active.get(&id) else {
            return;
        };
        if interactant.dialogue_task != Some(handle) {
            return;
        }
        let target = interactant.target;
        let archetype = interactant.archetype.clone();

        if self.world.target_pose(target).is_none() {
            self.destroy(id, None);
            return;
        }

        self.quests.grant_quest(target, &archetype);
        let text = &self.messages.quest_accepted;
        self.messenger.notify(target, text);
        self.messenger.send_chat(target, &self.messages.chat(text));
        self.locks.unlock(&mut self.world, target, id);

        let despawn = self.scheduler.schedule_once(
            self.config.accept_despawn_delay_ticks,
            TimerEvent::DespawnWithEffects(id),
        );
        if let Some(interactant) = self.active.get_mut(&id) {
            interactant.quest_granted = true;
            interactant.dialogue_task = Some(despawn);
        }
        info!("Target {} accepted a quest from {}", target, archetype.key);
    }

    /// Resolve `target`'s pending choice as accepted. No-op without one.
    pub fn on_accept(&mut self, target: EntityId) -> bool {
        let Some(id) = self.pending_choices.remove(&target) else {
            return false;
        };
        let Some(interactant) = self.active.get_mut(&id) else {
            return false;
        };
        if let Some(task) = interactant.dialogue_task.take() {
            self.scheduler.cancel(task);
        }
        interactant.phase = Phase::StoryPlaying;
        interactant.script = Some(Script::Narrative(NarrativeAnimator::new(
            &interactant.archetype.name,
            &self.messages.quest_accepted_story,
        )));
        let period = self.config.dialogue_period_ticks;
        interactant.dialogue_task = Some(self.scheduler.schedule_repeating(
            period,
            period,
            TimerEvent::DialogueStep(id),
        ));
        let position = interactant.pose.position;

        self.world.play_effect(Effect::Accepted, position);
        debug!("Target {} accepted the offer from {}", target, id);
        true
    }

    /// Resolve `target`'s pending choice as rejected. No-op without one.
    pub fn on_reject(&mut self, target: EntityId) -> bool {
        let Some(id) = self.pending_choices.remove(&target) else {
            return false;
        };
        if !self.active.contains_key(&id) {
            return false;
        }
        debug!("Target {} rejected the offer from {}", target, id);
        let text = self.messages.quest_declined.clone();
        self.dismiss(id, &text);
        true
    }

    // -- Dismissal -----------------------------------------------------------

    fn send_terminal(&mut self, target: EntityId, text: &str) {
        self.messenger.notify(target, text);
        self.messenger.send_chat(target, &self.messages.chat(text));
    }

    /// Reject path: message, unlock, then walk backwards and vanish
    fn dismiss(&mut self, id: InteractantId, text: &str) {
        let Some(interactant) = self.active.get_mut(&id) else {
            return;
        };
        for task in [interactant.motion_task.take(), interactant.dialogue_task.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(task);
        }
        interactant.script = None;
        interactant.phase = Phase::Rejecting;
        interactant.retreat_steps = 0;
        let target = interactant.target;
        let position = interactant.pose.position;

        self.send_terminal(target, text);
        self.world.play_effect(Effect::Declined, position);
        self.locks.unlock(&mut self.world, target, id);

        if self.world.target_pose(target).is_none() {
            self.destroy(id, Some(Effect::DespawnBurst));
            return;
        }
        let period = self.config.retreat_period_ticks;
        let task = self
            .scheduler
            .schedule_repeating(period, period, TimerEvent::RetreatStep(id));
        if let Some(interactant) = self.active.get_mut(&id) {
            interactant.motion_task = Some(task);
        }
    }

    /// Timeout dismissal: the Interactant leaves the registry right away and
    /// its body walks off on its own.
    fn abandon(&mut self, id: InteractantId, text: &str) {
        let Some(interactant) = self.detach(id) else {
            return;
        };
        let target = interactant.target;
        let body = interactant.body;
        let pose = self.world.entity_pose(body).unwrap_or(interactant.pose);

        self.send_terminal(target, text);
        self.world.play_effect(Effect::Declined, pose.position);

        if self.world.target_pose(target).is_some() && self.config.retreat_steps > 0 {
            let period = self.config.retreat_period_ticks;
            let task = self
                .scheduler
                .schedule_repeating(period, period, TimerEvent::RetreatStep(id));
            self.departing.insert(
                id,
                Departure {
                    body,
                    target,
                    pose,
                    steps: 0,
                    task,
                },
            );
        } else {
            self.world.destroy_entity(body);
            self.world.play_effect(Effect::DespawnBurst, pose.position);
        }
        debug!("{} abandoned target {}", id, target);
    }

    /// One backward step away from the target, still facing it
    fn walk_back(&mut self, body: BodyHandle, target: EntityId) -> Option<Pose> {
        let target_pose = self.world.target_pose(target)?;
        let pose = self.world.entity_pose(body)?;

        let mut away = pose.position - target_pose.position;
        away.y = 0.0;
        let away = away.normalize_or_zero();
        self.world
            .move_to(body, pose.position + away * RETREAT_STRIDE, WALK_SPEED);

        let facing = pose.looking_at(target_pose.position);
        self.world.set_facing(body, facing.yaw, facing.pitch);
        self.world.play_effect(Effect::RetreatSmoke, pose.position);
        Some(facing)
    }

    fn retreat_step(&mut self, id: InteractantId, handle: TaskHandle) {
        if let Some(interactant) = self.active.get(&id) {
            if interactant.motion_task != Some(handle) || interactant.phase != Phase::Rejecting {
                self.scheduler.cancel(handle);
                return;
            }
            let body = interactant.body;
            let target = interactant.target;
            let Some(pose) = self.walk_back(body, target) else {
                self.destroy(id, Some(Effect::DespawnBurst));
                return;
            };
            let steps = match self.active.get_mut(&id) {
                Some(interactant) => {
                    interactant.pose = pose;
                    interactant.retreat_steps += 1;
                    interactant.retreat_steps
                }
                None => return,
            };
            if steps >= self.config.retreat_steps {
                self.destroy(id, Some(Effect::DespawnBurst));
            }
            return;
        }

        let Some(departure) = self.departing.get(&id).copied() else {
            self.scheduler.cancel(handle);
            return;
        };
        if departure.task != handle {
            self.scheduler.cancel(handle);
            return;
        }
        let walked = self.walk_back(departure.body, departure.target);
        let steps = departure.steps + 1;
        if let (Some(pose), Some(entry)) = (walked, self.departing.get_mut(&id)) {
            entry.pose = pose;
            entry.steps = steps;
        }
        if walked.is_none() || steps >= self.config.retreat_steps {
            self.finish_departure(id);
        }
    }

    fn finish_departure(&mut self, id: InteractantId) {
        let Some(departure) = self.departing.remove(&id) else {
            return;
        };
        self.scheduler.cancel(departure.task);
        let position = self
            .world
            .entity_pose(departure.body)
            .map_or(departure.pose.position, |p| p.position);
        self.world.destroy_entity(departure.body);
        self.world.play_effect(Effect::DespawnBurst, position);
    }

    fn despawn_timeout(&mut self, id: InteractantId, handle: TaskHandle) {
        let Some(interactant) = self.active.get_mut(&id) else {
            return;
        };
        if interactant.timeout_task != Some(handle) {
            return;
        }
        interactant.timeout_task = None;
        if matches!(interactant.phase, Phase::Spawned | Phase::Approaching) {
            debug!("{} timed out waiting for {}", id, interactant.target);
            let text = self.messages.quest_timeout.clone();
            self.abandon(id, &text);
        }
    }

    // -- Destruction ---------------------------------------------------------

    /// Cancel timers, release the lock and pending choice, and take the
    /// Interactant out of the registry. The body is left to the caller.
    fn detach(&mut self, id: InteractantId) -> Option<Interactant> {
        let interactant = self.active.get_mut(&id)?;
        // Approach or retreat first, then dialogue, then the timeout
        for task in [
            interactant.motion_task.take(),
            interactant.dialogue_task.take(),
            interactant.timeout_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.scheduler.cancel(task);
        }
        let target = interactant.target;

        self.locks.unlock(&mut self.world, target, id);
        if self.pending_choices.get(&target) == Some(&id) {
            self.pending_choices.remove(&target);
        }

        let mut interactant = self.active.remove(&id)?;
        interactant.phase = Phase::Despawned;
        interactant.script = None;
        Some(interactant)
    }

    fn destroy(&mut self, id: InteractantId, effect: Option<Effect>) -> bool {
        let Some(interactant) = self.detach(id) else {
            return false;
        };
        let position = self
            .world
            .entity_pose(interactant.body)
            .map_or(interactant.pose.position, |p| p.position);
        self.world.destroy_entity(interactant.body);
        if let Some(effect) = effect {
            self.world.play_effect(effect, position);
        }
        debug!(
            "Removed {} ({}) for target {}",
            id, interactant.archetype.key, interactant.target
        );
        true
    }

    // -- Administration ------------------------------------------------------

    /// Active list for the admin surface, ordered by id
    pub fn list_active(&self) -> Vec<InteractantSummary> {
        let mut interactants: Vec<&Interactant> = self.active.values().collect();
        interactants.sort_by_key(|i| i.id);
        interactants.iter().map(|i| i.summary()).collect()
    }

    /// Remove one NPC with despawn effects
    pub fn remove(&mut self, id: InteractantId) -> bool {
        self.destroy(id, Some(Effect::DespawnBurst))
    }

    /// Remove an NPC by its textual id
    pub fn remove_by_str(&mut self, text: &str) -> Result<InteractantId, AdminError> {
        let id = InteractantId::parse(text).ok_or_else(|| AdminError::MalformedId(text.to_string()))?;
        if self.remove(id) {
            Ok(id)
        } else {
            Err(AdminError::UnknownId(id.to_string()))
        }
    }

    /// Remove every NPC engaging `target`
    pub fn remove_all_for(&mut self, target: EntityId) -> usize {
        let ids: Vec<InteractantId> = self
            .active
            .values()
            .filter(|i| i.target == target)
            .map(|i| i.id)
            .collect();
        ids.into_iter().filter(|id| self.remove(*id)).count()
    }

    /// Abort `target`'s conversation without removing the NPC. The NPC idles
    /// until its timeout or the distance check dismisses it.
    pub fn clear_pending(&mut self, target: EntityId) -> bool {
        self.pending_choices.remove(&target);
        let Some(id) = self.interactant_for(target).map(|i| i.id) else {
            return false;
        };
        let Some(interactant) = self.active.get_mut(&id) else {
            return false;
        };

        let cleared = interactant.phase.is_conversing() && !interactant.quest_granted;
        if cleared {
            if let Some(task) = interactant.dialogue_task.take() {
                self.scheduler.cancel(task);
            }
            interactant.script = None;
            interactant.phase = Phase::Approaching;
            if interactant.timeout_task.is_none() {
                interactant.timeout_task = Some(self.scheduler.schedule_once(
                    self.config.despawn_time_ticks(),
                    TimerEvent::DespawnTimeout(id),
                ));
            }
        }
        self.locks.unlock(&mut self.world, target, id);
        cleared
    }

    /// "Unstuck": drop any conversation and force default movement
    pub fn reset_target(&mut self, target: EntityId) {
        self.clear_pending(target);
        self.locks.release(&mut self.world, target);
        self.world.set_movement(target, MovementParams::default());
        for kind in StatusKind::LOCK_EFFECTS {
            self.world.clear_status(target, kind);
        }
        let text = self.messages.chat(&self.messages.unstuck);
        self.messenger.send_chat(target, &text);
        info!("Reset movement state for {}", target);
    }

    /// Platform quit hook
    pub fn handle_disconnect(&mut self, target: EntityId) {
        self.pending_choices.remove(&target);
        let ids: Vec<InteractantId> = self
            .active
            .values()
            .filter(|i| i.target == target)
            .map(|i| i.id)
            .collect();
        for id in ids {
            self.destroy(id, None);
        }
        let leaving: Vec<InteractantId> = self
            .departing
            .iter()
            .filter(|(_, d)| d.target == target)
            .map(|(id, _)| *id)
            .collect();
        for id in leaving {
            if let Some(departure) = self.departing.remove(&id) {
                self.scheduler.cancel(departure.task);
                self.world.destroy_entity(departure.body);
            }
        }
        self.locks.release(&mut self.world, target);
    }

    /// Whether a target may move from `from` to `to`. Targets owing a choice
    /// stay put.
    pub fn movement_allowed(&self, target: EntityId, from: Vec3, to: Vec3) -> bool {
        !self.has_pending_choice(target) || from.distance(to) <= MAX_PENDING_MOVE
    }

    /// Remove every NPC, release every lock and drop all timers
    pub fn shutdown(&mut self) {
        let ids: Vec<InteractantId> = self.active.keys().copied().collect();
        let count = ids.len();
        for id in ids {
            self.destroy(id, None);
        }
        for (_, departure) in self.departing.drain() {
            self.scheduler.cancel(departure.task);
            self.world.destroy_entity(departure.body);
        }
        self.locks.release_all(&mut self.world);
        self.pending_choices.clear();
        self.scheduler.clear();
        self.sweeps.clear();
        info!("NPC engine shut down, removed {} NPCs", count);
    }
}
