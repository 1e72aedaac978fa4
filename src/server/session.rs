//! Game session
//!
//! Drives a [`SimulationEngine`] on a fixed period. Each period applies the
//! buffered commands, advances simulated time unless the game is paused or
//! over, checks the limits, runs one tick and publishes a snapshot. Pausing
//! and game over are the only reasons a period skips its tick.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::game::constants::session::STATS_INTERVAL_SECS;
use crate::game::engine::SimulationEngine;
use crate::game::input::{Command, CommandBuffer, CommandSender, InputError};
use crate::game::scoreboard::{self, GameOverReason, Limits};
use crate::game::state::{GameEvent, GameRules, Slot};
use crate::server::performance::PerformanceMonitor;
use crate::server::snapshot::{SessionStatus, SnapshotTurnstile};

/// Events kept for subscribers that fall behind
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct Session {
    engine: SimulationEngine,
    commands: CommandBuffer,
    turnstile: Arc<SnapshotTurnstile>,
    events: broadcast::Sender<GameEvent>,
    limits: Limits,
    period: Duration,
    /// Simulated time; stands still while paused or over
    elapsed: Duration,
    /// Worm that paused the game
    paused_by: Option<Slot>,
    game_over: Option<GameOverReason>,
    pub performance: PerformanceMonitor,
}

impl Session {
    pub fn new(config: &ServerConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let engine = SimulationEngine::new(&config.terrain_params(), config.rules(), config.max_players, seed);
        Self::with_engine(engine, config.limits(), config.period())
    }

    pub fn with_engine(engine: SimulationEngine, limits: Limits, period: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            engine,
            commands: CommandBuffer::default(),
            turnstile: Arc::new(SnapshotTurnstile::new()),
            events,
            limits,
            period,
            elapsed: Duration::ZERO,
            paused_by: None,
            game_over: None,
            performance: PerformanceMonitor::new(period),
        }
    }

    /// Handle for submitting commands from other tasks
    pub fn sender(&self) -> CommandSender {
        self.commands.sender()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub fn turnstile(&self) -> Arc<SnapshotTurnstile> {
        Arc::clone(&self.turnstile)
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused_by.is_some()
    }

    pub fn game_over(&self) -> Option<GameOverReason> {
        self.game_over
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: Limits) {
        if self.limits != limits {
            self.limits = limits;
            self.engine.options_changed();
        }
    }

    pub fn set_rules(&mut self, rules: GameRules) {
        self.engine.set_rules(rules);
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            elapsed_millis: self.elapsed.as_millis() as u64,
            paused: self.is_paused(),
            game_over: self.game_over.is_some(),
        }
    }

    // ========================================================================
    // Period
    // ========================================================================

    /// Runs one period and returns its events in the order they happened
    pub fn step(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for command in self.commands.drain() {
            self.apply(command, &mut events);
        }

        if self.game_over.is_none() && self.paused_by.is_none() {
            self.elapsed += self.period;
            if let Some(reason) = scoreboard::check_game_over(self.engine.state(), &self.limits, self.elapsed) {
                info!("Game over ({:?}) after {}s", reason, self.elapsed.as_secs());
                self.game_over = Some(reason);
                events.push(GameEvent::GameOver { reason });
            }
            events.extend(self.engine.tick());
        }

        self.turnstile.publish(&self.engine, self.status());
        if self.events.receiver_count() > 0 {
            for event in &events {
                // Only fails once every receiver is gone
                let _ = self.events.send(event.clone());
            }
        }
        events
    }

    fn apply(&mut self, command: Command, events: &mut Vec<GameEvent>) {
        let result = match command {
            Command::Join { name, color_index } => match self.engine.join(&name, color_index) {
                Ok(_) => Ok(()),
                Err(e) => {
                    warn!("Join of '{}' rejected: {}", name, e);
                    Ok(())
                }
            },
            Command::Leave { slot } => self.engine.leave(slot).map(|()| self.after_departure(slot, events)),
            Command::Kick { slot, reason } => self
                .engine
                .kick(slot, reason)
                .map(|()| self.after_departure(slot, events)),
            Command::Controls { slot, controls, aim } => self.engine.set_controls(slot, controls, aim),
            Command::SelectWeapon { slot, index } => self.engine.select_weapon(slot, index),
            Command::RotateWeapon { slot, by } => self.engine.rotate_weapon(slot, by),
            Command::TogglePause { slot } => self.toggle_pause(slot, events),
        };
        if let Err(e) = result {
            debug!("Command ignored: {}", e);
        }
        // The engine queues administrative events until drained
        events.append(&mut self.engine.drain_events());
    }

    fn toggle_pause(&mut self, slot: Slot, events: &mut Vec<GameEvent>) -> Result<(), InputError> {
        if self.game_over.is_some() {
            return Ok(());
        }
        let name = self.engine.worm(slot).map(|worm| worm.name.clone());
        match self.paused_by {
            Some(pauser) if pauser == slot => {
                self.paused_by = None;
                let name = name.unwrap_or_default();
                info!("{} resumed the game", name);
                events.push(GameEvent::GameResumed { slot, name });
            }
            Some(pauser) => debug!("Worm {} cannot resume a pause of worm {}", slot, pauser),
            None => {
                let Some(remaining_pauses) = self.engine.spend_pause(slot)? else {
                    debug!("Worm {} has no pauses left", slot);
                    return Ok(());
                };
                self.paused_by = Some(slot);
                let name = name.unwrap_or_default();
                info!("{} paused the game ({} left)", name, remaining_pauses);
                events.push(GameEvent::GamePaused {
                    slot,
                    name,
                    remaining_pauses,
                });
            }
        }
        Ok(())
    }

    /// Reports a departure; a pause ends when the worm that paused leaves
    fn after_departure(&mut self, slot: Slot, events: &mut Vec<GameEvent>) {
        let mut queued = self.engine.drain_events();
        let name = queued
            .iter()
            .rev()
            .find_map(|event| match event {
                GameEvent::WormLeft { name, .. } | GameEvent::WormKicked { name, .. } => Some(name.clone()),
                _ => None,
            })
            .unwrap_or_default();
        events.append(&mut queued);

        if self.paused_by != Some(slot) {
            return;
        }
        self.paused_by = None;
        info!("{} left while pausing, game resumed", name);
        events.push(GameEvent::GameResumed { slot, name });
    }

    // ========================================================================
    // Loop
    // ========================================================================

    /// Runs periods on a fixed interval until `shutdown` completes and hands
    /// the session back
    pub async fn run<F>(mut self, shutdown: F) -> Self
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let period_millis = self.period.as_millis().max(1) as u64;
        let stats_every = (STATS_INTERVAL_SECS * 1000 / period_millis).max(1);
        info!("Game loop started, period {} ms", period_millis);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let before = self.engine.ticks();
                    self.performance.tick_start();
                    self.step();
                    self.performance.tick_end(self.engine.state().entity_counts().total());

                    let ticks = self.engine.ticks();
                    if ticks != before && ticks % stats_every == 0 {
                        self.log_stats();
                    }
                }
            }
        }

        info!("Game loop stopped at tick {}", self.engine.ticks());
        self
    }

    fn log_stats(&self) {
        let counts = self.engine.state().entity_counts();
        let status = self.performance.status();
        info!(
            "Game: {}s, tick {}, {} worms, {} bullets, {} explosions, {} decorations, {} shots | Perf: {:?} ({:.1}%, p95 {:?})",
            self.elapsed.as_secs(),
            self.engine.ticks(),
            counts.worms,
            counts.bullets,
            counts.explosions,
            counts.decorations,
            counts.shots,
            status,
            self.performance.budget_usage_percent(),
            self.performance.p95_tick_duration()
        );
        if status.is_overloaded() {
            warn!("Ticks are using up the whole period");
        }
    }
}
