#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Composed game session.
//!
//! The session owns the [`World`] and the pure systems that drive it. Input
//! arrives as [`Intent`] values that are queued and consumed once per
//! [`Session::tick`]; the resulting events mark the session dirty so the host
//! only redraws when something visible changed.

use std::collections::VecDeque;

use dungeon_crawler_core::{Command, CommandResponse, Event, LevelData};
use dungeon_crawler_system_command_parser::{self as command_parser, Resolution};
use dungeon_crawler_system_interaction::{list_inventory, Interaction};
use dungeon_crawler_system_movement::{self as movement, HeldKeys, Movement};
use dungeon_crawler_world::{self as world, level::LevelError, query, World};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of console entries kept when no capacity is configured.
pub const DEFAULT_HISTORY_LEN: usize = 6;

/// Movement keys tracked by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKey {
    /// Walk forward.
    Forward,
    /// Walk backward.
    Backward,
    /// Turn left.
    TurnLeft,
    /// Turn right.
    TurnRight,
}

/// Player input waiting to be consumed by the next tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// A movement key was pressed.
    KeyDown(MoveKey),
    /// A movement key was released.
    KeyUp(MoveKey),
    /// A line of text was submitted to the command parser.
    SubmitText(String),
    /// The active level should be replaced.
    LoadLevel(Box<LevelData>),
}

/// Errors raised while starting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The level failed validation.
    #[error("cannot start session: {0}")]
    InvalidLevel(#[from] LevelError),
}

/// One submitted command and the reply shown for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleEntry {
    /// Text as submitted.
    pub input: String,
    /// Reply from the parser or interaction engine.
    pub response: CommandResponse,
}

/// Configuration parameters required to construct a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    movement: movement::Config,
    history_len: usize,
}

impl Config {
    /// Creates a configuration with the given movement speeds and console size.
    #[must_use]
    pub const fn new(movement: movement::Config, history_len: usize) -> Self {
        Self {
            movement,
            history_len,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(movement::Config::default(), DEFAULT_HISTORY_LEN)
    }
}

/// Owns the world and drives it from queued intents.
#[derive(Debug)]
pub struct Session {
    world: World,
    movement: Movement,
    interaction: Interaction,
    intents: VecDeque<Intent>,
    held: HeldKeys,
    running: bool,
    dirty: bool,
    console: VecDeque<ConsoleEntry>,
    history_len: usize,
}

impl Session {
    /// Creates a stopped session with an empty world.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            world: World::new(),
            movement: Movement::new(config.movement),
            interaction: Interaction::new(),
            intents: VecDeque::new(),
            held: HeldKeys::default(),
            running: false,
            dirty: false,
            console: VecDeque::new(),
            history_len: config.history_len.max(1),
        }
    }

    /// Loads `level`, places the camera on its start tile and starts ticking.
    pub fn start(&mut self, level: LevelData) -> Result<(), SessionError> {
        world::level::validate(&level)?;

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::LoadLevel {
                level: Box::new(level),
            },
            &mut events,
        );
        self.observe(&events);
        self.running = true;
        self.dirty = true;
        info!("session started");
        Ok(())
    }

    /// Stops ticking, releases every held key and discards queued intents.
    pub fn stop(&mut self) {
        if self.running {
            info!("session stopped");
        }
        self.running = false;
        self.held = HeldKeys::default();
        self.intents.clear();
    }

    /// Reports whether the session is processing ticks.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Queues an intent for the next tick. Intents are dropped while the
    /// session is not running.
    pub fn push(&mut self, intent: Intent) {
        if !self.running {
            debug!(?intent, "intent dropped while stopped");
            return;
        }
        self.intents.push_back(intent);
    }

    /// Queues a key press.
    pub fn key_down(&mut self, key: MoveKey) {
        self.push(Intent::KeyDown(key));
    }

    /// Queues a key release.
    pub fn key_up(&mut self, key: MoveKey) {
        self.push(Intent::KeyUp(key));
    }

    /// Queues a line of text for the command parser.
    pub fn submit(&mut self, text: impl Into<String>) {
        self.push(Intent::SubmitText(text.into()));
    }

    /// Advances the session by one frame.
    ///
    /// Does nothing until [`Session::start`] succeeded. Queued intents are
    /// consumed first, then held keys move the camera, then traps on any
    /// entered tile fire.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        while let Some(intent) = self.intents.pop_front() {
            self.handle_intent(intent);
        }

        let mut commands = Vec::new();
        self.movement.handle(self.held, &mut commands);
        let events = self.apply_all(commands);

        let mut reactions = Vec::new();
        self.interaction
            .handle(&events, query::level(&self.world), &mut reactions);
        let _ = self.apply_all(reactions);
    }

    /// Returns whether a redraw is due and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Forces the next [`Session::take_dirty`] to report a redraw.
    pub fn request_redraw(&mut self) {
        self.dirty = true;
    }

    /// Read-only access to the world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Movement keys currently held.
    #[must_use]
    pub const fn held_keys(&self) -> HeldKeys {
        self.held
    }

    /// Most recent console entries, oldest first.
    pub fn console(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.console.iter()
    }

    /// Completion candidates for partially typed input.
    #[must_use]
    pub fn suggestions(&self, input: &str) -> Vec<String> {
        command_parser::suggestions(input, &query::items_on_current_tile(&self.world))
    }

    fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::KeyDown(key) => self.set_key(key, true),
            Intent::KeyUp(key) => self.set_key(key, false),
            Intent::SubmitText(text) => {
                let response = self.execute_text(&text);
                if response.message.is_empty() {
                    return;
                }
                debug!(input = %text, success = response.success, "command executed");
                self.record(ConsoleEntry {
                    input: text,
                    response,
                });
            }
            Intent::LoadLevel(level) => {
                let events = self.apply_all(vec![Command::LoadLevel { level }]);
                if let Some(Event::LevelRejected { reason }) = events.first() {
                    warn!(%reason, "level switch rejected");
                    self.record(ConsoleEntry {
                        input: String::new(),
                        response: CommandResponse::failure(format!("Cannot load map: {reason}")),
                    });
                }
            }
        }
    }

    fn set_key(&mut self, key: MoveKey, pressed: bool) {
        let slot = match key {
            MoveKey::Forward => &mut self.held.forward,
            MoveKey::Backward => &mut self.held.backward,
            MoveKey::TurnLeft => &mut self.held.turn_left,
            MoveKey::TurnRight => &mut self.held.turn_right,
        };
        *slot = pressed;
    }

    fn execute_text(&mut self, text: &str) -> CommandResponse {
        let mut commands = Vec::new();
        let response = {
            let tile_items = query::items_on_current_tile(&self.world);
            let inventory = query::inventory(&self.world);
            let resolution = command_parser::resolve(text, &tile_items, inventory.items());

            match resolution {
                Resolution::Inventory => list_inventory(inventory),
                Resolution::Target { verb, item } => {
                    self.interaction
                        .execute(verb, item, inventory, &mut commands)
                }
                failed => failed
                    .failure()
                    .unwrap_or_else(|| CommandResponse::failure("")),
            }
        };

        let _ = self.apply_all(commands);
        response
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.observe(&events);
        events
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CameraMoved { from, to } if from == to => {}
                Event::ExitReached { tile } => {
                    info!(x = tile.x, y = tile.y, "player found the exit");
                    self.dirty = true;
                }
                Event::LevelRejected { .. } => {}
                _ => self.dirty = true,
            }
        }
    }

    fn record(&mut self, entry: ConsoleEntry) {
        if self.console.len() == self.history_len {
            let _ = self.console.pop_front();
        }
        self.console.push_back(entry);
        self.dirty = true;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
