//! Interactive play loop wiring the session to the macroquad window.

use std::time::Duration;

use anyhow::{Context, Result};
use dungeon_crawler_core::LevelData;
use dungeon_crawler_rendering::{
    Color, Frame, FrameInput, FrameRenderer, Hud, HudLine, Key, KeyEvent, Presentation,
    RenderingBackend, Scene,
};
use dungeon_crawler_rendering_macroquad::MacroquadBackend;
use dungeon_crawler_system_movement as movement;
use dungeon_crawler_system_session::{self as session, MoveKey, Session};
use dungeon_crawler_world::query;
use tracing::info;

use crate::config::Settings;

const WINDOW_TITLE: &str = "Dungeon Crawler";

/// Physical keys currently down, folded into the session's movement keys.
///
/// Up and Space both walk forward, so forward is only released once neither
/// key is held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PhysicalKeys {
    up: bool,
    space: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl PhysicalKeys {
    fn apply(&mut self, event: KeyEvent) {
        let (key, down) = match event {
            KeyEvent::Pressed(key) => (key, true),
            KeyEvent::Released(key) => (key, false),
        };
        match key {
            Key::Up => self.up = down,
            Key::Space => self.space = down,
            Key::Down => self.down = down,
            Key::Left => self.left = down,
            Key::Right => self.right = down,
        }
    }

    fn held(&self, key: MoveKey) -> bool {
        match key {
            MoveKey::Forward => self.up || self.space,
            MoveKey::Backward => self.down,
            MoveKey::TurnLeft => self.left,
            MoveKey::TurnRight => self.right,
        }
    }
}

/// Applies one frame of input and redraws the frame when the session is dirty.
pub(crate) struct PlayLoop {
    session: Session,
    renderer: FrameRenderer,
    keys: PhysicalKeys,
    typing: String,
}

impl PlayLoop {
    pub(crate) fn new(settings: &Settings, level: LevelData) -> Result<Self> {
        let config = session::Config::new(
            movement::Config::new(settings.movement.move_speed, settings.movement.rot_speed),
            settings.console.history,
        );
        let mut session = Session::new(config);
        session.start(level).context("failed to start session")?;

        Ok(Self {
            session,
            renderer: FrameRenderer::new(settings.palette()?),
            keys: PhysicalKeys::default(),
            typing: String::new(),
        })
    }

    pub(crate) fn update(&mut self, input: FrameInput, frame: &mut Frame) {
        let FrameInput {
            keys,
            submitted,
            typing,
            typing_changed,
            quit_requested,
        } = input;

        let before = self.keys;
        for event in keys {
            self.keys.apply(event);
        }
        for key in [
            MoveKey::Forward,
            MoveKey::Backward,
            MoveKey::TurnLeft,
            MoveKey::TurnRight,
        ] {
            match (before.held(key), self.keys.held(key)) {
                (false, true) => self.session.key_down(key),
                (true, false) => self.session.key_up(key),
                _ => {}
            }
        }

        for line in submitted {
            self.session.submit(line);
        }
        if typing_changed {
            self.typing = typing;
            self.session.request_redraw();
        }
        if quit_requested {
            self.session.stop();
            info!("player quit");
            return;
        }

        self.session.tick();
        if self.session.take_dirty() {
            frame.clear();
            self.draw(frame);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let world = self.session.world();
        let Some(level) = query::level(world) else {
            return;
        };
        let inventory = query::inventory(world);

        let lines = self
            .session
            .console()
            .flat_map(|entry| {
                entry.response.message.lines().map(|text| HudLine {
                    text: text.to_owned(),
                    success: entry.response.success,
                })
            })
            .collect();
        let (input, suggestions) = if self.typing.is_empty() {
            (None, Vec::new())
        } else {
            (
                Some(self.typing.clone()),
                self.session.suggestions(&self.typing),
            )
        };
        let hud = Hud {
            health: inventory.health(),
            max_health: inventory.max_health(),
            lines,
            input,
            suggestions,
        };

        let scene = Scene {
            level,
            camera: query::camera(world),
            hud: &hud,
        };
        self.renderer.render(&scene, frame);
    }
}

/// Opens the window and plays `level` until the player quits.
pub(crate) fn run(settings: &Settings, level: LevelData, backend: MacroquadBackend) -> Result<()> {
    let mut play = PlayLoop::new(settings, level)?;
    let mut frame = Frame::new(settings.screen.width, settings.screen.height)
        .context("invalid screen size")?;
    play.session.request_redraw();
    play.update(FrameInput::default(), &mut frame);

    let presentation = Presentation::new(WINDOW_TITLE, Color::from_rgb_u8(0, 0, 0), frame);
    backend.run(presentation, move |_dt: Duration, input, frame| {
        play.update(input, frame);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawler_core::Facing;
    use dungeon_crawler_world::level;

    fn play_loop() -> PlayLoop {
        let level = level::create_empty_map(8, 8, Facing::East);
        PlayLoop::new(&Settings::default(), level).expect("play loop starts")
    }

    fn pressed(keys: &[Key]) -> FrameInput {
        FrameInput {
            keys: keys.iter().copied().map(KeyEvent::Pressed).collect(),
            ..FrameInput::default()
        }
    }

    fn released(keys: &[Key]) -> FrameInput {
        FrameInput {
            keys: keys.iter().copied().map(KeyEvent::Released).collect(),
            ..FrameInput::default()
        }
    }

    #[test]
    fn first_update_draws_the_view() {
        let mut play = play_loop();
        let mut frame = Frame::new(320, 200).expect("valid frame");
        play.session.request_redraw();

        play.update(FrameInput::default(), &mut frame);

        assert!(!frame.ops().is_empty(), "frame should be recorded");
        assert!(frame.texts().any(|text| text.starts_with("HP 100/100")));
    }

    #[test]
    fn up_and_space_share_forward() {
        let mut play = play_loop();
        let mut frame = Frame::new(320, 200).expect("valid frame");

        play.update(pressed(&[Key::Up, Key::Space]), &mut frame);
        assert!(play.session.held_keys().forward);

        play.update(released(&[Key::Up]), &mut frame);
        assert!(
            play.session.held_keys().forward,
            "space still holds forward"
        );

        play.update(released(&[Key::Space]), &mut frame);
        assert!(!play.session.held_keys().forward);
    }

    #[test]
    fn held_forward_moves_the_camera() {
        let mut play = play_loop();
        let mut frame = Frame::new(320, 200).expect("valid frame");
        let start = query::camera(play.session.world()).position();

        play.update(pressed(&[Key::Up]), &mut frame);
        play.update(FrameInput::default(), &mut frame);

        let moved = query::camera(play.session.world()).position();
        assert!(moved.x > start.x, "camera should walk east");
    }

    #[test]
    fn submitted_commands_reach_the_console_and_hud() {
        let mut play = play_loop();
        let mut frame = Frame::new(320, 200).expect("valid frame");

        play.update(
            FrameInput {
                submitted: vec!["inventory".to_owned()],
                ..FrameInput::default()
            },
            &mut frame,
        );

        assert_eq!(play.session.console().count(), 1);
        assert!(frame.texts().any(|text| text == "You are carrying nothing."));
    }

    #[test]
    fn typing_is_echoed_with_suggestions() {
        let mut play = play_loop();
        let mut frame = Frame::new(320, 200).expect("valid frame");

        play.update(
            FrameInput {
                typing: "inv".to_owned(),
                typing_changed: true,
                ..FrameInput::default()
            },
            &mut frame,
        );

        assert!(frame.texts().any(|text| text.contains("inv")));
        assert!(frame.texts().any(|text| text.contains("inventory")));
    }

    #[test]
    fn quitting_stops_the_session() {
        let mut play = play_loop();
        let mut frame = Frame::new(320, 200).expect("valid frame");

        play.update(
            FrameInput {
                quit_requested: true,
                ..FrameInput::default()
            },
            &mut frame,
        );

        assert!(!play.session.is_running());
    }
}
