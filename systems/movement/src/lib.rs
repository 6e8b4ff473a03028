#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that turns held keys into camera commands once per tick.

use dungeon_crawler_core::Command;

/// Tiles travelled per tick while a movement key is held.
pub const DEFAULT_MOVE_SPEED: f64 = 0.15;

/// Radians turned per tick while a turn key is held.
pub const DEFAULT_ROT_SPEED: f64 = 0.1;

/// Snapshot of the movement keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    /// Walk along the view direction (Up or Space).
    pub forward: bool,
    /// Walk against the view direction (Down).
    pub backward: bool,
    /// Turn counter-clockwise on screen (Left).
    pub turn_left: bool,
    /// Turn clockwise on screen (Right).
    pub turn_right: bool,
}

impl HeldKeys {
    /// Reports whether any movement key is held.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.forward || self.backward || self.turn_left || self.turn_right
    }
}

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    move_speed: f64,
    rot_speed: f64,
}

impl Config {
    /// Creates a new configuration using the provided speeds.
    #[must_use]
    pub const fn new(move_speed: f64, rot_speed: f64) -> Self {
        Self {
            move_speed,
            rot_speed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_SPEED, DEFAULT_ROT_SPEED)
    }
}

/// Pure system that emits rotation and movement commands for held keys.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits the commands for one tick.
    ///
    /// Turns are applied before steps so a held turn and walk move along the
    /// freshly rotated direction. Opposite keys both fire and cancel out.
    pub fn handle(&self, keys: HeldKeys, out: &mut Vec<Command>) {
        if keys.turn_left {
            out.push(Command::RotateCamera {
                angle: -self.config.rot_speed,
            });
        }
        if keys.turn_right {
            out.push(Command::RotateCamera {
                angle: self.config.rot_speed,
            });
        }
        if keys.forward {
            out.push(Command::MoveCamera {
                distance: self.config.move_speed,
            });
        }
        if keys.backward {
            out.push(Command::MoveCamera {
                distance: -self.config.move_speed,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_keys_emit_nothing() {
        let mut out = Vec::new();
        Movement::default().handle(HeldKeys::default(), &mut out);
        assert!(out.is_empty());
        assert!(!HeldKeys::default().any());
    }

    #[test]
    fn turns_precede_steps() {
        let mut out = Vec::new();
        Movement::default().handle(
            HeldKeys {
                forward: true,
                turn_left: true,
                ..HeldKeys::default()
            },
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::RotateCamera { angle: -0.1 },
                Command::MoveCamera { distance: 0.15 },
            ]
        );
    }
}
