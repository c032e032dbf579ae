#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns the player's per-tick intents into commands.
//!
//! Commands are emitted one phase at a time so the orchestrator can interleave
//! them with the other systems: moves first, then aims, then shots.

use glam::Vec2;
use tank_battlegrounds_core::{CellSize, Command, MoveVector, UnitId};

/// Inputs collected from the player for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Intent {
    /// Requested step for the player's unit.
    pub movement: MoveVector,
    /// Pointer position in window pixels.
    pub pointer: Vec2,
    /// Whether the fire trigger was pressed since the previous tick.
    pub fire: bool,
}

impl Intent {
    /// Intent that only keeps aiming at the provided pointer position.
    #[must_use]
    pub fn aim_only(pointer: Vec2) -> Self {
        Self {
            pointer,
            ..Self::default()
        }
    }
}

/// Converts a pointer position in pixels into grid-fractional coordinates.
///
/// The half-cell shift makes the centre of a cell map onto that cell's
/// grid-aligned position.
#[must_use]
pub fn pointer_to_grid(pointer: Vec2, cell_size: CellSize) -> Vec2 {
    let cell = cell_size.as_vec2().max(Vec2::ONE);
    pointer / cell - Vec2::splat(0.5)
}

/// Player control system bound to the level's cell size.
#[derive(Debug)]
pub struct PlayerControl {
    cell_size: CellSize,
}

impl PlayerControl {
    /// Creates a player control system for a level drawn with `cell_size` tiles.
    #[must_use]
    pub fn new(cell_size: CellSize) -> Self {
        Self { cell_size }
    }

    /// Emits the player's move command when a direction is held.
    pub fn emit_move(&self, player: UnitId, intent: &Intent, out: &mut Vec<Command>) {
        if intent.movement.is_zero() {
            return;
        }
        out.push(Command::MoveUnit {
            unit: player,
            direction: intent.movement,
        });
    }

    /// Emits the player's aim command toward the pointer.
    pub fn emit_aim(&self, player: UnitId, intent: &Intent, out: &mut Vec<Command>) {
        out.push(Command::AimUnit {
            unit: player,
            target: pointer_to_grid(intent.pointer, self.cell_size),
        });
    }

    /// Emits the player's shot when the trigger was pulled.
    pub fn emit_fire(&self, player: UnitId, intent: &Intent, out: &mut Vec<Command>) {
        if intent.fire {
            out.push(Command::Shoot { unit: player });
        }
    }
}
