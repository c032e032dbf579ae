#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives every non-player unit.
//!
//! Each unit aims at the player's position every tick and fires whenever the
//! player is inside the engagement envelope. There is no pathing and no
//! line-of-sight reasoning.

use tank_battlegrounds_core::{Command, Role, UnitView};

/// Engagement policy shared by towers and enemy tanks.
#[derive(Debug)]
pub struct Engagement {
    envelope: f32,
}

impl Engagement {
    /// Creates a policy that fires on targets at most `envelope` cells away.
    #[must_use]
    pub fn new(envelope: f32) -> Self {
        Self { envelope }
    }

    /// Emits an aim command at the player for every non-player unit.
    pub fn emit_aims(&self, units: &UnitView, out: &mut Vec<Command>) {
        let Some(player) = units.player() else {
            return;
        };

        for unit in units.iter().filter(|unit| unit.role != Role::Player) {
            out.push(Command::AimUnit {
                unit: unit.id,
                target: player.position,
            });
        }
    }

    /// Emits a shot for every non-player unit within the envelope.
    pub fn emit_shots(&self, units: &UnitView, out: &mut Vec<Command>) {
        let Some(player) = units.player() else {
            return;
        };

        for unit in units.iter().filter(|unit| unit.role != Role::Player) {
            if unit.position.distance(player.position) <= self.envelope {
                out.push(Command::Shoot { unit: unit.id });
            }
        }
    }
}
