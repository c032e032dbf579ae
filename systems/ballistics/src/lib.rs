#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps bullets in flight and clears spent ones.

use tank_battlegrounds_core::{BulletView, Command, Roster};

/// Ballistics system emitting advance commands followed by one reap.
#[derive(Debug, Default)]
pub struct Ballistics;

impl Ballistics {
    /// Creates a new ballistics system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::AdvanceBullet` for every live bullet, then a single
    /// `Command::ReapDestroyed` for the bullet roster.
    pub fn handle(&self, bullets: &BulletView, out: &mut Vec<Command>) {
        out.extend(
            bullets
                .iter()
                .filter(|bullet| bullet.status.is_alive())
                .map(|bullet| Command::AdvanceBullet { bullet: bullet.id }),
        );
        out.push(Command::ReapDestroyed {
            roster: Roster::Bullets,
        });
    }
}
