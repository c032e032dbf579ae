use tank_battlegrounds_core::{Command, Level, LoadError, Outcome, Role, SimulationConfig, UnitView};
use tank_battlegrounds_system_ballistics::Ballistics;
use tank_battlegrounds_system_engagement::Engagement;
use tank_battlegrounds_system_player_control::{Intent, PlayerControl};
use tank_battlegrounds_world::{self as world, query, TickError, World};

use crate::EventBus;

/// One play-through of a level: the world plus the systems that drive it.
#[derive(Debug)]
pub struct Session {
    level: Level,
    world: World,
    player_control: PlayerControl,
    engagement: Engagement,
    ballistics: Ballistics,
    queued: Vec<Command>,
    commands: Vec<Command>,
    outcome: Option<Outcome>,
}

impl Session {
    /// Seeds a new session from a decoded level.
    pub fn start(level: Level, config: SimulationConfig) -> Result<Self, LoadError> {
        let world = World::new(level.grid.clone(), &level.spawns, config)?;
        Ok(Self {
            player_control: PlayerControl::new(level.cell_size),
            engagement: Engagement::new(config.bullet_range),
            ballistics: Ballistics::new(),
            level,
            world,
            queued: Vec::new(),
            commands: Vec::new(),
            outcome: None,
        })
    }

    /// Level the session was seeded from.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Read-only access to the simulation state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Terminal state reached by the session, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Queues a command that runs first on the next tick.
    #[cfg(test)]
    pub(crate) fn queue(&mut self, command: Command) {
        self.queued.push(command);
    }

    /// Runs one tick: builds the ordered command list, executes it, and
    /// evaluates the terminal condition.
    ///
    /// Once an outcome is reached the session is frozen and further calls only
    /// report it. On error the command list is abandoned mid-way.
    pub fn tick(
        &mut self,
        intent: &Intent,
        bus: &mut EventBus,
    ) -> Result<Option<Outcome>, TickError> {
        if self.outcome.is_some() {
            return Ok(self.outcome);
        }

        self.build_commands(intent);

        let mut events = Vec::new();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut events)?;
            for event in events.drain(..) {
                bus.publish(&event);
            }
        }

        self.outcome = evaluate_outcome(&query::unit_view(&self.world));
        Ok(self.outcome)
    }

    fn build_commands(&mut self, intent: &Intent) {
        let player = query::player(&self.world);
        let units = query::unit_view(&self.world);
        let bullets = query::bullet_view(&self.world);
        let out = &mut self.commands;
        out.clear();
        out.append(&mut self.queued);

        self.player_control.emit_move(player, intent, out);

        self.player_control.emit_aim(player, intent, out);
        self.engagement.emit_aims(&units, out);

        self.player_control.emit_fire(player, intent, out);
        self.engagement.emit_shots(&units, out);

        self.ballistics.handle(&bullets, out);
        out.push(Command::Tick);
    }
}

/// Evaluates the terminal condition over the unit roster.
///
/// A destroyed or missing player is a defeat; otherwise the session is won
/// once no other unit is alive.
#[must_use]
pub fn evaluate_outcome(units: &UnitView) -> Option<Outcome> {
    match units.player() {
        Some(player) if player.status.is_alive() => {
            let enemy_alive = units
                .iter()
                .any(|unit| unit.role != Role::Player && unit.status.is_alive());
            if enemy_alive {
                None
            } else {
                Some(Outcome::Victory)
            }
        }
        _ => Some(Outcome::Defeat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tank_battlegrounds_core::{Orientation, Status, TileRef, UnitId, UnitSnapshot};

    fn snapshot(id: u32, role: Role, status: Status) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            role,
            position: Vec2::new(id as f32, 0.0),
            orientation: Orientation::North,
            status,
            weapon_target: Vec2::ZERO,
            tile: TileRef::new(0, 0),
        }
    }

    #[test]
    fn live_enemies_keep_the_session_running() {
        let units = UnitView::from_snapshots(vec![
            snapshot(0, Role::Player, Status::Alive),
            snapshot(1, Role::SentryTurret, Status::Destroyed),
            snapshot(2, Role::PatrolTank, Status::Alive),
        ]);
        assert_eq!(evaluate_outcome(&units), None);
    }

    #[test]
    fn all_enemies_destroyed_is_victory() {
        let units = UnitView::from_snapshots(vec![
            snapshot(0, Role::Player, Status::Alive),
            snapshot(1, Role::SentryTurret, Status::Destroyed),
            snapshot(2, Role::PatrolTank, Status::Destroyed),
        ]);
        assert_eq!(evaluate_outcome(&units), Some(Outcome::Victory));
    }

    #[test]
    fn destroyed_player_is_defeat_even_without_enemies() {
        let units = UnitView::from_snapshots(vec![
            snapshot(0, Role::Player, Status::Destroyed),
            snapshot(1, Role::SentryTurret, Status::Destroyed),
        ]);
        assert_eq!(evaluate_outcome(&units), Some(Outcome::Defeat));
    }

    #[test]
    fn missing_player_is_defeat() {
        let units = UnitView::from_snapshots(vec![snapshot(1, Role::SentryTurret, Status::Alive)]);
        assert_eq!(evaluate_outcome(&units), Some(Outcome::Defeat));
    }
}
