#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tank Battlegrounds.

use glam::Vec2;
use tank_battlegrounds_core::{
    BulletId, CellCoord, Command, Event, Grid, LoadError, MoveVector, Orientation, Role, Roster,
    SimulationConfig, Status, Tick, TileRef, UnitId, UnitSpawn, CELL_CENTER_OFFSET,
};
use thiserror::Error;

/// Faults raised while executing a command against the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TickError {
    /// The command referenced a unit that is not part of the roster.
    #[error("unit {0:?} is not part of the session")]
    UnknownUnit(UnitId),
    /// The command referenced a bullet that is not part of the roster.
    #[error("bullet {0:?} is not part of the session")]
    UnknownBullet(BulletId),
}

/// Represents the authoritative Tank Battlegrounds world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    config: SimulationConfig,
    units: Vec<Unit>,
    bullets: Vec<Bullet>,
    player: UnitId,
    tick: Tick,
    next_bullet: u32,
}

impl World {
    /// Creates a world from decoded geometry and unit placements.
    ///
    /// The first spawn carrying [`Role::Player`] becomes the player's unit.
    /// Configurations that would let bullets stall are rejected.
    pub fn new(
        grid: Grid,
        spawns: &[UnitSpawn],
        config: SimulationConfig,
    ) -> Result<Self, LoadError> {
        config.validate()?;
        let units: Vec<Unit> = spawns
            .iter()
            .zip(0u32..)
            .map(|(spawn, index)| Unit::from_spawn(UnitId::new(index), spawn))
            .collect();
        let player = units
            .iter()
            .find(|unit| unit.role == Role::Player)
            .map(|unit| unit.id)
            .ok_or(LoadError::MissingPlayer)?;

        Ok(Self {
            grid,
            config,
            units,
            bullets: Vec::new(),
            player,
            tick: Tick::default(),
            next_bullet: 0,
        })
    }

    fn unit_index(&self, unit: UnitId) -> Result<usize, TickError> {
        self.units
            .iter()
            .position(|candidate| candidate.id == unit)
            .ok_or(TickError::UnknownUnit(unit))
    }

    fn bullet_index(&self, bullet: BulletId) -> Result<usize, TickError> {
        self.bullets
            .iter()
            .position(|candidate| candidate.id == bullet)
            .ok_or(TickError::UnknownBullet(bullet))
    }

    fn unit_at(&self, cell: CellCoord) -> Option<usize> {
        self.units
            .iter()
            .position(|unit| CellCoord::containing(unit.position) == Some(cell))
    }

    fn allocate_bullet_id(&mut self) -> BulletId {
        let id = BulletId::new(self.next_bullet);
        self.next_bullet = self.next_bullet.wrapping_add(1);
        id
    }

    fn move_unit(&mut self, unit: UnitId, direction: MoveVector) -> Result<(), TickError> {
        let index = self.unit_index(unit)?;
        let mover = &mut self.units[index];
        if !mover.status.is_alive() || mover.role.is_stationary() {
            return Ok(());
        }

        mover.orientation = mover.orientation.after_move(direction);
        let candidate = mover.position + direction.as_vec2();

        if !self.grid.is_inside(candidate) {
            return Ok(());
        }
        if self
            .grid
            .wall_at(candidate.x as i64, candidate.y as i64)
            .is_some()
        {
            return Ok(());
        }
        // Destroyed wrecks still block the cell they occupy.
        if self.units.iter().any(|other| other.position == candidate) {
            return Ok(());
        }

        self.units[index].position = candidate;
        Ok(())
    }

    fn shoot(&mut self, unit: UnitId, out_events: &mut Vec<Event>) -> Result<(), TickError> {
        let index = self.unit_index(unit)?;
        let tick = self.tick;
        let fire_delay = self.config.fire_delay;

        let shooter = &mut self.units[index];
        if !shooter.status.is_alive() {
            return Ok(());
        }
        if let Some(last_fired) = shooter.last_fired {
            if tick.since(last_fired) < fire_delay {
                return Ok(());
            }
        }
        shooter.last_fired = Some(tick);
        let (owner, origin, target) = (shooter.id, shooter.position, shooter.weapon_target);

        let id = self.allocate_bullet_id();
        self.bullets.push(Bullet::new(id, owner, origin, target));
        out_events.push(Event::BulletFired {
            unit: owner,
            bullet: id,
            origin,
            target,
        });
        Ok(())
    }

    fn advance_bullet(
        &mut self,
        bullet: BulletId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), TickError> {
        let index = self.bullet_index(bullet)?;
        let projectile = &self.bullets[index];
        if !projectile.status.is_alive() {
            return Ok(());
        }

        let owner = projectile.owner;
        let direction = projectile.direction();
        let next = projectile.position + direction * self.config.bullet_speed;
        // A non-finite aim point gives a bullet that never moves.
        let spent = !projectile.end.is_finite()
            || !self.grid.is_inside(next)
            || projectile.reached_target(direction, next)
            || next.distance(projectile.start) > self.config.bullet_range;

        if spent {
            self.bullets[index].status = Status::Destroyed;
            return Ok(());
        }

        let struck = CellCoord::containing(next + CELL_CENTER_OFFSET)
            .and_then(|cell| self.unit_at(cell))
            .filter(|&hit| {
                let victim = &self.units[hit];
                victim.status.is_alive() && victim.id != owner
            });

        if let Some(hit) = struck {
            let victim = &mut self.units[hit];
            victim.status = Status::Destroyed;
            self.bullets[index].status = Status::Destroyed;
            out_events.push(Event::UnitDestroyed {
                unit: victim.id,
                position: victim.position,
            });
            return Ok(());
        }

        self.bullets[index].position = next;
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), TickError> {
    match command {
        Command::MoveUnit { unit, direction } => world.move_unit(unit, direction),
        Command::AimUnit { unit, target } => {
            let index = world.unit_index(unit)?;
            world.units[index].weapon_target = target;
            Ok(())
        }
        Command::Shoot { unit } => world.shoot(unit, out_events),
        Command::AdvanceBullet { bullet } => world.advance_bullet(bullet, out_events),
        Command::ReapDestroyed { roster } => {
            match roster {
                Roster::Units => reap_destroyed(&mut world.units),
                Roster::Bullets => reap_destroyed(&mut world.bullets),
            }
            Ok(())
        }
        Command::Tick => {
            world.tick = world.tick.next();
            out_events.push(Event::TimeAdvanced { tick: world.tick });
            Ok(())
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tank_battlegrounds_core::{
        BulletSnapshot, BulletView, Grid, SimulationConfig, Tick, UnitId, UnitSnapshot, UnitView,
    };

    use super::World;

    /// Provides read-only access to the world's static geometry.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Simulation parameters the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Current value of the tick counter.
    #[must_use]
    pub fn tick(world: &World) -> Tick {
        world.tick
    }

    /// Identifier of the player's unit.
    #[must_use]
    pub fn player(world: &World) -> UnitId {
        world.player
    }

    /// Captures a read-only view of every unit, destroyed ones included.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(
            world
                .units
                .iter()
                .map(|unit| UnitSnapshot {
                    id: unit.id,
                    role: unit.role,
                    position: unit.position,
                    orientation: unit.orientation,
                    status: unit.status,
                    weapon_target: unit.weapon_target,
                    tile: unit.tile,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the bullets in the roster.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(
            world
                .bullets
                .iter()
                .map(|bullet| BulletSnapshot {
                    id: bullet.id,
                    owner: bullet.owner,
                    position: bullet.position,
                    status: bullet.status,
                })
                .collect(),
        )
    }
}

trait Lifecycle {
    fn status(&self) -> Status;
}

fn reap_destroyed<T: Lifecycle>(entities: &mut Vec<T>) {
    entities.retain(|entity| entity.status().is_alive());
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    role: Role,
    position: Vec2,
    orientation: Orientation,
    status: Status,
    weapon_target: Vec2,
    last_fired: Option<Tick>,
    tile: TileRef,
}

impl Unit {
    fn from_spawn(id: UnitId, spawn: &UnitSpawn) -> Self {
        let position = spawn.cell.to_vec2();
        Self {
            id,
            role: spawn.role,
            position,
            orientation: Orientation::default(),
            status: Status::Alive,
            weapon_target: position,
            last_fired: None,
            tile: spawn.tile,
        }
    }
}

impl Lifecycle for Unit {
    fn status(&self) -> Status {
        self.status
    }
}

#[derive(Clone, Debug)]
struct Bullet {
    id: BulletId,
    owner: UnitId,
    position: Vec2,
    start: Vec2,
    end: Vec2,
    status: Status,
}

impl Bullet {
    fn new(id: BulletId, owner: UnitId, start: Vec2, end: Vec2) -> Self {
        Self {
            id,
            owner,
            position: start,
            start,
            end,
            status: Status::Alive,
        }
    }

    fn direction(&self) -> Vec2 {
        (self.end - self.start).normalize_or_zero()
    }

    fn reached_target(&self, direction: Vec2, next: Vec2) -> bool {
        let reached_x = if direction.x >= 0.0 {
            next.x >= self.end.x
        } else {
            next.x <= self.end.x
        };
        let reached_y = if direction.y >= 0.0 {
            next.y >= self.end.y
        } else {
            next.y <= self.end.y
        };
        reached_x && reached_y
    }
}

impl Lifecycle for Bullet {
    fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_battlegrounds_core::{BulletSnapshot, ConfigError, UnitSnapshot};

    fn spawn(role: Role, column: u32, row: u32) -> UnitSpawn {
        UnitSpawn {
            role,
            cell: CellCoord::new(column, row),
            tile: TileRef::new(0, 0),
        }
    }

    fn world_with(grid: Grid, spawns: &[UnitSpawn]) -> World {
        World::new(grid, spawns, SimulationConfig::default()).expect("player spawn present")
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events).expect("command succeeds");
        events
    }

    fn unit(world: &World, id: u32) -> UnitSnapshot {
        *query::unit_view(world)
            .get(UnitId::new(id))
            .expect("unit exists")
    }

    fn bullets(world: &World) -> Vec<BulletSnapshot> {
        query::bullet_view(world).into_vec()
    }

    fn step(unit: u32, dx: i8, dy: i8) -> Command {
        Command::MoveUnit {
            unit: UnitId::new(unit),
            direction: MoveVector::new(dx, dy).expect("valid step"),
        }
    }

    #[test]
    fn world_requires_player_spawn() {
        let result = World::new(
            Grid::open(3, 3),
            &[spawn(Role::SentryTurret, 1, 1)],
            SimulationConfig::default(),
        );
        assert!(matches!(result, Err(LoadError::MissingPlayer)));
    }

    #[test]
    fn move_commits_to_every_free_neighbour() {
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1), (1, 1), (-1, -1)] {
            let mut world = world_with(Grid::open(3, 3), &[spawn(Role::Player, 1, 1)]);
            let _ = run(&mut world, step(0, dx, dy));
            let expected = Vec2::new(1.0 + f32::from(dx), 1.0 + f32::from(dy));
            assert_eq!(unit(&world, 0).position, expected);
        }
    }

    #[test]
    fn move_rejects_out_of_bounds_wall_and_occupied_cells() {
        let mut grid = Grid::open(3, 3);
        grid.set_wall(CellCoord::new(1, 0), Some(TileRef::new(2, 1)));
        let mut world = world_with(
            grid,
            &[spawn(Role::Player, 0, 0), spawn(Role::PatrolTank, 0, 1)],
        );

        let _ = run(&mut world, step(0, -1, 0));
        assert_eq!(unit(&world, 0).position, Vec2::ZERO);
        let _ = run(&mut world, step(0, 1, 0));
        assert_eq!(unit(&world, 0).position, Vec2::ZERO);
        let _ = run(&mut world, step(0, 0, 1));
        assert_eq!(unit(&world, 0).position, Vec2::ZERO);
    }

    #[test]
    fn rejected_move_still_turns_the_unit() {
        let mut world = world_with(Grid::open(2, 2), &[spawn(Role::Player, 0, 0)]);
        let _ = run(&mut world, step(0, -1, 0));
        let player = unit(&world, 0);
        assert_eq!(player.position, Vec2::ZERO);
        assert_eq!(player.orientation.degrees(), 90);
    }

    #[test]
    fn orientation_tracks_move_direction() {
        let mut world = world_with(Grid::open(5, 5), &[spawn(Role::Player, 2, 2)]);
        for ((dx, dy), degrees) in [((-1, 0), 90), ((1, 0), -90), ((0, -1), 0), ((0, 1), 180)] {
            let _ = run(&mut world, step(0, dx, dy));
            assert_eq!(unit(&world, 0).orientation.degrees(), degrees);
        }
    }

    #[test]
    fn destroyed_units_still_block_movement() {
        let mut world = world_with(
            Grid::open(4, 1),
            &[spawn(Role::Player, 0, 0), spawn(Role::PatrolTank, 1, 0)],
        );
        world.units[1].status = Status::Destroyed;

        let _ = run(&mut world, step(0, 1, 0));
        assert_eq!(unit(&world, 0).position, Vec2::ZERO);
    }

    #[test]
    fn destroyed_and_stationary_units_ignore_moves() {
        let mut world = world_with(
            Grid::open(4, 4),
            &[spawn(Role::Player, 0, 0), spawn(Role::SentryTurret, 2, 2)],
        );
        let _ = run(&mut world, step(1, 1, 0));
        assert_eq!(unit(&world, 1).position, Vec2::new(2.0, 2.0));
        assert_eq!(unit(&world, 1).orientation, Orientation::North);

        world.units[0].status = Status::Destroyed;
        let _ = run(&mut world, step(0, 1, 0));
        assert_eq!(unit(&world, 0).position, Vec2::ZERO);
        assert_eq!(unit(&world, 0).orientation, Orientation::North);
    }

    #[test]
    fn aim_accepts_points_outside_the_grid() {
        let mut world = world_with(Grid::open(2, 2), &[spawn(Role::Player, 0, 0)]);
        let target = Vec2::new(-3.5, 12.25);
        let _ = run(
            &mut world,
            Command::AimUnit {
                unit: UnitId::new(0),
                target,
            },
        );
        assert_eq!(unit(&world, 0).weapon_target, target);
    }

    #[test]
    fn shoot_respects_fire_delay() {
        let mut world = world_with(Grid::open(8, 1), &[spawn(Role::Player, 0, 0)]);
        world.units[0].weapon_target = Vec2::new(5.0, 0.0);
        let shoot = Command::Shoot {
            unit: UnitId::new(0),
        };

        let first = run(&mut world, shoot.clone());
        for _ in 0..3 {
            let _ = run(&mut world, Command::Tick);
        }
        let second = run(&mut world, shoot.clone());

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(bullets(&world).len(), 1);

        for _ in 0..7 {
            let _ = run(&mut world, Command::Tick);
        }
        let third = run(&mut world, shoot);
        assert_eq!(third.len(), 1);
        assert_eq!(bullets(&world).len(), 2);
    }

    #[test]
    fn shoot_reports_origin_and_target() {
        let mut world = world_with(Grid::open(8, 8), &[spawn(Role::Player, 2, 3)]);
        world.units[0].weapon_target = Vec2::new(6.0, 3.0);

        let events = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );

        assert_eq!(
            events,
            vec![Event::BulletFired {
                unit: UnitId::new(0),
                bullet: BulletId::new(0),
                origin: Vec2::new(2.0, 3.0),
                target: Vec2::new(6.0, 3.0),
            }]
        );
    }

    #[test]
    fn destroyed_unit_cannot_shoot() {
        let mut world = world_with(Grid::open(4, 4), &[spawn(Role::Player, 0, 0)]);
        world.units[0].status = Status::Destroyed;
        let events = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );
        assert!(events.is_empty());
        assert!(bullets(&world).is_empty());
    }

    #[test]
    fn bullet_advances_along_fixed_direction() {
        let mut world = world_with(Grid::open(10, 10), &[spawn(Role::Player, 0, 0)]);
        world.units[0].weapon_target = Vec2::new(3.0, 0.0);
        let _ = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );
        world.units[0].weapon_target = Vec2::new(0.0, 3.0);

        let _ = run(
            &mut world,
            Command::AdvanceBullet {
                bullet: BulletId::new(0),
            },
        );

        let bullet = bullets(&world)[0];
        assert!(bullet.status.is_alive());
        assert!((bullet.position.x - 0.1).abs() < 1e-6);
        assert!(bullet.position.y.abs() < 1e-6);
    }

    #[test]
    fn bullet_reaching_target_is_reaped() {
        let mut world = world_with(Grid::open(10, 10), &[spawn(Role::Player, 0, 0)]);
        world.units[0].weapon_target = Vec2::new(0.15, 0.0);
        let _ = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );

        let advance = Command::AdvanceBullet {
            bullet: BulletId::new(0),
        };
        let _ = run(&mut world, advance.clone());
        assert!(bullets(&world)[0].status.is_alive());
        let _ = run(&mut world, advance);
        assert_eq!(bullets(&world)[0].status, Status::Destroyed);

        let _ = run(
            &mut world,
            Command::ReapDestroyed {
                roster: Roster::Bullets,
            },
        );
        assert!(bullets(&world).is_empty());
    }

    #[test]
    fn world_rejects_configs_that_stall_bullets() {
        let config = SimulationConfig {
            bullet_speed: 0.0,
            ..SimulationConfig::default()
        };
        let result = World::new(Grid::open(3, 3), &[spawn(Role::Player, 1, 1)], config);
        assert!(matches!(
            result,
            Err(LoadError::InvalidConfig(ConfigError::BulletSpeed(_)))
        ));
    }

    #[test]
    fn bullets_aimed_at_non_finite_points_expire() {
        for target in [
            Vec2::new(f32::NAN, 0.0),
            Vec2::new(f32::INFINITY, 2.0),
            Vec2::splat(f32::NEG_INFINITY),
        ] {
            let mut world = world_with(Grid::open(5, 5), &[spawn(Role::Player, 2, 2)]);
            let _ = run(
                &mut world,
                Command::AimUnit {
                    unit: UnitId::new(0),
                    target,
                },
            );
            let _ = run(
                &mut world,
                Command::Shoot {
                    unit: UnitId::new(0),
                },
            );
            let _ = run(
                &mut world,
                Command::AdvanceBullet {
                    bullet: BulletId::new(0),
                },
            );
            assert_eq!(bullets(&world)[0].status, Status::Destroyed);

            let _ = run(
                &mut world,
                Command::ReapDestroyed {
                    roster: Roster::Bullets,
                },
            );
            assert!(bullets(&world).is_empty());
        }
    }

    #[test]
    fn steady_fire_keeps_the_bullet_roster_bounded() {
        let mut world = world_with(Grid::open(8, 8), &[spawn(Role::Player, 0, 0)]);
        world.units[0].weapon_target = Vec2::new(f32::NAN, f32::NAN);

        for _ in 0..200 {
            let live: Vec<BulletId> = bullets(&world).iter().map(|bullet| bullet.id).collect();
            let _ = run(
                &mut world,
                Command::Shoot {
                    unit: UnitId::new(0),
                },
            );
            for bullet in live {
                let _ = run(&mut world, Command::AdvanceBullet { bullet });
            }
            let _ = run(
                &mut world,
                Command::ReapDestroyed {
                    roster: Roster::Bullets,
                },
            );
            let _ = run(&mut world, Command::Tick);
        }

        assert!(bullets(&world).len() <= 1);
    }

    #[test]
    fn bullet_leaving_the_grid_is_destroyed() {
        let mut world = world_with(Grid::open(3, 3), &[spawn(Role::Player, 0, 0)]);
        world.units[0].weapon_target = Vec2::new(-5.0, 0.0);
        let _ = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );
        let _ = run(
            &mut world,
            Command::AdvanceBullet {
                bullet: BulletId::new(0),
            },
        );
        assert_eq!(bullets(&world)[0].status, Status::Destroyed);
        assert_eq!(bullets(&world)[0].position, Vec2::ZERO);
    }

    #[test]
    fn bullet_exceeding_range_is_destroyed() {
        let config = SimulationConfig {
            bullet_speed: 1.0,
            bullet_range: 2.5,
            ..SimulationConfig::default()
        };
        let mut world =
            World::new(Grid::open(10, 1), &[spawn(Role::Player, 0, 0)], config).expect("world");
        world.units[0].weapon_target = Vec2::new(9.0, 0.0);
        let _ = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );
        let advance = Command::AdvanceBullet {
            bullet: BulletId::new(0),
        };
        let _ = run(&mut world, advance.clone());
        let _ = run(&mut world, advance.clone());
        assert!(bullets(&world)[0].status.is_alive());
        let _ = run(&mut world, advance);
        assert_eq!(bullets(&world)[0].status, Status::Destroyed);
        assert_eq!(bullets(&world)[0].position, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn bullet_hit_destroys_target_and_reports_once() {
        let config = SimulationConfig {
            bullet_speed: 1.0,
            ..SimulationConfig::default()
        };
        let mut world = World::new(
            Grid::open(6, 1),
            &[spawn(Role::Player, 0, 0), spawn(Role::SentryTurret, 2, 0)],
            config,
        )
        .expect("world");
        world.units[0].weapon_target = Vec2::new(4.0, 0.0);
        let _ = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );

        let advance = Command::AdvanceBullet {
            bullet: BulletId::new(0),
        };
        // First step lands on an empty cell.
        assert!(run(&mut world, advance.clone()).is_empty());
        let events = run(&mut world, advance);

        assert_eq!(
            events,
            vec![Event::UnitDestroyed {
                unit: UnitId::new(1),
                position: Vec2::new(2.0, 0.0),
            }]
        );
        assert_eq!(unit(&world, 1).status, Status::Destroyed);
        assert!(unit(&world, 0).status.is_alive());
        assert_eq!(bullets(&world)[0].status, Status::Destroyed);
    }

    #[test]
    fn bullets_pass_over_wrecks() {
        let config = SimulationConfig {
            bullet_speed: 1.0,
            ..SimulationConfig::default()
        };
        let mut world = World::new(
            Grid::open(6, 1),
            &[spawn(Role::Player, 0, 0), spawn(Role::SentryTurret, 1, 0)],
            config,
        )
        .expect("world");
        world.units[1].status = Status::Destroyed;
        world.units[0].weapon_target = Vec2::new(4.0, 0.0);
        let _ = run(
            &mut world,
            Command::Shoot {
                unit: UnitId::new(0),
            },
        );
        let events = run(
            &mut world,
            Command::AdvanceBullet {
                bullet: BulletId::new(0),
            },
        );
        assert!(events.is_empty());
        assert!(bullets(&world)[0].status.is_alive());
    }

    #[test]
    fn reap_keeps_alive_entities_in_order() {
        let mut world = world_with(
            Grid::open(4, 4),
            &[
                spawn(Role::Player, 0, 0),
                spawn(Role::PatrolTank, 1, 0),
                spawn(Role::PatrolTank, 2, 0),
                spawn(Role::PatrolTank, 3, 0),
            ],
        );
        world.units[1].status = Status::Destroyed;

        let _ = run(
            &mut world,
            Command::ReapDestroyed {
                roster: Roster::Units,
            },
        );

        let ids: Vec<u32> = query::unit_view(&world)
            .iter()
            .map(|snapshot| snapshot.id.get())
            .collect();
        assert_eq!(ids, vec![0, 2, 3]);
    }

    #[test]
    fn unknown_entities_are_tick_errors() {
        let mut world = world_with(Grid::open(2, 2), &[spawn(Role::Player, 0, 0)]);
        let mut events = Vec::new();
        assert_eq!(
            apply(
                &mut world,
                Command::Shoot {
                    unit: UnitId::new(9)
                },
                &mut events
            ),
            Err(TickError::UnknownUnit(UnitId::new(9)))
        );
        assert_eq!(
            apply(
                &mut world,
                Command::AdvanceBullet {
                    bullet: BulletId::new(3)
                },
                &mut events
            ),
            Err(TickError::UnknownBullet(BulletId::new(3)))
        );
    }

    #[test]
    fn tick_advances_counter() {
        let mut world = world_with(Grid::open(2, 2), &[spawn(Role::Player, 0, 0)]);
        let events = run(&mut world, Command::Tick);
        assert_eq!(query::tick(&world), Tick::new(1));
        assert_eq!(events, vec![Event::TimeAdvanced { tick: Tick::new(1) }]);
    }
}
