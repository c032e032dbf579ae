use glam::Vec2;
use tank_battlegrounds_core::{
    CellCoord, Command, Event, Grid, Role, SimulationConfig, TileRef, UnitId, UnitSpawn,
};
use tank_battlegrounds_system_engagement::Engagement;
use tank_battlegrounds_world::{self as world, query, World};

fn spawn(role: Role, column: u32, row: u32) -> UnitSpawn {
    UnitSpawn {
        role,
        cell: CellCoord::new(column, row),
        tile: TileRef::new(0, 0),
    }
}

#[test]
fn towers_in_range_open_fire_on_the_player() {
    let config = SimulationConfig::default();
    let mut world = World::new(
        Grid::open(12, 4),
        &[
            spawn(Role::Player, 1, 1),
            spawn(Role::SentryTurret, 4, 1),
            spawn(Role::SentryTurret, 11, 3),
        ],
        config,
    )
    .expect("world");

    let engagement = Engagement::new(config.bullet_range);
    let units = query::unit_view(&world);
    let mut commands = Vec::new();
    engagement.emit_aims(&units, &mut commands);
    engagement.emit_shots(&units, &mut commands);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events).expect("command succeeds");
    }

    assert_eq!(
        events,
        vec![Event::BulletFired {
            unit: UnitId::new(1),
            bullet: tank_battlegrounds_core::BulletId::new(0),
            origin: Vec2::new(4.0, 1.0),
            target: Vec2::new(1.0, 1.0),
        }]
    );

    let far_tower = *query::unit_view(&world)
        .get(UnitId::new(2))
        .expect("far tower");
    assert_eq!(far_tower.weapon_target, Vec2::new(1.0, 1.0));
}

#[test]
fn tower_shots_respect_cooldown_across_ticks() {
    let config = SimulationConfig::default();
    let mut world = World::new(
        Grid::open(6, 1),
        &[spawn(Role::Player, 0, 0), spawn(Role::SentryTurret, 3, 0)],
        config,
    )
    .expect("world");
    let engagement = Engagement::new(config.bullet_range);

    let mut fired = 0;
    for _ in 0..config.fire_delay {
        let units = query::unit_view(&world);
        let mut commands = Vec::new();
        engagement.emit_aims(&units, &mut commands);
        engagement.emit_shots(&units, &mut commands);
        commands.push(Command::Tick);

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events).expect("command succeeds");
        }
        fired += events
            .iter()
            .filter(|event| matches!(event, Event::BulletFired { .. }))
            .count();
    }

    assert_eq!(fired, 1);
    assert_eq!(query::bullet_view(&world).iter().count(), 1);
}
