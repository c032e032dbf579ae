use glam::Vec2;
use tank_battlegrounds_core::Role;
use tank_battlegrounds_session::{Intent, Session};
use tank_battlegrounds_world::query;

/// Scripted player that points at the nearest live enemy and keeps the
/// trigger pulled. The world's fire delay paces the actual shots.
pub(crate) fn intent(session: &Session) -> Intent {
    let units = query::unit_view(session.world());
    let Some(player) = units.player() else {
        return Intent::default();
    };
    let cell = session.level().cell_size.as_vec2();

    units
        .iter()
        .filter(|unit| unit.role != Role::Player && unit.status.is_alive())
        .min_by(|left, right| {
            let left = left.position.distance_squared(player.position);
            let right = right.position.distance_squared(player.position);
            left.total_cmp(&right)
        })
        .map(|enemy| Intent {
            pointer: (enemy.position + Vec2::splat(0.5)) * cell,
            fire: true,
            ..Intent::default()
        })
        .unwrap_or_default()
}
