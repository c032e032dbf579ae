use std::{cell::RefCell, fmt, rc::Rc};

use glam::Vec2;
use tank_battlegrounds_core::{Event, UnitId};

/// Receiver of state-change notifications, used for effects only.
///
/// Observers are called synchronously while the tick runs and never receive
/// mutable access to the simulation.
pub trait Observer {
    /// A bullet destroyed `unit` at `position`.
    fn on_unit_destroyed(&mut self, _unit: UnitId, _position: Vec2) {}

    /// `unit` fired a bullet from `origin` toward `target`.
    fn on_bullet_fired(&mut self, _unit: UnitId, _origin: Vec2, _target: Vec2) {}
}

impl<T: Observer> Observer for Rc<RefCell<T>> {
    fn on_unit_destroyed(&mut self, unit: UnitId, position: Vec2) {
        self.borrow_mut().on_unit_destroyed(unit, position);
    }

    fn on_bullet_fired(&mut self, unit: UnitId, origin: Vec2, target: Vec2) {
        self.borrow_mut().on_bullet_fired(unit, origin, target);
    }
}

/// Fans world events out to every subscribed observer.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn Observer>>,
}

impl EventBus {
    /// Creates a bus without observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer. Delivery order between observers is unspecified.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Delivers a single event to every observer.
    pub fn publish(&mut self, event: &Event) {
        match *event {
            Event::UnitDestroyed { unit, position } => {
                for observer in &mut self.observers {
                    observer.on_unit_destroyed(unit, position);
                }
            }
            Event::BulletFired {
                unit,
                origin,
                target,
                ..
            } => {
                for observer in &mut self.observers {
                    observer.on_bullet_fired(unit, origin, target);
                }
            }
            Event::TimeAdvanced { .. } => {}
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that counts shots and kills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Bullets fired by any unit.
    pub shots: u32,
    /// Units destroyed.
    pub kills: u32,
}

impl Observer for Tally {
    fn on_unit_destroyed(&mut self, _unit: UnitId, _position: Vec2) {
        self.kills = self.kills.saturating_add(1);
    }

    fn on_bullet_fired(&mut self, _unit: UnitId, _origin: Vec2, _target: Vec2) {
        self.shots = self.shots.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_battlegrounds_core::{BulletId, Tick};

    #[test]
    fn events_reach_every_observer() {
        let first = Rc::new(RefCell::new(Tally::default()));
        let second = Rc::new(RefCell::new(Tally::default()));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(Rc::clone(&first)));
        bus.subscribe(Box::new(Rc::clone(&second)));

        bus.publish(&Event::BulletFired {
            unit: UnitId::new(0),
            bullet: BulletId::new(0),
            origin: Vec2::ZERO,
            target: Vec2::ONE,
        });
        bus.publish(&Event::UnitDestroyed {
            unit: UnitId::new(1),
            position: Vec2::ONE,
        });
        bus.publish(&Event::TimeAdvanced { tick: Tick::new(1) });

        for tally in [first, second] {
            assert_eq!(*tally.borrow(), Tally { shots: 1, kills: 1 });
        }
    }
}
