#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration for Tank Battlegrounds.
//!
//! The [`Orchestrator`] alternates between an overlay (menu or message) that
//! only accepts navigation input and play, where the active [`Session`]
//! advances once per tick. Sessions are replaced wholesale on load and
//! discarded on a faulty tick; they are never patched in place.

mod bus;
mod overlay;
mod session;

pub use bus::{EventBus, Observer, Tally};
pub use overlay::{
    Menu, MenuAction, MenuEntry, Navigation, Overlay, DEFEAT_MESSAGE, LOAD_FAILED_MESSAGE,
    TICK_FAILED_MESSAGE, VICTORY_MESSAGE,
};
pub use session::{evaluate_outcome, Session};
pub use tank_battlegrounds_system_player_control::{pointer_to_grid, Intent};

use tank_battlegrounds_core::{LayerKind, Level, LoadError, Outcome, SimulationConfig};
use tank_battlegrounds_world::query;
use tracing::{debug, error, info, warn};

/// Source of decoded levels, keyed by the names listed in the menu.
pub trait LevelLoader {
    /// Loads and decodes the named level.
    fn load(&self, name: &str) -> Result<Level, LoadError>;
}

impl<F> LevelLoader for F
where
    F: Fn(&str) -> Result<Level, LoadError>,
{
    fn load(&self, name: &str) -> Result<Level, LoadError> {
        self(name)
    }
}

/// Macro-state of the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// An overlay is shown and the simulation is paused.
    Overlay,
    /// The simulation advances every frame.
    Playing,
}

/// Owns the active session and routes input to it or to the overlay.
#[derive(Debug)]
pub struct Orchestrator<L> {
    loader: L,
    levels: Vec<String>,
    config: SimulationConfig,
    session: Option<Session>,
    overlay: Overlay,
    mode: Mode,
    bus: EventBus,
    running: bool,
}

impl<L: LevelLoader> Orchestrator<L> {
    /// Creates an orchestrator showing the main menu for `levels`.
    #[must_use]
    pub fn new(loader: L, levels: Vec<String>, config: SimulationConfig) -> Self {
        Self {
            overlay: Overlay::Menu(Menu::for_levels(&levels)),
            loader,
            levels,
            config,
            session: None,
            mode: Mode::Overlay,
            bus: EventBus::new(),
            running: true,
        }
    }

    /// Subscribes an observer to every session run by this orchestrator.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.bus.subscribe(observer);
    }

    /// Current macro-state.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Overlay shown while in [`Mode::Overlay`].
    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Reports whether the run loop should keep going.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Requests that the run loop stop.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Loads the named level and starts playing it.
    ///
    /// On failure the previous session, if any, is left untouched and the
    /// load-failure message is shown.
    pub fn load_level(&mut self, name: &str) -> Result<(), LoadError> {
        let started = self
            .loader
            .load(name)
            .and_then(|level| Session::start(level, self.config));

        match started {
            Ok(session) => {
                let grid = query::grid(session.world());
                info!(
                    level = name,
                    width = grid.width(),
                    height = grid.height(),
                    units = session.level().spawns.len(),
                    "level loaded"
                );
                for layer in LayerKind::ALL {
                    if let Some(sheet) = session.level().sheet(layer) {
                        debug!(
                            layer = ?layer,
                            image = %sheet.image,
                            columns = sheet.columns,
                            "tile sheet"
                        );
                    }
                }
                self.session = Some(session);
                self.mode = Mode::Playing;
                Ok(())
            }
            Err(load_error) => {
                warn!(level = name, error = %load_error, "level load failed");
                self.show_message(LOAD_FAILED_MESSAGE);
                Err(load_error)
            }
        }
    }

    /// Switches to the main menu, pausing any running session.
    pub fn show_menu(&mut self) {
        self.overlay = Overlay::Menu(Menu::for_levels(&self.levels));
        self.mode = Mode::Overlay;
    }

    /// Returns to a running session. Finished or missing sessions cannot be
    /// resumed.
    pub fn resume(&mut self) -> bool {
        let resumable = self
            .session
            .as_ref()
            .is_some_and(|session| session.outcome().is_none());
        if resumable {
            self.mode = Mode::Playing;
        }
        resumable
    }

    /// Applies navigation input to the overlay. Ignored while playing.
    pub fn navigate(&mut self, input: Navigation) {
        if self.mode != Mode::Overlay {
            return;
        }

        let action = match &mut self.overlay {
            Overlay::Message(_) => {
                if matches!(input, Navigation::Confirm | Navigation::Back) {
                    self.show_menu();
                }
                return;
            }
            Overlay::Menu(menu) => match input {
                Navigation::Up => {
                    menu.select_previous();
                    return;
                }
                Navigation::Down => {
                    menu.select_next();
                    return;
                }
                Navigation::Back => {
                    let _ = self.resume();
                    return;
                }
                Navigation::Confirm => match menu.selected() {
                    Some(entry) => entry.action.clone(),
                    None => return,
                },
            },
        };

        match action {
            MenuAction::LoadLevel(name) => {
                let _ = self.load_level(&name);
            }
            MenuAction::Quit => self.quit(),
        }
    }

    /// Advances the simulation by one frame of `ticks_per_frame` ticks.
    ///
    /// Movement and fire intents apply to the first tick of the frame only;
    /// the aim point applies to every tick. Returns the outcome reached during
    /// the frame, if any.
    pub fn frame(&mut self, intent: &Intent) -> Option<Outcome> {
        let ticks = self.config.ticks_per_frame.max(1);
        for index in 0..ticks {
            if self.mode != Mode::Playing {
                return None;
            }
            let tick_intent = if index == 0 {
                *intent
            } else {
                Intent::aim_only(intent.pointer)
            };
            if let Some(outcome) = self.tick(&tick_intent) {
                return Some(outcome);
            }
        }
        None
    }

    fn tick(&mut self, intent: &Intent) -> Option<Outcome> {
        let Some(session) = self.session.as_mut() else {
            self.show_menu();
            return None;
        };

        match session.tick(intent, &mut self.bus) {
            Ok(None) => None,
            Ok(Some(outcome)) => {
                info!(
                    tick = query::tick(session.world()).get(),
                    outcome = ?outcome,
                    "session finished"
                );
                self.show_message(match outcome {
                    Outcome::Victory => VICTORY_MESSAGE,
                    Outcome::Defeat => DEFEAT_MESSAGE,
                });
                Some(outcome)
            }
            Err(tick_error) => {
                error!(error = %tick_error, "tick failed; discarding session");
                self.session = None;
                self.show_message(TICK_FAILED_MESSAGE);
                None
            }
        }
    }

    fn show_message(&mut self, text: &str) {
        self.overlay = Overlay::Message(text.to_owned());
        self.mode = Mode::Overlay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_battlegrounds_core::{
        CellCoord, CellSize, Command, Grid, Role, TileRef, UnitId, UnitSpawn,
    };

    fn duel(name: &str) -> Result<Level, LoadError> {
        let spawn = |role, column| UnitSpawn {
            role,
            cell: CellCoord::new(column, 0),
            tile: TileRef::new(0, 0),
        };
        match name {
            "duel" => Ok(Level {
                grid: Grid::open(8, 1),
                ground: vec![None; 8],
                spawns: vec![spawn(Role::Player, 0), spawn(Role::SentryTurret, 7)],
                cell_size: CellSize {
                    width: 32,
                    height: 32,
                },
                sheets: Default::default(),
            }),
            _ => Err(LoadError::MissingPlayer),
        }
    }

    #[test]
    fn faulty_tick_discards_the_session() {
        let mut orchestrator =
            Orchestrator::new(duel, vec!["duel".to_owned()], SimulationConfig::default());
        orchestrator.load_level("duel").expect("level loads");
        orchestrator
            .session_mut()
            .expect("session is active")
            .queue(Command::Shoot {
                unit: UnitId::new(99),
            });

        assert_eq!(orchestrator.frame(&Intent::default()), None);

        assert!(orchestrator.session().is_none());
        assert_eq!(orchestrator.mode(), Mode::Overlay);
        assert_eq!(
            orchestrator.overlay(),
            &Overlay::Message(TICK_FAILED_MESSAGE.to_owned())
        );
        assert!(!orchestrator.resume());
    }
}
