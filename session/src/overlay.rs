/// Text shown when the player destroys every enemy.
pub const VICTORY_MESSAGE: &str = "Victory !";
/// Text shown when the player's unit is destroyed.
pub const DEFEAT_MESSAGE: &str = "GAME OVER";
/// Text shown when a level cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Level loading failed :-(";
/// Text shown when a tick faults and the session is discarded.
pub const TICK_FAILED_MESSAGE: &str = "Error during the game update...";

/// Discrete navigation input accepted while an overlay is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Moves the cursor to the previous entry.
    Up,
    /// Moves the cursor to the next entry.
    Down,
    /// Activates the highlighted entry or dismisses a message.
    Confirm,
    /// Returns to the game, or from a message to the menu.
    Back,
}

/// Action bound to a menu entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    /// Loads the named level.
    LoadLevel(String),
    /// Stops the run loop.
    Quit,
}

/// Single line of the main menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Text shown for the entry.
    pub title: String,
    /// Action run when the entry is confirmed.
    pub action: MenuAction,
}

/// Main menu listing one entry per level followed by "Quit".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
    cursor: usize,
}

impl Menu {
    /// Builds the menu for the provided level names.
    #[must_use]
    pub fn for_levels(levels: &[String]) -> Self {
        let mut entries: Vec<MenuEntry> = levels
            .iter()
            .enumerate()
            .map(|(index, name)| MenuEntry {
                title: format!("Level {}", index + 1),
                action: MenuAction::LoadLevel(name.clone()),
            })
            .collect();
        entries.push(MenuEntry {
            title: "Quit".to_owned(),
            action: MenuAction::Quit,
        });
        Self { entries, cursor: 0 }
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Index of the highlighted entry.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Highlighted entry.
    #[must_use]
    pub fn selected(&self) -> Option<&MenuEntry> {
        self.entries.get(self.cursor)
    }

    pub(crate) fn select_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn select_next(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }
}

/// Overlay drawn on top of (or instead of) the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// The main menu.
    Menu(Menu),
    /// A centred message dismissed by any navigation confirm/back.
    Message(String),
}
