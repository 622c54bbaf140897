use std::ops::ControlFlow;

use sierpinski_engine::input::Key;

/// User intent decoded from a key press.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ViewCommand {
    /// Show one more level.
    DeepenLevels,
    /// Show one fewer level.
    ShallowerLevels,
    /// Rotate the palette forward.
    NextColor,
    /// Rotate the palette backward.
    PreviousColor,
    Quit,
}

impl ViewCommand {
    /// Fixed bindings: `D`/`A` depth, `W`/`S` color, `Escape` quit.
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::D => Some(Self::DeepenLevels),
            Key::A => Some(Self::ShallowerLevels),
            Key::W => Some(Self::NextColor),
            Key::S => Some(Self::PreviousColor),
            Key::Escape => Some(Self::Quit),
            _ => None,
        }
    }
}

/// What is on screen: how many levels, and where the palette starts.
///
/// Invariants: `1 <= visible_levels <= max_levels`,
/// `color_offset < palette_len`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ViewState {
    visible_levels: usize,
    color_offset: usize,
    max_levels: usize,
    palette_len: usize,
}

impl ViewState {
    /// Starts with only the root level visible and no palette rotation.
    ///
    /// Zero bounds are raised to 1.
    pub fn new(max_levels: usize, palette_len: usize) -> Self {
        Self {
            visible_levels: 1,
            color_offset: 0,
            max_levels: max_levels.max(1),
            palette_len: palette_len.max(1),
        }
    }

    pub fn visible_levels(&self) -> usize {
        self.visible_levels
    }

    pub fn color_offset(&self) -> usize {
        self.color_offset
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Applies one command. `Quit` leaves the state untouched and breaks.
    pub fn apply(&mut self, cmd: ViewCommand) -> ControlFlow<()> {
        match cmd {
            ViewCommand::DeepenLevels => {
                self.visible_levels = (self.visible_levels + 1).min(self.max_levels);
            }
            ViewCommand::ShallowerLevels => {
                self.visible_levels = self.visible_levels.saturating_sub(1).max(1);
            }
            ViewCommand::NextColor => {
                self.color_offset = (self.color_offset + 1) % self.palette_len;
            }
            ViewCommand::PreviousColor => {
                // Add the modulus first so 0 wraps to len - 1 without underflow.
                self.color_offset = (self.color_offset + self.palette_len - 1) % self.palette_len;
            }
            ViewCommand::Quit => return ControlFlow::Break(()),
        }

        log::debug!(
            "{cmd:?}: levels {}/{}, color offset {}",
            self.visible_levels,
            self.max_levels,
            self.color_offset
        );
        ControlFlow::Continue(())
    }

    /// Applies the commands bound to `keys`, in order, stopping at `Quit`.
    pub fn handle_keys<I>(&mut self, keys: I) -> ControlFlow<()>
    where
        I: IntoIterator<Item = Key>,
    {
        for cmd in keys.into_iter().filter_map(ViewCommand::from_key) {
            self.apply(cmd)?;
        }
        ControlFlow::Continue(())
    }
}
