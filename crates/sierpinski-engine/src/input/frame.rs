use super::types::{InputEvent, Key};

/// Input events received since the last frame, in arrival order.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    /// Fresh key presses in arrival order, repeats excluded.
    pub fn presses(&self) -> impl Iterator<Item = Key> + '_ {
        self.events.iter().filter_map(InputEvent::fresh_press)
    }
}
