use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Keys currently held in the window.
///
/// Used to normalize presses: a press for a key that is already down is
/// recorded as a repeat, whatever the platform reported.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an event to the held set and records it into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        let ev = match ev {
            InputEvent::Focused(false) => {
                // Releases are not delivered while unfocused.
                self.keys_down.clear();
                ev
            }

            InputEvent::Key { key, state, repeat } => {
                let repeat = match state {
                    KeyState::Pressed => !self.keys_down.insert(key) || repeat,
                    KeyState::Released => {
                        self.keys_down.remove(&key);
                        repeat
                    }
                };
                InputEvent::Key { key, state, repeat }
            }

            InputEvent::Focused(true) => ev,
        };

        frame.push_event(ev);
    }
}
