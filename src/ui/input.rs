/// Keyboard input for a typing game.
///
/// Each frame `drain_events()` pulls every pending terminal event without
/// blocking. Presses and auto-repeats count; releases are ignored, so typing
/// behaves the same with or without keyboard enhancement.
///
/// Two views of the same events:
///   - `was_pressed` / `any_pressed` for one-shot commands (Enter, Esc, Tab)
///   - `edit_line` for feeding printable characters into a text buffer

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Key codes pressed (or repeated) during the last drain.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain, in arrival order.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.push(key);
            }
        }
    }

    fn push(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.presses.push(key.code);
        self.raw_events.push(key);
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Was this printable key pressed (either case, no Ctrl/Alt)?
    pub fn char_pressed(&self, c: char) -> bool {
        self.raw_events.iter().any(|k| match k.code {
            KeyCode::Char(got) => plain(k) && got.eq_ignore_ascii_case(&c),
            _ => false,
        })
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Apply this frame's typing to `line`: printable characters append
    /// (up to `max_len` chars), Backspace deletes, Ctrl+U clears.
    /// Returns true if the line changed.
    pub fn edit_line(&self, line: &mut String, max_len: usize) -> bool {
        let mut changed = false;
        for key in &self.raw_events {
            match key.code {
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    changed |= !line.is_empty();
                    line.clear();
                }
                KeyCode::Char(c) if plain(key) && !c.is_control() => {
                    if line.chars().count() < max_len {
                        line.push(c);
                        changed = true;
                    }
                }
                KeyCode::Backspace => {
                    changed |= line.pop().is_some();
                }
                _ => {}
            }
        }
        changed
    }
}

/// No modifiers other than Shift.
fn plain(key: &KeyEvent) -> bool {
    key.modifiers.difference(KeyModifiers::SHIFT).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn feed(keys: &[KeyEvent]) -> InputState {
        let mut input = InputState::new();
        for k in keys {
            input.push(*k);
        }
        input
    }

    #[test]
    fn typing_appends_and_backspace_deletes() {
        let input = feed(&[
            key(KeyCode::Char('z')),
            KeyEvent::new(KeyCode::Char('Y'), KeyModifiers::SHIFT),
            key(KeyCode::Char('w')),
            key(KeyCode::Backspace),
        ]);
        let mut line = String::new();
        assert!(input.edit_line(&mut line, 32));
        assert_eq!(line, "zY");
    }

    #[test]
    fn line_length_is_capped() {
        let input = feed(&[key(KeyCode::Char('a')), key(KeyCode::Char('b'))]);
        let mut line = "xyz".to_string();
        assert!(!input.edit_line(&mut line, 3));
        assert_eq!(line, "xyz");
    }

    #[test]
    fn control_chords_do_not_type() {
        let input = feed(&[
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        ]);
        let mut line = "niko".to_string();
        assert!(input.edit_line(&mut line, 32));
        assert!(line.is_empty());
        assert!(input.ctrl_c_pressed());
        assert!(!input.char_pressed('c'));
    }

    #[test]
    fn releases_are_ignored() {
        let mut release = key(KeyCode::Enter);
        release.kind = KeyEventKind::Release;
        let input = feed(&[release]);
        assert!(!input.was_pressed(KeyCode::Enter));

        let input = feed(&[key(KeyCode::Enter), key(KeyCode::Char('R'))]);
        assert!(input.any_pressed(&[KeyCode::Esc, KeyCode::Enter]));
        assert!(input.char_pressed('r'));
    }
}
