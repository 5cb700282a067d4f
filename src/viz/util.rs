use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

/// The key code of a key press, ignoring releases, repeats and non-key events
pub(super) fn event_keycode(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) => Some(*code),
        _ => None,
    }
}
