use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// Viewer commands bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SwitchFocus,
    Up,
    Down,
    Toggle,
    ToggleAnatomy,
    ToggleObservation,
    ToggleSelectAll,
    NextRecord,
    PreviousRecord,
}

impl Action {
    /// Map a key press to an action. Release and repeat events are ignored.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let action = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Self::Quit,
            KeyCode::Tab | KeyCode::BackTab => Self::SwitchFocus,
            KeyCode::Up | KeyCode::Char('k') => Self::Up,
            KeyCode::Down | KeyCode::Char('j') => Self::Down,
            KeyCode::Char(' ') | KeyCode::Enter => Self::Toggle,
            KeyCode::Char('a') => Self::ToggleAnatomy,
            KeyCode::Char('o') => Self::ToggleObservation,
            KeyCode::Char('s') => Self::ToggleSelectAll,
            KeyCode::Char('n') | KeyCode::Right => Self::NextRecord,
            KeyCode::Char('p') | KeyCode::Left => Self::PreviousRecord,
            _ => return None,
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEventState, KeyModifiers};

    #[test]
    fn test_key_bindings() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(Action::from_key(key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(Action::from_key(key(KeyCode::Tab)), Some(Action::SwitchFocus));
        assert_eq!(Action::from_key(key(KeyCode::Char(' '))), Some(Action::Toggle));
        assert_eq!(Action::from_key(key(KeyCode::Char('s'))), Some(Action::ToggleSelectAll));
        assert_eq!(Action::from_key(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_release_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(Action::from_key(release), None);
    }
}
