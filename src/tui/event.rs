use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::warn;

use crate::core::config::ResolvedConfig;
use crate::core::state::Stage;

/// TUI-specific input events
pub enum TuiEvent {
    Key(KeyEvent),
    Resize,
}

/// Poll for an event with timeout
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).unwrap_or(false) {
        return None;
    }
    match event::read().ok()? {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(TuiEvent::Key(key)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// The symbolic actions keys can be bound to. The reducer only ever sees
/// these; raw key codes stop here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolicAction {
    Quit,
    Back,
    Confirm,
    Select,
    SelectAll,
}

/// One parsed binding: a key code plus required modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyPress {
    fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code && self.mods == key.modifiers
    }
}

/// Parse a binding spec like `"esc"`, `"space"` or `"ctrl+c"`.
pub fn parse_key(spec: &str) -> Option<KeyPress> {
    let mut mods = KeyModifiers::NONE;
    let mut code = None;

    for part in spec.split('+') {
        let part = part.trim().to_ascii_lowercase();
        match part.as_str() {
            "ctrl" => mods |= KeyModifiers::CONTROL,
            "alt" => mods |= KeyModifiers::ALT,
            "shift" => mods |= KeyModifiers::SHIFT,
            "esc" | "escape" => code = Some(KeyCode::Esc),
            "enter" => code = Some(KeyCode::Enter),
            "space" => code = Some(KeyCode::Char(' ')),
            "tab" => code = Some(KeyCode::Tab),
            "backspace" => code = Some(KeyCode::Backspace),
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => code = Some(KeyCode::Char(c)),
                    _ => return None,
                }
            }
        }
    }

    code.map(|code| KeyPress { code, mods })
}

/// The configured key bindings, resolved once at startup.
pub struct KeyMap {
    quit: KeyPress,
    back: KeyPress,
    confirm: KeyPress,
    select: KeyPress,
    select_all: KeyPress,
}

impl KeyMap {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            quit: parse_or_default(&config.key_quit, "ctrl+c"),
            back: parse_or_default(&config.key_back, "esc"),
            confirm: parse_or_default(&config.key_confirm, "enter"),
            select: parse_or_default(&config.key_select, "space"),
            select_all: parse_or_default(&config.key_select_all, "a"),
        }
    }

    /// Resolve a key press to a symbolic action for the given stage.
    ///
    /// While the search box has focus only quit/back/confirm are consulted,
    /// so letters bound elsewhere still type into the input.
    pub fn resolve(&self, stage: Stage, key: &KeyEvent) -> Option<SymbolicAction> {
        if self.quit.matches(key) {
            return Some(SymbolicAction::Quit);
        }
        if self.back.matches(key) {
            return Some(SymbolicAction::Back);
        }
        if self.confirm.matches(key) {
            return Some(SymbolicAction::Confirm);
        }
        if stage == Stage::Search {
            return None;
        }
        if self.select.matches(key) {
            return Some(SymbolicAction::Select);
        }
        if self.select_all.matches(key) {
            return Some(SymbolicAction::SelectAll);
        }
        None
    }
}

fn parse_or_default(spec: &str, fallback: &str) -> KeyPress {
    parse_key(spec).unwrap_or_else(|| {
        warn!("Unparseable key binding '{}', using '{}'", spec, fallback);
        parse_key(fallback).expect("default key bindings parse")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{TomeConfig, resolve};

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    fn default_map() -> KeyMap {
        let resolved = resolve(&TomeConfig::default(), None, &[]);
        KeyMap::from_config(&resolved)
    }

    #[test]
    fn test_parse_simple_keys() {
        assert_eq!(
            parse_key("esc"),
            Some(KeyPress {
                code: KeyCode::Esc,
                mods: KeyModifiers::NONE
            })
        );
        assert_eq!(
            parse_key("space"),
            Some(KeyPress {
                code: KeyCode::Char(' '),
                mods: KeyModifiers::NONE
            })
        );
        assert_eq!(
            parse_key("ctrl+c"),
            Some(KeyPress {
                code: KeyCode::Char('c'),
                mods: KeyModifiers::CONTROL
            })
        );
        assert_eq!(parse_key("hyper+x"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_resolve_symbolic_actions() {
        let map = default_map();
        let quit = key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let select = key(KeyCode::Char(' '), KeyModifiers::NONE);

        assert_eq!(
            map.resolve(Stage::ChapterSelect, &quit),
            Some(SymbolicAction::Quit)
        );
        assert_eq!(
            map.resolve(Stage::ChapterSelect, &select),
            Some(SymbolicAction::Select)
        );
    }

    #[test]
    fn test_search_stage_leaves_letters_for_typing() {
        let map = default_map();
        let select_all = key(KeyCode::Char('a'), KeyModifiers::NONE);

        assert_eq!(map.resolve(Stage::Search, &select_all), None);
        assert_eq!(
            map.resolve(Stage::ChapterSelect, &select_all),
            Some(SymbolicAction::SelectAll)
        );
    }
}
