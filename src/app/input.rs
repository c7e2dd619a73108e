//! winit 按键事件到 `AppKey` 的映射

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, NamedKey};

use super::state::AppKey;

/// 把 winit 逻辑按键映射为 `AppKey`
pub fn map_key(key: &Key) -> AppKey {
    match key {
        Key::Named(NamedKey::Escape) => AppKey::Escape,
        Key::Character(text) => text.chars().next().map(AppKey::Char).unwrap_or(AppKey::Other),
        _ => AppKey::Other,
    }
}

/// 映射按键事件；只处理按下，松开和自动重复被忽略
pub fn map_key_event(event: &KeyEvent) -> Option<AppKey> {
    if event.state == ElementState::Pressed && !event.repeat {
        Some(map_key(&event.logical_key))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_named_keys() {
        assert_eq!(map_key(&Key::Named(NamedKey::Escape)), AppKey::Escape);
        assert_eq!(map_key(&Key::Named(NamedKey::Enter)), AppKey::Other);
    }

    #[test]
    fn test_map_characters() {
        assert_eq!(map_key(&Key::Character("w".into())), AppKey::Char('w'));
        assert_eq!(map_key(&Key::Character("W".into())), AppKey::Char('W'));
    }
}
