//! Property test strategies for Tether types

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use tether_core::KeyCode;

/// Any key the keyboard contract knows about
pub fn arb_key_code() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Escape),
        Just(KeyCode::Enter),
        Just(KeyCode::Tab),
        Just(KeyCode::Backspace),
        Just(KeyCode::Up),
        Just(KeyCode::Down),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
        proptest::char::range('a', 'z').prop_map(KeyCode::Char),
    ]
}

/// Short user names
pub fn arb_user_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Non-empty sequences of user names, as fed to successive session sets
pub fn arb_user_sequence(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_user_name(), 1..=max_len.max(1))
}
