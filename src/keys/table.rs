//! Static keycode table
//!
//! Codes follow the libuiohook scan-code layout, with a few logical
//! additions (`Pause`, `Cmd`, `CmdOrCtrl`).

use super::KeyCode;

/// Named key codes
pub mod codes {
    use super::KeyCode;

    pub const BACKSPACE: KeyCode = 0x000E;
    pub const TAB: KeyCode = 0x000F;
    pub const ENTER: KeyCode = 0x001C;
    pub const CAPS_LOCK: KeyCode = 0x003A;
    pub const ESCAPE: KeyCode = 0x0001;
    pub const SPACE: KeyCode = 0x0039;
    pub const PAGE_UP: KeyCode = 0x0E49;
    pub const PAGE_DOWN: KeyCode = 0x0E51;
    pub const END: KeyCode = 0x0E4F;
    pub const HOME: KeyCode = 0x0E47;
    pub const ARROW_LEFT: KeyCode = 0xE04B;
    pub const ARROW_UP: KeyCode = 0xE048;
    pub const ARROW_RIGHT: KeyCode = 0xE04D;
    pub const ARROW_DOWN: KeyCode = 0xE050;
    pub const INSERT: KeyCode = 0x0E52;
    pub const DELETE: KeyCode = 0x0E53;
    pub const DIGIT_0: KeyCode = 0x000B;
    pub const DIGIT_1: KeyCode = 0x0002;
    pub const DIGIT_2: KeyCode = 0x0003;
    pub const DIGIT_3: KeyCode = 0x0004;
    pub const DIGIT_4: KeyCode = 0x0005;
    pub const DIGIT_5: KeyCode = 0x0006;
    pub const DIGIT_6: KeyCode = 0x0007;
    pub const DIGIT_7: KeyCode = 0x0008;
    pub const DIGIT_8: KeyCode = 0x0009;
    pub const DIGIT_9: KeyCode = 0x000A;
    pub const A: KeyCode = 0x001E;
    pub const B: KeyCode = 0x0030;
    pub const C: KeyCode = 0x002E;
    pub const D: KeyCode = 0x0020;
    pub const E: KeyCode = 0x0012;
    pub const F: KeyCode = 0x0021;
    pub const G: KeyCode = 0x0022;
    pub const H: KeyCode = 0x0023;
    pub const I: KeyCode = 0x0017;
    pub const J: KeyCode = 0x0024;
    pub const K: KeyCode = 0x0025;
    pub const L: KeyCode = 0x0026;
    pub const M: KeyCode = 0x0032;
    pub const N: KeyCode = 0x0031;
    pub const O: KeyCode = 0x0018;
    pub const P: KeyCode = 0x0019;
    pub const Q: KeyCode = 0x0010;
    pub const R: KeyCode = 0x0013;
    pub const S: KeyCode = 0x001F;
    pub const T: KeyCode = 0x0014;
    pub const U: KeyCode = 0x0016;
    pub const V: KeyCode = 0x002F;
    pub const W: KeyCode = 0x0011;
    pub const X: KeyCode = 0x002D;
    pub const Y: KeyCode = 0x0015;
    pub const Z: KeyCode = 0x002C;
    pub const NUMPAD_0: KeyCode = 0x0052;
    pub const NUMPAD_1: KeyCode = 0x004F;
    pub const NUMPAD_2: KeyCode = 0x0050;
    pub const NUMPAD_3: KeyCode = 0x0051;
    pub const NUMPAD_4: KeyCode = 0x004B;
    pub const NUMPAD_5: KeyCode = 0x004C;
    pub const NUMPAD_6: KeyCode = 0x004D;
    pub const NUMPAD_7: KeyCode = 0x0047;
    pub const NUMPAD_8: KeyCode = 0x0048;
    pub const NUMPAD_9: KeyCode = 0x0049;
    pub const NUMPAD_MULTIPLY: KeyCode = 0x0037;
    pub const NUMPAD_ADD: KeyCode = 0x004E;
    pub const NUMPAD_SUBTRACT: KeyCode = 0x004A;
    pub const NUMPAD_DECIMAL: KeyCode = 0x0053;
    pub const NUMPAD_DIVIDE: KeyCode = 0x0E35;
    pub const NUMPAD_END: KeyCode = 0xEE00 | 0x004F;
    pub const NUMPAD_ARROW_DOWN: KeyCode = 0xEE00 | 0x0050;
    pub const NUMPAD_PAGE_DOWN: KeyCode = 0xEE00 | 0x0051;
    pub const NUMPAD_ARROW_LEFT: KeyCode = 0xEE00 | 0x004B;
    pub const NUMPAD_ARROW_RIGHT: KeyCode = 0xEE00 | 0x004D;
    pub const NUMPAD_HOME: KeyCode = 0xEE00 | 0x0047;
    pub const NUMPAD_ARROW_UP: KeyCode = 0xEE00 | 0x0048;
    pub const NUMPAD_PAGE_UP: KeyCode = 0xEE00 | 0x0049;
    pub const NUMPAD_INSERT: KeyCode = 0xEE00 | 0x0052;
    pub const NUMPAD_DELETE: KeyCode = 0xEE00 | 0x0053;
    pub const F1: KeyCode = 0x003B;
    pub const F2: KeyCode = 0x003C;
    pub const F3: KeyCode = 0x003D;
    pub const F4: KeyCode = 0x003E;
    pub const F5: KeyCode = 0x003F;
    pub const F6: KeyCode = 0x0040;
    pub const F7: KeyCode = 0x0041;
    pub const F8: KeyCode = 0x0042;
    pub const F9: KeyCode = 0x0043;
    pub const F10: KeyCode = 0x0044;
    pub const F11: KeyCode = 0x0057;
    pub const F12: KeyCode = 0x0058;
    pub const F13: KeyCode = 0x005B;
    pub const F14: KeyCode = 0x005C;
    pub const F15: KeyCode = 0x005D;
    pub const F16: KeyCode = 0x0063;
    pub const F17: KeyCode = 0x0064;
    pub const F18: KeyCode = 0x0065;
    pub const F19: KeyCode = 0x0066;
    pub const F20: KeyCode = 0x0067;
    pub const F21: KeyCode = 0x0068;
    pub const F22: KeyCode = 0x0069;
    pub const F23: KeyCode = 0x006A;
    pub const F24: KeyCode = 0x006B;
    pub const SEMICOLON: KeyCode = 0x0027;
    pub const EQUAL: KeyCode = 0x000D;
    pub const COMMA: KeyCode = 0x0033;
    pub const MINUS: KeyCode = 0x000C;
    pub const PERIOD: KeyCode = 0x0034;
    pub const SLASH: KeyCode = 0x0035;
    pub const BACKQUOTE: KeyCode = 0x0029;
    pub const BRACKET_LEFT: KeyCode = 0x001A;
    pub const BACKSLASH: KeyCode = 0x002B;
    pub const BRACKET_RIGHT: KeyCode = 0x001B;
    pub const QUOTE: KeyCode = 0x0028;
    pub const CTRL: KeyCode = 0x001D;
    pub const CTRL_RIGHT: KeyCode = 0x0E1D;
    pub const ALT: KeyCode = 0x0038;
    pub const ALT_RIGHT: KeyCode = 0x0E38;
    pub const SHIFT: KeyCode = 0x002A;
    pub const SHIFT_RIGHT: KeyCode = 0x0036;
    pub const META: KeyCode = 0x0E5B;
    pub const META_RIGHT: KeyCode = 0x0E5C;
    pub const NUM_LOCK: KeyCode = 0x0045;
    pub const SCROLL_LOCK: KeyCode = 0x0046;
    pub const PRINT_SCREEN: KeyCode = 0x0E37;
    pub const PAUSE: KeyCode = 0x0077;
    pub const CMD: KeyCode = 0x0E5B;
    /// Command on macOS, Control elsewhere. Resolved for the target at build time.
    pub const CMD_OR_CTRL: KeyCode = if cfg!(target_os = "macos") { META } else { CTRL };
}

/// Name/code pairs in lookup order. Several names may share a code;
/// reverse lookup returns the first one listed.
pub const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("Backspace", codes::BACKSPACE),
    ("Tab", codes::TAB),
    ("Enter", codes::ENTER),
    ("CapsLock", codes::CAPS_LOCK),
    ("Escape", codes::ESCAPE),
    ("Space", codes::SPACE),
    ("PageUp", codes::PAGE_UP),
    ("PageDown", codes::PAGE_DOWN),
    ("End", codes::END),
    ("Home", codes::HOME),
    ("ArrowLeft", codes::ARROW_LEFT),
    ("ArrowUp", codes::ARROW_UP),
    ("ArrowRight", codes::ARROW_RIGHT),
    ("ArrowDown", codes::ARROW_DOWN),
    ("Insert", codes::INSERT),
    ("Delete", codes::DELETE),
    ("0", codes::DIGIT_0),
    ("1", codes::DIGIT_1),
    ("2", codes::DIGIT_2),
    ("3", codes::DIGIT_3),
    ("4", codes::DIGIT_4),
    ("5", codes::DIGIT_5),
    ("6", codes::DIGIT_6),
    ("7", codes::DIGIT_7),
    ("8", codes::DIGIT_8),
    ("9", codes::DIGIT_9),
    ("A", codes::A),
    ("B", codes::B),
    ("C", codes::C),
    ("D", codes::D),
    ("E", codes::E),
    ("F", codes::F),
    ("G", codes::G),
    ("H", codes::H),
    ("I", codes::I),
    ("J", codes::J),
    ("K", codes::K),
    ("L", codes::L),
    ("M", codes::M),
    ("N", codes::N),
    ("O", codes::O),
    ("P", codes::P),
    ("Q", codes::Q),
    ("R", codes::R),
    ("S", codes::S),
    ("T", codes::T),
    ("U", codes::U),
    ("V", codes::V),
    ("W", codes::W),
    ("X", codes::X),
    ("Y", codes::Y),
    ("Z", codes::Z),
    ("Numpad0", codes::NUMPAD_0),
    ("Numpad1", codes::NUMPAD_1),
    ("Numpad2", codes::NUMPAD_2),
    ("Numpad3", codes::NUMPAD_3),
    ("Numpad4", codes::NUMPAD_4),
    ("Numpad5", codes::NUMPAD_5),
    ("Numpad6", codes::NUMPAD_6),
    ("Numpad7", codes::NUMPAD_7),
    ("Numpad8", codes::NUMPAD_8),
    ("Numpad9", codes::NUMPAD_9),
    ("NumpadMultiply", codes::NUMPAD_MULTIPLY),
    ("NumpadAdd", codes::NUMPAD_ADD),
    ("NumpadSubtract", codes::NUMPAD_SUBTRACT),
    ("NumpadDecimal", codes::NUMPAD_DECIMAL),
    ("NumpadDivide", codes::NUMPAD_DIVIDE),
    ("NumpadEnd", codes::NUMPAD_END),
    ("NumpadArrowDown", codes::NUMPAD_ARROW_DOWN),
    ("NumpadPageDown", codes::NUMPAD_PAGE_DOWN),
    ("NumpadArrowLeft", codes::NUMPAD_ARROW_LEFT),
    ("NumpadArrowRight", codes::NUMPAD_ARROW_RIGHT),
    ("NumpadHome", codes::NUMPAD_HOME),
    ("NumpadArrowUp", codes::NUMPAD_ARROW_UP),
    ("NumpadPageUp", codes::NUMPAD_PAGE_UP),
    ("NumpadInsert", codes::NUMPAD_INSERT),
    ("NumpadDelete", codes::NUMPAD_DELETE),
    ("F1", codes::F1),
    ("F2", codes::F2),
    ("F3", codes::F3),
    ("F4", codes::F4),
    ("F5", codes::F5),
    ("F6", codes::F6),
    ("F7", codes::F7),
    ("F8", codes::F8),
    ("F9", codes::F9),
    ("F10", codes::F10),
    ("F11", codes::F11),
    ("F12", codes::F12),
    ("F13", codes::F13),
    ("F14", codes::F14),
    ("F15", codes::F15),
    ("F16", codes::F16),
    ("F17", codes::F17),
    ("F18", codes::F18),
    ("F19", codes::F19),
    ("F20", codes::F20),
    ("F21", codes::F21),
    ("F22", codes::F22),
    ("F23", codes::F23),
    ("F24", codes::F24),
    ("Semicolon", codes::SEMICOLON),
    ("Equal", codes::EQUAL),
    ("Comma", codes::COMMA),
    ("Minus", codes::MINUS),
    ("Period", codes::PERIOD),
    ("Slash", codes::SLASH),
    ("Backquote", codes::BACKQUOTE),
    ("BracketLeft", codes::BRACKET_LEFT),
    ("Backslash", codes::BACKSLASH),
    ("BracketRight", codes::BRACKET_RIGHT),
    ("Quote", codes::QUOTE),
    ("Ctrl", codes::CTRL),
    ("CtrlRight", codes::CTRL_RIGHT),
    ("Alt", codes::ALT),
    ("AltRight", codes::ALT_RIGHT),
    ("Shift", codes::SHIFT),
    ("ShiftRight", codes::SHIFT_RIGHT),
    ("Meta", codes::META),
    ("MetaRight", codes::META_RIGHT),
    ("NumLock", codes::NUM_LOCK),
    ("ScrollLock", codes::SCROLL_LOCK),
    ("PrintScreen", codes::PRINT_SCREEN),
    ("Pause", codes::PAUSE),
    ("Cmd", codes::CMD),
    ("CmdOrCtrl", codes::CMD_OR_CTRL),
];

/// Reverse lookup: the first table name carrying `code`.
pub fn key_name(code: KeyCode) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Forward lookup by name, ignoring ASCII case.
pub fn key_code(name: &str) -> Option<KeyCode> {
    KEY_NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}
