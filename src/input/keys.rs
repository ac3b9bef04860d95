//! Keyboard codes understood by the UI, and US-layout text mapping.

/// Keys the UI reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Space,
    Backspace,
    Delete,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Escape,
    LShift,
    RShift,
    Shift,
    LControl,
    RControl,
    Control,
    LSuper,
    RSuper,
    Minus,
    Equal,
    Period,
    Comma,
    Slash,
    Quote,
    Semicolon,
    LBracket,
    RBracket,
    Backslash,
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::A,
    KeyCode::B,
    KeyCode::C,
    KeyCode::D,
    KeyCode::E,
    KeyCode::F,
    KeyCode::G,
    KeyCode::H,
    KeyCode::I,
    KeyCode::J,
    KeyCode::K,
    KeyCode::L,
    KeyCode::M,
    KeyCode::N,
    KeyCode::O,
    KeyCode::P,
    KeyCode::Q,
    KeyCode::R,
    KeyCode::S,
    KeyCode::T,
    KeyCode::U,
    KeyCode::V,
    KeyCode::W,
    KeyCode::X,
    KeyCode::Y,
    KeyCode::Z,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Num0,
    KeyCode::Num1,
    KeyCode::Num2,
    KeyCode::Num3,
    KeyCode::Num4,
    KeyCode::Num5,
    KeyCode::Num6,
    KeyCode::Num7,
    KeyCode::Num8,
    KeyCode::Num9,
];

/// Shifted glyphs of the digit row, indexed by digit.
const SHIFTED_DIGITS: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

impl KeyCode {
    /// Letter key for an ASCII letter, either case.
    pub fn from_letter(c: char) -> Option<KeyCode> {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase()
            .then(|| LETTERS[(c as u8 - b'A') as usize])
    }

    pub fn from_digit(d: u32) -> Option<KeyCode> {
        DIGITS.get(d as usize).copied()
    }

    pub fn is_shift(self) -> bool {
        matches!(self, KeyCode::LShift | KeyCode::RShift | KeyCode::Shift)
    }

    pub fn is_control(self) -> bool {
        matches!(self, KeyCode::LControl | KeyCode::RControl | KeyCode::Control)
    }

    pub fn is_super(self) -> bool {
        matches!(self, KeyCode::LSuper | KeyCode::RSuper)
    }

    /// Text produced by the key on a US layout, if any.
    pub fn to_char(self, shift: bool) -> Option<char> {
        if let Some(i) = LETTERS.iter().position(|k| *k == self) {
            let c = (b'a' + i as u8) as char;
            return Some(if shift { c.to_ascii_uppercase() } else { c });
        }
        if let Some(i) = DIGITS.iter().position(|k| *k == self) {
            return Some(if shift {
                SHIFTED_DIGITS[i]
            } else {
                (b'0' + i as u8) as char
            });
        }
        let (plain, shifted) = match self {
            KeyCode::Space => (' ', ' '),
            KeyCode::Minus => ('-', '_'),
            KeyCode::Equal => ('=', '+'),
            KeyCode::Period => ('.', '>'),
            KeyCode::Comma => (',', '<'),
            KeyCode::Slash => ('/', '?'),
            KeyCode::Quote => ('\'', '"'),
            KeyCode::Semicolon => (';', ':'),
            KeyCode::LBracket => ('[', '{'),
            KeyCode::RBracket => (']', '}'),
            KeyCode::Backslash => ('\\', '|'),
            _ => return None,
        };
        Some(if shift { shifted } else { plain })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_shift_mapping() {
        assert_eq!(KeyCode::H.to_char(false), Some('h'));
        assert_eq!(KeyCode::H.to_char(true), Some('H'));
        assert_eq!(KeyCode::Num1.to_char(true), Some('!'));
        assert_eq!(KeyCode::Num0.to_char(true), Some(')'));
        assert_eq!(KeyCode::Num7.to_char(false), Some('7'));
        assert_eq!(KeyCode::Quote.to_char(true), Some('"'));
        assert_eq!(KeyCode::Backslash.to_char(true), Some('|'));
        assert_eq!(KeyCode::Enter.to_char(false), None);
    }

    #[test]
    fn test_letter_lookup() {
        assert_eq!(KeyCode::from_letter('q'), Some(KeyCode::Q));
        assert_eq!(KeyCode::from_letter('Z'), Some(KeyCode::Z));
        assert_eq!(KeyCode::from_letter('1'), None);
        assert_eq!(KeyCode::from_digit(5), Some(KeyCode::Num5));
    }
}
