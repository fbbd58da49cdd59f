//! Variable values
//!
//! A variable holds either a scalar integer or a sequence of integers
//! (usually the code points of a string). Sequences are rotating FIFOs:
//! a rotating read hands out the front element and moves it to the back,
//! so reading never loses elements, it only reorders them.

use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(i64),
    Sequence(VecDeque<i64>),
}

impl Value {
    /// Sequence of the code points of `text`
    pub fn from_text(text: &str) -> Self {
        Value::Sequence(text.chars().map(|c| c as i64).collect())
    }

    /// An empty sequence
    pub fn empty_sequence() -> Self {
        Value::Sequence(VecDeque::new())
    }

    /// Read the value the way a push or a character print does
    ///
    /// Scalars read as themselves. Sequences return their front element and
    /// rotate it to the back; an empty sequence reads as `None`.
    pub fn read_rotating(&mut self) -> Option<i64> {
        match self {
            Value::Scalar(n) => Some(*n),
            Value::Sequence(items) => {
                let front = items.pop_front()?;
                items.push_back(front);
                Some(front)
            }
        }
    }

    /// Rotate a sequence by one position; scalars are left alone
    pub fn rotate(&mut self) {
        if let Value::Sequence(items) = self {
            items.rotate_left(items.len().min(1));
        }
    }

    /// Numeric view used by comparisons
    ///
    /// Scalars compare as themselves, sequences as their front element
    /// (without rotating), and an empty sequence as 0.
    pub fn numeric(&self) -> i64 {
        match self {
            Value::Scalar(n) => *n,
            Value::Sequence(items) => items.front().copied().unwrap_or(0),
        }
    }

    /// Printable text: decimal for scalars, characters for sequences
    pub fn as_text(&self) -> String {
        match self {
            Value::Scalar(n) => n.to_string(),
            Value::Sequence(items) => items.iter().map(|&c| char_from_code(c)).collect(),
        }
    }

    /// Debug rendering: `[65, 66]` for sequences, the decimal value for scalars
    pub fn render(&self) -> String {
        match self {
            Value::Scalar(n) => n.to_string(),
            Value::Sequence(items) => {
                let parts: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Character for a code point, U+FFFD when the number is not a valid `char`
pub fn char_from_code(code: i64) -> char {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps_around() {
        let mut value = Value::from_text("AB");
        assert_eq!(value.read_rotating(), Some('A' as i64));
        assert_eq!(value.read_rotating(), Some('B' as i64));
        // Two reads bring the sequence back to its original order
        assert_eq!(value, Value::from_text("AB"));
        assert_eq!(value.read_rotating(), Some('A' as i64));
    }

    #[test]
    fn test_rotation_keeps_every_element() {
        let mut value = Value::from_text("xyz");
        value.rotate();
        assert_eq!(value.as_text(), "yzx");
        value.rotate();
        value.rotate();
        assert_eq!(value.as_text(), "xyz");
    }

    #[test]
    fn test_empty_sequence_reads_nothing() {
        let mut value = Value::empty_sequence();
        assert_eq!(value.read_rotating(), None);
        value.rotate();
        assert_eq!(value, Value::empty_sequence());
        assert_eq!(value.numeric(), 0);
    }

    #[test]
    fn test_scalar_reads_do_not_change() {
        let mut value = Value::Scalar(42);
        assert_eq!(value.read_rotating(), Some(42));
        value.rotate();
        assert_eq!(value, Value::Scalar(42));
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::Scalar(-7).render(), "-7");
        assert_eq!(Value::from_text("Hi").render(), "[72, 105]");
        assert_eq!(Value::empty_sequence().render(), "[]");
    }

    #[test]
    fn test_char_from_code() {
        assert_eq!(char_from_code(65), 'A');
        assert_eq!(char_from_code(-1), char::REPLACEMENT_CHARACTER);
        assert_eq!(char_from_code(0xD800), char::REPLACEMENT_CHARACTER);
    }
}
