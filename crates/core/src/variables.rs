//! Variable table
//!
//! Variables are named by exactly one ASCII letter (case sensitive). Binding
//! a name creates it; later assignments overwrite both the kind and the
//! contents of the value.

use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A validated single-letter variable name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarName(char);

impl VarName {
    /// Returns `None` unless `c` is an ASCII letter
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_alphabetic().then_some(VarName(c))
    }

    /// Parse a whole string that must be exactly one letter
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => VarName::new(c),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from variable names to values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    bindings: BTreeMap<VarName, Value>,
}

impl VariableTable {
    pub fn new() -> Self {
        VariableTable::default()
    }

    pub fn get(&self, name: VarName) -> Option<&Value> {
        self.bindings.get(&name)
    }

    /// Exclusive access for in-place updates such as rotation
    pub fn get_mut(&mut self, name: VarName) -> Option<&mut Value> {
        self.bindings.get_mut(&name)
    }

    /// Bind `name`, replacing whatever it held before
    pub fn set(&mut self, name: VarName, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Existing binding, or a fresh one initialized by `init`
    pub fn entry_or_insert_with(&mut self, name: VarName, init: impl FnOnce() -> Value) -> &mut Value {
        self.bindings.entry(name).or_insert_with(init)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(c: char) -> VarName {
        VarName::new(c).unwrap()
    }

    #[test]
    fn test_var_name_validation() {
        assert!(VarName::new('a').is_some());
        assert!(VarName::new('Z').is_some());
        assert!(VarName::new('1').is_none());
        assert!(VarName::new('é').is_none());
        assert_eq!(VarName::parse("x"), Some(name('x')));
        assert_eq!(VarName::parse("xy"), None);
        assert_eq!(VarName::parse(""), None);
    }

    #[test]
    fn test_assignment_overwrites_kind() {
        let mut vars = VariableTable::new();
        vars.set(name('x'), Value::Scalar(1));
        vars.set(name('x'), Value::from_text("hi"));
        assert_eq!(vars.get(name('x')), Some(&Value::from_text("hi")));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut vars = VariableTable::new();
        vars.set(name('a'), Value::Scalar(1));
        assert_eq!(vars.get(name('a')), Some(&Value::Scalar(1)));
        assert_eq!(vars.get(name('A')), None);
    }

    #[test]
    fn test_rotation_through_get_mut() {
        let mut vars = VariableTable::new();
        vars.set(name('s'), Value::from_text("AB"));
        let first = vars.get_mut(name('s')).and_then(Value::read_rotating);
        assert_eq!(first, Some('A' as i64));
        assert_eq!(vars.get(name('s')).map(Value::as_text), Some("BA".to_string()));
    }

    #[test]
    fn test_entry_or_insert_with() {
        let mut vars = VariableTable::new();
        *vars.entry_or_insert_with(name('n'), || Value::Scalar(0)) = Value::Scalar(5);
        let existing = vars.entry_or_insert_with(name('n'), || Value::Scalar(0));
        assert_eq!(existing, &mut Value::Scalar(5));
    }
}
