//! Tokens produced by the lexer
//!
//! Every token records the character offset where it starts in the cleaned
//! top-level source. Tokens that carry an embedded fragment (var-block
//! bodies, conditional predicates and commands) also record where that
//! fragment starts, so re-tokenizing it later yields offsets into the same
//! source.

use bluenexus_core::VarName;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset in the cleaned top-level source
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Token { kind, offset }
    }

    /// True when this token is the given single-character glyph
    pub fn is_glyph(&self, glyph: Glyph) -> bool {
        matches!(self.kind, TokenKind::Glyph(g) if g == glyph)
    }
}

/// An embedded piece of source, re-tokenized when it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    /// Offset of the first character of `text`
    pub offset: usize,
    /// Absolute offsets where a number literal must end because the raw
    /// source separated two digits with whitespace or a comma. Sorted.
    pub breaks: Vec<usize>,
}

impl Fragment {
    /// A fragment with no literal breaks
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Fragment {
            text: text.into(),
            offset,
            breaks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Number(i64),
    Str(String),
    VarRef(VarName),
    /// `>Xop N<`: in-place update of X
    VarExpr { name: VarName, expr: String },
    /// `>X<body<`: assignment whose meaning depends on the body's shape
    VarBlock { name: VarName, body: Fragment },
    /// `?[kind]{predicate}(command)`
    Conditional {
        kind: ConditionalKind,
        predicate: Fragment,
        command: Fragment,
    },
    /// `↡[param]` / `▼[param]`
    PopN(String),
    /// `_stack`, `_var=x`, ...
    Debug(String),
    Glyph(Glyph),
    /// Two-character comparison (`>=`, `<=`, `!=`)
    Compare(CompareOp),
    /// `.$X`
    SilentRotate(VarName),
    // Produced only by the top-level push pre-pass
    PushNumber(i64),
    PushVariable(VarName),
    PushInput,
}

/// Single-character operators and markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// `▲` push marker
    Push,
    /// `▼` discard top
    Discard,
    /// `⇅`
    Duplicate,
    /// `↔`
    Swap,
    Add,
    Subtract,
    /// `×`
    Multiply,
    /// `÷` (floor)
    Divide,
    Modulo,
    /// `#` print number
    PrintNumber,
    /// `$` print character
    PrintChar,
    /// `¦`
    Newline,
    /// `&` input request
    Input,
    /// `~` stack peek
    Peek,
    Greater,
    Less,
    Equal,
    Bang,
    Star,
    Dot,
}

impl Glyph {
    /// Glyph for a character, excluding `.` which the lexer handles itself
    pub fn from_char(c: char) -> Option<Self> {
        let glyph = match c {
            '▲' => Glyph::Push,
            '▼' => Glyph::Discard,
            '⇅' => Glyph::Duplicate,
            '↔' => Glyph::Swap,
            '+' => Glyph::Add,
            '-' => Glyph::Subtract,
            '×' => Glyph::Multiply,
            '÷' => Glyph::Divide,
            '%' => Glyph::Modulo,
            '#' => Glyph::PrintNumber,
            '$' => Glyph::PrintChar,
            '¦' => Glyph::Newline,
            '&' => Glyph::Input,
            '~' => Glyph::Peek,
            '>' => Glyph::Greater,
            '<' => Glyph::Less,
            '=' => Glyph::Equal,
            '!' => Glyph::Bang,
            '*' => Glyph::Star,
            _ => return None,
        };
        Some(glyph)
    }

    pub fn as_char(self) -> char {
        match self {
            Glyph::Push => '▲',
            Glyph::Discard => '▼',
            Glyph::Duplicate => '⇅',
            Glyph::Swap => '↔',
            Glyph::Add => '+',
            Glyph::Subtract => '-',
            Glyph::Multiply => '×',
            Glyph::Divide => '÷',
            Glyph::Modulo => '%',
            Glyph::PrintNumber => '#',
            Glyph::PrintChar => '$',
            Glyph::Newline => '¦',
            Glyph::Input => '&',
            Glyph::Peek => '~',
            Glyph::Greater => '>',
            Glyph::Less => '<',
            Glyph::Equal => '=',
            Glyph::Bang => '!',
            Glyph::Star => '*',
            Glyph::Dot => '.',
        }
    }

    /// The comparison a glyph stands for inside a predicate
    pub fn as_compare(self) -> Option<CompareOp> {
        match self {
            Glyph::Less => Some(CompareOp::Lt),
            Glyph::Greater => Some(CompareOp::Gt),
            Glyph::Equal => Some(CompareOp::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// Two-character operators recognized by the lexer
    pub fn from_pair(first: char, second: char) -> Option<Self> {
        match (first, second) {
            ('>', '=') => Some(CompareOp::Ge),
            ('<', '=') => Some(CompareOp::Le),
            ('!', '=') => Some(CompareOp::Ne),
            _ => None,
        }
    }

    pub fn apply(self, left: i64, right: i64) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Gt => left > right,
            CompareOp::Le => left <= right,
            CompareOp::Ge => left >= right,
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
        }
    }
}

/// The `type` part of a conditional
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalKind {
    /// `!?`
    IfOnce,
    /// `!∞`
    While,
    /// `!∑`
    ForEach,
    /// Anything else; runs as a no-op
    Other(String),
}

impl ConditionalKind {
    pub fn parse(text: &str) -> Self {
        match text {
            "!?" => ConditionalKind::IfOnce,
            "!∞" => ConditionalKind::While,
            "!∑" => ConditionalKind::ForEach,
            other => ConditionalKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConditionalKind::IfOnce => "!?",
            ConditionalKind::While => "!∞",
            ConditionalKind::ForEach => "!∑",
            ConditionalKind::Other(text) => text,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Str(s) => write!(f, "string {:?}", s),
            TokenKind::VarRef(name) => write!(f, "var {}", name),
            TokenKind::VarExpr { name, expr } => write!(f, "var-expr {} {:?}", name, expr),
            TokenKind::VarBlock { name, body } => write!(f, "var-block {} {:?}", name, body.text),
            TokenKind::Conditional {
                kind,
                predicate,
                command,
            } => write!(
                f,
                "conditional {} {{{}}} ({})",
                kind.as_str(),
                predicate.text,
                command.text
            ),
            TokenKind::PopN(param) => write!(f, "popn [{}]", param),
            TokenKind::Debug(cmd) => write!(f, "debug {}", cmd),
            TokenKind::Glyph(glyph) => write!(f, "glyph {}", glyph.as_char()),
            TokenKind::Compare(op) => write!(f, "compare {}", op.symbol()),
            TokenKind::SilentRotate(name) => write!(f, "rotate {}", name),
            TokenKind::PushNumber(n) => write!(f, "push-number {}", n),
            TokenKind::PushVariable(name) => write!(f, "push-variable {}", name),
            TokenKind::PushInput => write!(f, "push-input"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}  {}", self.offset, self.kind)
    }
}
