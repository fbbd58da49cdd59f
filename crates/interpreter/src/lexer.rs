//! Lexer for BlueNexus source
//!
//! Source is first cleaned (all whitespace and commas removed, including
//! inside string literals), then scanned strictly left to right without
//! backtracking. Forms are tried in this order against the next character:
//!
//! ```text
//! >X ... <          var-expr        (X not followed by '<')
//! >X< ... <         var-block       (depth counted on '>letter' / '<')
//! ?[kind]{pred}(cmd) conditional    (paren depth counted in cmd)
//! ↡[p]  ▼[p]        pop-n
//! "text"            string          ("" is a literal quote)
//! 123               number
//! _name             debug command
//! >= <= !=          comparison
//! ▲▼⇅↔+-×÷%#$¦&~><=!*    glyph
//! x                 variable reference
//! .$x  .            silent rotate / dot
//! ```
//!
//! Cleaning also records a literal break wherever the raw source separated
//! two digits, so `5,3` stays two number literals. Breaks only apply where
//! code executes (top level, var-block bodies, conditional commands); string
//! text, var-expr text, bracket parameters and predicates read straight
//! through them, so `"1 2"` is `12` and `{x = 1 0}` compares against 10.
//!
//! Nesting is tracked with explicit depth counters rather than recursion,
//! and bounded by a configurable maximum.

use crate::error::FatalError;
use crate::token::{CompareOp, ConditionalKind, Fragment, Glyph, Token, TokenKind};
use bluenexus_core::VarName;
use tracing::trace;

/// Strip whitespace and commas into the top-level fragment
///
/// A digit that followed another digit across removed characters is
/// recorded as a literal break at its cleaned offset.
pub fn clean(source: &str) -> Fragment {
    let mut text = String::with_capacity(source.len());
    let mut breaks = Vec::new();
    let mut len = 0usize;
    let mut gap = false;
    let mut after_digit = false;
    for c in source.chars() {
        if c.is_whitespace() || c == ',' {
            gap = true;
            continue;
        }
        if gap && after_digit && c.is_ascii_digit() {
            breaks.push(len);
        }
        gap = false;
        after_digit = c.is_ascii_digit();
        text.push(c);
        len += 1;
    }
    Fragment {
        text,
        offset: 0,
        breaks,
    }
}

/// Clean and tokenize a whole program
pub fn tokenize(source: &str, max_depth: usize) -> Result<Vec<Token>, FatalError> {
    tokenize_fragment(&clean(source), max_depth)
}

/// Tokenize an already-cleaned fragment, offsetting every token by where
/// the fragment sits in the top-level source
pub fn tokenize_fragment(fragment: &Fragment, max_depth: usize) -> Result<Vec<Token>, FatalError> {
    let mut lexer = Lexer {
        chars: fragment.text.chars().collect(),
        pos: 0,
        base: fragment.offset,
        breaks: &fragment.breaks,
        max_depth,
    };
    let mut tokens = Vec::new();
    while lexer.pos < lexer.chars.len() {
        if let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
    }
    trace!(
        offset = fragment.offset,
        count = tokens.len(),
        "tokenized fragment"
    );
    Ok(tokens)
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    base: usize,
    breaks: &'a [usize],
    max_depth: usize,
}

impl Lexer<'_> {
    fn peek_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn current(&self) -> Option<char> {
        self.peek_at(self.pos)
    }

    fn var_name_at(&self, index: usize) -> Option<VarName> {
        self.peek_at(index).and_then(VarName::new)
    }

    fn absolute(&self, index: usize) -> usize {
        self.base + index
    }

    fn text(&self, from: usize, to: usize) -> String {
        self.chars[from..to].iter().collect()
    }

    /// Executable sub-fragment: keeps the literal breaks that fall inside it
    fn body(&self, from: usize, to: usize) -> Fragment {
        let (start, end) = (self.absolute(from), self.absolute(to));
        Fragment {
            text: self.text(from, to),
            offset: start,
            breaks: self
                .breaks
                .iter()
                .copied()
                .filter(|b| (start..end).contains(b))
                .collect(),
        }
    }

    fn breaks_at(&self, index: usize) -> bool {
        self.breaks.binary_search(&self.absolute(index)).is_ok()
    }

    /// Scan one form; `None` when the form produces no token (`.$` without a name)
    fn next_token(&mut self) -> Result<Option<Token>, FatalError> {
        let start = self.pos;
        let offset = self.absolute(start);
        let Some(c) = self.current() else {
            return Ok(None);
        };

        if c == '>'
            && let Some(name) = self.var_name_at(start + 1)
        {
            return self.var_assignment(name, offset).map(Some);
        }

        if c == '?' {
            return self.conditional(offset).map(Some);
        }

        if (c == '↡' || c == '▼') && self.peek_at(start + 1) == Some('[') {
            self.pos += 2;
            let param = self.read_until(']', offset)?;
            return Ok(Some(Token::new(TokenKind::PopN(param), offset)));
        }

        if c == '"' {
            return self.string(offset).map(Some);
        }

        if c.is_ascii_digit() {
            self.pos += 1;
            while self.current().is_some_and(|d| d.is_ascii_digit())
                && !self.breaks_at(self.pos)
            {
                self.pos += 1;
            }
            let digits = self.text(start, self.pos);
            let value = digits
                .parse::<i64>()
                .map_err(|_| FatalError::BadLiteral { offset })?;
            return Ok(Some(Token::new(TokenKind::Number(value), offset)));
        }

        if c == '_' {
            self.pos += 1;
            while self
                .current()
                .is_some_and(|d| d.is_ascii_alphabetic() || d == '=')
            {
                self.pos += 1;
            }
            let cmd = self.text(start, self.pos);
            return Ok(Some(Token::new(TokenKind::Debug(cmd), offset)));
        }

        if let Some(op) = self
            .peek_at(start + 1)
            .and_then(|next| CompareOp::from_pair(c, next))
        {
            self.pos += 2;
            return Ok(Some(Token::new(TokenKind::Compare(op), offset)));
        }

        if let Some(glyph) = Glyph::from_char(c) {
            self.pos += 1;
            return Ok(Some(Token::new(TokenKind::Glyph(glyph), offset)));
        }

        if let Some(name) = VarName::new(c) {
            self.pos += 1;
            return Ok(Some(Token::new(TokenKind::VarRef(name), offset)));
        }

        if c == '.' {
            if self.peek_at(start + 1) == Some('$') {
                self.pos += 2;
                return Ok(self.var_name_at(self.pos).map(|name| {
                    self.pos += 1;
                    Token::new(TokenKind::SilentRotate(name), offset)
                }));
            }
            self.pos += 1;
            return Ok(Some(Token::new(TokenKind::Glyph(Glyph::Dot), offset)));
        }

        Err(FatalError::UnknownCommand { offset, found: c })
    }

    /// `>X` has been seen at `self.pos`
    fn var_assignment(&mut self, name: VarName, offset: usize) -> Result<Token, FatalError> {
        self.pos += 2;

        if self.current() != Some('<') {
            let from = self.pos;
            while self.current().is_some_and(|c| c != '<') {
                self.pos += 1;
            }
            let expr = self.text(from, self.pos);
            if self.current() == Some('<') {
                self.pos += 1;
            }
            return Ok(Token::new(TokenKind::VarExpr { name, expr }, offset));
        }

        self.pos += 1;
        let body_start = self.pos;
        let mut body_end = self.chars.len();
        let mut depth = 1usize;
        while let Some(c) = self.current() {
            if c == '>' && self.var_name_at(self.pos + 1).is_some() {
                depth += 1;
                if depth > self.max_depth {
                    return Err(FatalError::NestingTooDeep {
                        offset: self.absolute(self.pos),
                        limit: self.max_depth,
                    });
                }
            } else if c == '<' {
                depth -= 1;
                if depth == 0 {
                    body_end = self.pos;
                    self.pos += 1;
                    break;
                }
            }
            self.pos += 1;
        }

        let body = self.body(body_start, body_end);
        Ok(Token::new(TokenKind::VarBlock { name, body }, offset))
    }

    /// `?[kind]{predicate}(command)`
    fn conditional(&mut self, offset: usize) -> Result<Token, FatalError> {
        self.pos += 1;
        self.expect('[', offset)?;
        let kind = ConditionalKind::parse(&self.read_until(']', offset)?);

        self.expect('{', offset)?;
        let predicate_start = self.pos;
        // Predicates compare whole numbers; literal breaks do not apply
        let predicate = Fragment::new(
            self.read_until('}', offset)?,
            self.absolute(predicate_start),
        );

        self.expect('(', offset)?;
        let command_start = self.pos;
        let mut depth = 1usize;
        loop {
            match self.current() {
                None => return Err(FatalError::Malformed { offset }),
                Some('(') => {
                    depth += 1;
                    if depth > self.max_depth {
                        return Err(FatalError::NestingTooDeep {
                            offset: self.absolute(self.pos),
                            limit: self.max_depth,
                        });
                    }
                }
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(_) => {}
            }
            self.pos += 1;
        }
        let command = self.body(command_start, self.pos);
        self.pos += 1;

        Ok(Token::new(
            TokenKind::Conditional {
                kind,
                predicate,
                command,
            },
            offset,
        ))
    }

    fn string(&mut self, offset: usize) -> Result<Token, FatalError> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.current() {
                None => return Err(FatalError::Malformed { offset }),
                Some('"') if self.peek_at(self.pos + 1) == Some('"') => {
                    text.push('"');
                    self.pos += 2;
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
        Ok(Token::new(TokenKind::Str(text), offset))
    }

    fn expect(&mut self, c: char, offset: usize) -> Result<(), FatalError> {
        if self.current() != Some(c) {
            return Err(FatalError::Malformed { offset });
        }
        self.pos += 1;
        Ok(())
    }

    /// Read up to (and consume) `close`; running out of input is malformed
    fn read_until(&mut self, close: char, offset: usize) -> Result<String, FatalError> {
        let from = self.pos;
        while let Some(c) = self.current() {
            if c == close {
                let text = self.text(from, self.pos);
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(FatalError::Malformed { offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, 64)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn name(c: char) -> VarName {
        VarName::new(c).unwrap()
    }

    #[test]
    fn test_clean_strips_whitespace_and_commas() {
        let cleaned = clean("5, 3,\n +");
        assert_eq!(cleaned.text, "53+");
        assert_eq!(cleaned.breaks, vec![1]);

        let cleaned = clean("12 ,  x");
        assert_eq!(cleaned.text, "12x");
        assert!(cleaned.breaks.is_empty());

        let cleaned = clean("1 2 ▲ 3");
        assert_eq!(cleaned.text, "12▲3");
        assert_eq!(cleaned.breaks, vec![1]);

        assert_eq!(clean("\"a b\"").text, "\"ab\"");
    }

    #[test]
    fn test_breaks_do_not_split_strings() {
        assert_eq!(kinds("\"1 2\""), vec![TokenKind::Str("12".to_string())]);
    }

    #[test]
    fn test_breaks_do_not_split_var_expr() {
        assert_eq!(
            kinds(">x+1 0<"),
            vec![TokenKind::VarExpr {
                name: name('x'),
                expr: "+10".to_string()
            }]
        );
    }

    #[test]
    fn test_breaks_do_not_split_bracket_params() {
        assert_eq!(kinds("↡[1 2]"), vec![TokenKind::PopN("12".to_string())]);
    }

    #[test]
    fn test_predicate_reads_through_breaks() {
        let tokens = tokenize("?[!?]{x = 1 0}(7)", 64).unwrap();
        let TokenKind::Conditional { predicate, .. } = &tokens[0].kind else {
            panic!("expected conditional, got {:?}", tokens[0].kind);
        };
        assert_eq!(predicate.text, "x=10");
        assert!(predicate.breaks.is_empty());
        let inner: Vec<TokenKind> = tokenize_fragment(predicate, 64)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            inner,
            vec![
                TokenKind::VarRef(name('x')),
                TokenKind::Glyph(Glyph::Equal),
                TokenKind::Number(10)
            ]
        );
    }

    #[test]
    fn test_executable_bodies_keep_breaks() {
        let body_kinds = |fragment: &Fragment| -> Vec<TokenKind> {
            tokenize_fragment(fragment, 64)
                .unwrap()
                .into_iter()
                .map(|t| t.kind)
                .collect()
        };

        let tokens = tokenize(">a<2 3 ×<", 64).unwrap();
        let TokenKind::VarBlock { body, .. } = &tokens[0].kind else {
            panic!("expected var-block, got {:?}", tokens[0].kind);
        };
        assert_eq!(body.text, "23×");
        assert_eq!(body.breaks, vec![4]);
        assert_eq!(
            body_kinds(body),
            vec![
                TokenKind::Number(2),
                TokenKind::Number(3),
                TokenKind::Glyph(Glyph::Multiply)
            ]
        );

        let tokens = tokenize("?[!?]{1=1}(4 5)", 64).unwrap();
        let TokenKind::Conditional { command, .. } = &tokens[0].kind else {
            panic!("expected conditional, got {:?}", tokens[0].kind);
        };
        assert_eq!(
            body_kinds(command),
            vec![TokenKind::Number(4), TokenKind::Number(5)]
        );
    }

    #[test]
    fn test_offsets_ignore_removed_separators() {
        assert_eq!(
            tokenize("5 3 @", 64).unwrap_err(),
            FatalError::UnknownCommand {
                offset: 2,
                found: '@'
            }
        );
    }

    #[test]
    fn test_numbers_separated_by_commas() {
        assert_eq!(
            kinds("5,3,+"),
            vec![
                TokenKind::Number(5),
                TokenKind::Number(3),
                TokenKind::Glyph(Glyph::Add)
            ]
        );
    }

    #[test]
    fn test_offsets_are_in_cleaned_source() {
        let tokens = tokenize("12 ,  x", 64).unwrap();
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 2);
    }

    #[test]
    fn test_var_expr() {
        assert_eq!(
            kinds(">x+5<#x"),
            vec![
                TokenKind::VarExpr {
                    name: name('x'),
                    expr: "+5".to_string()
                },
                TokenKind::Glyph(Glyph::PrintNumber),
                TokenKind::VarRef(name('x')),
            ]
        );
    }

    #[test]
    fn test_var_expr_without_terminator_runs_to_end() {
        assert_eq!(
            kinds(">x×3"),
            vec![TokenKind::VarExpr {
                name: name('x'),
                expr: "×3".to_string()
            }]
        );
    }

    #[test]
    fn test_var_block_body_and_offset() {
        let tokens = tokenize(">s<\"hi\"<", 64).unwrap();
        assert_eq!(tokens.len(), 1);
        match &tokens[0].kind {
            TokenKind::VarBlock { name: n, body } => {
                assert_eq!(*n, name('s'));
                assert_eq!(body.text, "\"hi\"");
                assert_eq!(body.offset, 3);
            }
            other => panic!("expected var-block, got {:?}", other),
        }
    }

    #[test]
    fn test_var_block_depth_counting() {
        // The inner '>y' raises the depth, so the first '<' after it does not close
        let tokens = tokenize(">x<>y<3<<9", 64).unwrap();
        match &tokens[0].kind {
            TokenKind::VarBlock { body, .. } => assert_eq!(body.text, ">y<3"),
            other => panic!("expected var-block, got {:?}", other),
        }
        assert_eq!(tokens[1].kind, TokenKind::Glyph(Glyph::Less));
        assert_eq!(tokens[2].kind, TokenKind::Number(9));
    }

    #[test]
    fn test_var_block_nesting_limit() {
        let err = tokenize(">a<>b>c<", 2).unwrap_err();
        assert!(matches!(err, FatalError::NestingTooDeep { limit: 2, .. }));
    }

    #[test]
    fn test_conditional() {
        let tokens = tokenize("?[!∞]{x<10}(>x+1<(#x))", 64).unwrap();
        assert_eq!(tokens.len(), 1);
        match &tokens[0].kind {
            TokenKind::Conditional {
                kind,
                predicate,
                command,
            } => {
                assert_eq!(*kind, ConditionalKind::While);
                assert_eq!(predicate.text, "x<10");
                assert_eq!(predicate.offset, 6);
                assert_eq!(command.text, ">x+1<(#x)");
                assert_eq!(command.offset, 12);
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_missing_parts_are_malformed() {
        assert_eq!(
            tokenize("1?{x}(#)", 64).unwrap_err(),
            FatalError::Malformed { offset: 1 }
        );
        assert_eq!(
            tokenize("?[!?](#)", 64).unwrap_err(),
            FatalError::Malformed { offset: 0 }
        );
        assert_eq!(
            tokenize("?[!?]{~>1}#", 64).unwrap_err(),
            FatalError::Malformed { offset: 0 }
        );
        assert_eq!(
            tokenize("?[!?]{~>1}(#", 64).unwrap_err(),
            FatalError::Malformed { offset: 0 }
        );
    }

    #[test]
    fn test_popn_forms() {
        assert_eq!(
            kinds("↡[.]▼[2]▼"),
            vec![
                TokenKind::PopN(".".to_string()),
                TokenKind::PopN("2".to_string()),
                TokenKind::Glyph(Glyph::Discard),
            ]
        );
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(
            kinds("\"say\"\"hi\"\"\""),
            vec![TokenKind::Str("say\"hi\"".to_string())]
        );
    }

    #[test]
    fn test_quote_always_starts_a_string() {
        assert_eq!(Glyph::from_char('"'), None);
        assert_eq!(
            tokenize("~\"", 64).unwrap_err(),
            FatalError::Malformed { offset: 1 }
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            tokenize("1\"abc", 64).unwrap_err(),
            FatalError::Malformed { offset: 1 }
        );
    }

    #[test]
    fn test_number_out_of_range() {
        assert_eq!(
            tokenize("99999999999999999999", 64).unwrap_err(),
            FatalError::BadLiteral { offset: 0 }
        );
    }

    #[test]
    fn test_debug_commands() {
        assert_eq!(
            kinds("_stack_var=x"),
            vec![
                TokenKind::Debug("_stack".to_string()),
                TokenKind::Debug("_var=x".to_string()),
            ]
        );
    }

    #[test]
    fn test_two_char_comparisons_win_over_glyphs() {
        assert_eq!(
            kinds("~>=1!=<="),
            vec![
                TokenKind::Glyph(Glyph::Peek),
                TokenKind::Compare(CompareOp::Ge),
                TokenKind::Number(1),
                TokenKind::Compare(CompareOp::Ne),
                TokenKind::Compare(CompareOp::Le),
            ]
        );
    }

    #[test]
    fn test_greater_before_letter_is_assignment() {
        // Inside a predicate `x>y` reads as a var-expr on y
        assert_eq!(
            kinds("x>y"),
            vec![
                TokenKind::VarRef(name('x')),
                TokenKind::VarExpr {
                    name: name('y'),
                    expr: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_silent_rotate_and_dot() {
        assert_eq!(
            kinds(".$s.\"a\""),
            vec![
                TokenKind::SilentRotate(name('s')),
                TokenKind::Glyph(Glyph::Dot),
                TokenKind::Str("a".to_string()),
            ]
        );
        // `.$` without a name is swallowed
        assert_eq!(kinds(".$1"), vec![TokenKind::Number(1)]);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            tokenize("12 @ 3", 64).unwrap_err(),
            FatalError::UnknownCommand {
                offset: 2,
                found: '@'
            }
        );
        // A lone down-arrow without '[' is not a command
        assert!(matches!(
            tokenize("↡", 64).unwrap_err(),
            FatalError::UnknownCommand { found: '↡', .. }
        ));
    }

    #[test]
    fn test_fragment_offsets_are_absolute() {
        let fragment = Fragment::new("#x", 10);
        let tokens = tokenize_fragment(&fragment, 64).unwrap();
        assert_eq!(tokens[0].offset, 10);
        assert_eq!(tokens[1].offset, 11);
    }
}
