//! Variable assignment
//!
//! Two forms write variables:
//!
//! - var-block `>X<body<`: what happens depends on the shape of the body
//!   (peek, input, literal, string, append, input-concatenation, or a
//!   sub-program whose result is popped into X).
//! - var-expr `>Xop N<`: in-place arithmetic on X, which starts at 0.

use crate::context::ExecutionContext;
use crate::engine::Interpreter;
use crate::error::FatalError;
use crate::host::Host;
use crate::lexer;
use crate::token::{Fragment, Glyph, TokenKind};
use bluenexus_core::{VarName, Value, VariableTable, floor_div};

impl<H: Host> Interpreter<H> {
    /// `>X<body<`
    pub(crate) fn assign_block(
        &mut self,
        ctx: &mut ExecutionContext,
        name: VarName,
        body: &Fragment,
    ) -> Result<(), FatalError> {
        let tokens = lexer::tokenize_fragment(body, self.max_depth())?;

        match tokens.as_slice() {
            [] => return Ok(()),
            [only] => match &only.kind {
                TokenKind::Glyph(Glyph::Peek) => {
                    if let Some(top) = ctx.stack.peek() {
                        ctx.variables.set(name, Value::Scalar(top));
                    }
                    return Ok(());
                }
                TokenKind::Glyph(Glyph::Input) => {
                    let input = self.request_input();
                    ctx.variables.set(name, Value::Scalar(input));
                    return Ok(());
                }
                TokenKind::Number(n) => {
                    ctx.variables.set(name, Value::Scalar(*n));
                    return Ok(());
                }
                TokenKind::Str(text) => {
                    ctx.variables.set(name, Value::from_text(text));
                    return Ok(());
                }
                _ => {}
            },
            [first, second, ..] if first.is_glyph(Glyph::Dot) => match &second.kind {
                TokenKind::Str(text) => {
                    append_text(&mut ctx.variables, name, text);
                    return Ok(());
                }
                TokenKind::Glyph(Glyph::Input) => {
                    let input = self.request_input();
                    concat_input(&mut ctx.variables, name, input);
                    return Ok(());
                }
                _ => {}
            },
            _ => {}
        }

        self.execute_nested(ctx, &tokens, body.offset)?;
        if !ctx.halted
            && let Some(top) = ctx.stack.pop()
        {
            ctx.variables.set(name, Value::Scalar(top));
        }
        Ok(())
    }
}

/// `.` + string: extend a sequence, replace a scalar, create when absent
fn append_text(vars: &mut VariableTable, name: VarName, text: &str) {
    let codes: Vec<i64> = text.chars().map(|c| c as i64).collect();
    match vars.entry_or_insert_with(name, Value::empty_sequence) {
        Value::Sequence(items) => items.extend(codes),
        other => *other = Value::Sequence(codes.into()),
    }
}

/// `.` + input: join decimal texts for a scalar, assign when absent
fn concat_input(vars: &mut VariableTable, name: VarName, input: i64) {
    match vars.get_mut(name) {
        None => vars.set(name, Value::Scalar(input)),
        Some(Value::Scalar(old)) => {
            if let Some(joined) = parse_int_prefix(&format!("{}{}", old, input)) {
                *old = joined;
            }
        }
        Some(Value::Sequence(_)) => {}
    }
}

/// `>Xop N<`
pub(crate) fn apply_expr(vars: &mut VariableTable, name: VarName, expr: &str) {
    let Value::Scalar(current) = vars.entry_or_insert_with(name, || Value::Scalar(0)) else {
        return;
    };
    let mut chars = expr.chars();
    let Some(op) = chars.next() else {
        return;
    };
    let Some(operand) = parse_int_prefix(chars.as_str()) else {
        return;
    };
    let updated = match op {
        '+' => Some(current.wrapping_add(operand)),
        '-' => Some(current.wrapping_sub(operand)),
        '×' => Some(current.wrapping_mul(operand)),
        '÷' => floor_div(*current, operand),
        _ => None,
    };
    if let Some(value) = updated {
        *current = value;
    }
}

/// Leading integer of `text`: optional sign then digits, rest ignored
///
/// `"12-3"` → 12, `"-4x"` → -4, `"x"` → None. Out-of-range → None.
pub(crate) fn parse_int_prefix(text: &str) -> Option<i64> {
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits = text[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - sign_len);
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}
