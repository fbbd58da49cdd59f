//! Conditionals and loops
//!
//! `?[kind]{predicate}(command)` where kind is
//!
//! - `!?` if-once: run the command once when the predicate holds
//! - `!∞` while: re-check the predicate before every iteration
//! - `!∑` for-each: run the command once per element of the sequence named
//!   by the first `*x` in the predicate text, counted at loop entry
//!
//! The command is re-tokenized fresh for every iteration. A predicate is
//! exactly three tokens `left op right`; any other shape is false.

use crate::context::ExecutionContext;
use crate::engine::Interpreter;
use crate::error::FatalError;
use crate::host::Host;
use crate::lexer;
use crate::token::{CompareOp, ConditionalKind, Fragment, Glyph, Token, TokenKind};
use bluenexus_core::{VarName, Value};
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

/// Textual for-each target lookup, matched against the raw predicate
static FOR_EACH_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""?\*([A-Za-z])"#).expect("for-each pattern is valid"));

impl<H: Host> Interpreter<H> {
    pub(crate) fn conditional(
        &mut self,
        ctx: &mut ExecutionContext,
        kind: &ConditionalKind,
        predicate: &Fragment,
        command: &Fragment,
    ) -> Result<(), FatalError> {
        match kind {
            ConditionalKind::IfOnce => {
                if self.evaluate_predicate(ctx, predicate)? {
                    self.execute_fragment(ctx, command)?;
                }
            }
            ConditionalKind::While => {
                let mut iterations = 0u64;
                while !ctx.halted && self.evaluate_predicate(ctx, predicate)? {
                    self.execute_fragment(ctx, command)?;
                    iterations += 1;
                }
                trace!(iterations, "while loop finished");
            }
            ConditionalKind::ForEach => {
                let Some(name) = for_each_target(&predicate.text) else {
                    return Ok(());
                };
                let Some(Value::Sequence(items)) = ctx.variables.get(name) else {
                    return Ok(());
                };
                // Length is fixed at entry; the body may grow or shrink the sequence
                let count = items.len();
                for _ in 0..count {
                    if ctx.halted {
                        break;
                    }
                    self.execute_fragment(ctx, command)?;
                }
            }
            ConditionalKind::Other(kind) => {
                trace!(kind = kind.as_str(), "ignoring unknown conditional kind");
            }
        }
        Ok(())
    }

    /// Tokenize and evaluate `left op right`
    pub(crate) fn evaluate_predicate(
        &self,
        ctx: &ExecutionContext,
        predicate: &Fragment,
    ) -> Result<bool, FatalError> {
        let tokens = lexer::tokenize_fragment(predicate, self.max_depth())?;
        let [left, op, right] = tokens.as_slice() else {
            return Ok(false);
        };
        let (Some(left), Some(op), Some(right)) =
            (operand(ctx, left), comparison(op), operand(ctx, right))
        else {
            return Ok(false);
        };
        Ok(op.apply(left, right))
    }
}

/// Name captured by the first `*x` (optionally preceded by a quote)
pub(crate) fn for_each_target(predicate: &str) -> Option<VarName> {
    FOR_EACH_TARGET
        .captures(predicate)
        .and_then(|caps| caps.get(1))
        .and_then(|m| VarName::parse(m.as_str()))
}

/// Predicate operand: `~` peeks, variables read without rotating, numbers are literal
fn operand(ctx: &ExecutionContext, token: &Token) -> Option<i64> {
    match &token.kind {
        TokenKind::Glyph(Glyph::Peek) => Some(ctx.stack.peek().unwrap_or(0)),
        TokenKind::VarRef(name) => Some(ctx.variables.get(*name).map_or(0, Value::numeric)),
        TokenKind::Number(n) => Some(*n),
        _ => None,
    }
}

fn comparison(token: &Token) -> Option<CompareOp> {
    match &token.kind {
        TokenKind::Compare(op) => Some(*op),
        TokenKind::Glyph(glyph) => glyph.as_compare(),
        _ => None,
    }
}
