//! Execution engine
//!
//! Walks a token list once, left to right, against an explicit
//! [`ExecutionContext`]. Var-block bodies and conditional commands are
//! re-tokenized and executed recursively on the same context.
//!
//! ## Error model
//!
//! Fatal errors (syntax, undefined variable) are returned as `Err` and
//! propagate with `?` out of every sub-program and loop. [`Interpreter::run`]
//! records the error exactly once and marks the context halted. Every other
//! anomaly (short stack, missing popn/rotate target, division by zero) is a
//! silent no-op.
//!
//! ## Push pre-pass
//!
//! Only the top-level token list gets the push pre-pass, which fuses `▲`
//! with a following `&`, number or variable reference. Bodies executed
//! recursively never do; inside them `▲` is an inert marker.

use crate::config::InterpreterConfig;
use crate::context::ExecutionContext;
use crate::error::FatalError;
use crate::host::{Host, parse_scalar_input};
use crate::lexer;
use crate::token::{Fragment, Glyph, Token, TokenKind};
use bluenexus_core::{VarName, Value, char_from_code, floor_div, remainder};
use tracing::{debug, trace, warn};

/// Printed when a clean run produced no output at all
pub const COMPLETION_NOTICE: &str = "Program completed.\n";

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Halted(FatalError),
}

/// Result of a run: the outcome plus the final context
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub context: ExecutionContext,
}

impl RunReport {
    pub fn is_halted(&self) -> bool {
        matches!(self.outcome, RunOutcome::Halted(_))
    }

    pub fn error(&self) -> Option<&FatalError> {
        match &self.outcome {
            RunOutcome::Halted(err) => Some(err),
            RunOutcome::Completed => None,
        }
    }

    /// Final stack, bottom to top
    pub fn stack(&self) -> &[i64] {
        self.context.stack.as_slice()
    }

    pub fn variable(&self, name: char) -> Option<&Value> {
        VarName::new(name).and_then(|n| self.context.variables.get(n))
    }
}

/// A BlueNexus interpreter bound to a host
pub struct Interpreter<H: Host> {
    pub(crate) host: H,
    pub(crate) config: InterpreterConfig,
}

impl<H: Host> Interpreter<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, InterpreterConfig::default())
    }

    pub fn with_config(host: H, config: InterpreterConfig) -> Self {
        Interpreter { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.config.max_nesting_depth.max(1)
    }

    /// Run a program to completion or until it halts
    ///
    /// Every run starts from an empty stack, no variables and no output.
    pub fn run(&mut self, source: &str) -> RunReport {
        let mut ctx = ExecutionContext::new();
        debug!(chars = source.chars().count(), "starting run");

        let result = tokenize_program(source, &self.config)
            .and_then(|tokens| self.execute(&mut ctx, &tokens));

        let outcome = match result {
            Ok(()) => {
                if self.config.completion_notice && ctx.output.is_empty() {
                    self.emit(&mut ctx, COMPLETION_NOTICE);
                }
                debug!(
                    stack_depth = ctx.stack.len(),
                    variables = ctx.variables.len(),
                    "run completed"
                );
                RunOutcome::Completed
            }
            Err(err) => {
                self.halt(&mut ctx, &err);
                RunOutcome::Halted(err)
            }
        };

        RunReport {
            outcome,
            context: ctx,
        }
    }

    fn halt(&mut self, ctx: &mut ExecutionContext, err: &FatalError) {
        let message = err.to_string();
        warn!(offset = err.offset(), "run halted: {}", message);
        ctx.halted = true;
        ctx.output.push(message.clone());
        self.host.report_error(&message, err.offset());
    }

    /// Execute a token list on `ctx`
    pub(crate) fn execute(
        &mut self,
        ctx: &mut ExecutionContext,
        tokens: &[Token],
    ) -> Result<(), FatalError> {
        let mut i = 0;
        while i < tokens.len() && !ctx.halted {
            let token = &tokens[i];
            match &token.kind {
                TokenKind::Number(n) | TokenKind::PushNumber(n) => ctx.stack.push(*n),
                TokenKind::PushVariable(name) => {
                    let value = ctx.variables.get_mut(*name).ok_or(
                        FatalError::UndefinedVariable {
                            offset: token.offset,
                            name: *name,
                        },
                    )?;
                    if let Some(n) = value.read_rotating() {
                        ctx.stack.push(n);
                    }
                }
                TokenKind::PushInput => {
                    let n = self.request_input();
                    ctx.stack.push(n);
                }
                TokenKind::Glyph(glyph) => {
                    i += self.glyph(ctx, *glyph, tokens.get(i + 1))?;
                }
                TokenKind::VarBlock { name, body } => self.assign_block(ctx, *name, body)?,
                TokenKind::VarExpr { name, expr } => {
                    crate::assign::apply_expr(&mut ctx.variables, *name, expr)
                }
                TokenKind::Conditional {
                    kind,
                    predicate,
                    command,
                } => self.conditional(ctx, kind, predicate, command)?,
                TokenKind::PopN(param) => pop_n(ctx, param),
                TokenKind::Debug(cmd) => self.debug_command(ctx, cmd),
                TokenKind::SilentRotate(name) => {
                    if let Some(value) = ctx.variables.get_mut(*name) {
                        value.rotate();
                    }
                }
                TokenKind::Str(_) | TokenKind::VarRef(_) | TokenKind::Compare(_) => {}
            }
            i += 1;
        }
        Ok(())
    }

    /// Tokenize an embedded fragment and run it as a sub-program
    pub(crate) fn execute_fragment(
        &mut self,
        ctx: &mut ExecutionContext,
        fragment: &Fragment,
    ) -> Result<(), FatalError> {
        let tokens = lexer::tokenize_fragment(fragment, self.max_depth())?;
        self.execute_nested(ctx, &tokens, fragment.offset)
    }

    /// Run already-tokenized sub-program tokens one level deeper
    pub(crate) fn execute_nested(
        &mut self,
        ctx: &mut ExecutionContext,
        tokens: &[Token],
        offset: usize,
    ) -> Result<(), FatalError> {
        let limit = self.max_depth();
        if ctx.depth >= limit {
            return Err(FatalError::NestingTooDeep { offset, limit });
        }
        trace!(depth = ctx.depth + 1, offset, "entering sub-program");
        ctx.depth += 1;
        let result = self.execute(ctx, tokens);
        ctx.depth -= 1;
        result
    }

    /// Suspend for host input and resume with the parsed scalar
    pub(crate) fn request_input(&mut self) -> i64 {
        trace!("awaiting scalar input");
        let reply = self.host.request_scalar_input();
        parse_scalar_input(&reply)
    }

    fn emit(&mut self, ctx: &mut ExecutionContext, text: &str) {
        ctx.output.push(text.to_string());
        self.host.append_output(text);
    }

    /// Returns how many following tokens the glyph consumed
    fn glyph(
        &mut self,
        ctx: &mut ExecutionContext,
        glyph: Glyph,
        next: Option<&Token>,
    ) -> Result<usize, FatalError> {
        match glyph {
            Glyph::Discard => {
                ctx.stack.drop_top();
            }
            Glyph::Duplicate => {
                ctx.stack.dup();
            }
            Glyph::Swap => {
                ctx.stack.swap();
            }
            Glyph::Add => {
                ctx.stack.binary_op(|a, b| Some(a.wrapping_add(b)));
            }
            Glyph::Subtract => {
                ctx.stack.binary_op(|a, b| Some(a.wrapping_sub(b)));
            }
            Glyph::Multiply => {
                ctx.stack.binary_op(|a, b| Some(a.wrapping_mul(b)));
            }
            Glyph::Divide => {
                ctx.stack.binary_op(floor_div);
            }
            Glyph::Modulo => {
                ctx.stack.binary_op(remainder);
            }
            Glyph::PrintNumber => return self.print(ctx, false, next),
            Glyph::PrintChar => return self.print(ctx, true, next),
            Glyph::Newline => self.emit(ctx, "\n"),
            // Markers that only mean something inside other constructs
            Glyph::Push
            | Glyph::Input
            | Glyph::Peek
            | Glyph::Greater
            | Glyph::Less
            | Glyph::Equal
            | Glyph::Bang
            | Glyph::Star
            | Glyph::Dot => {}
        }
        Ok(0)
    }

    /// `#` / `$`, optionally applied to the variable that follows
    fn print(
        &mut self,
        ctx: &mut ExecutionContext,
        as_char: bool,
        next: Option<&Token>,
    ) -> Result<usize, FatalError> {
        if let Some(Token {
            kind: TokenKind::VarRef(name),
            offset,
        }) = next
        {
            let value = ctx
                .variables
                .get_mut(*name)
                .ok_or(FatalError::UndefinedVariable {
                    offset: *offset,
                    name: *name,
                })?;
            let text = if as_char {
                value
                    .read_rotating()
                    .map(|code| char_from_code(code).to_string())
            } else {
                Some(value.as_text())
            };
            if let Some(text) = text {
                self.emit(ctx, &text);
            }
            return Ok(1);
        }

        if let Some(top) = ctx.stack.peek() {
            let text = if as_char {
                char_from_code(top).to_string()
            } else {
                top.to_string()
            };
            self.emit(ctx, &text);
        }
        Ok(0)
    }

    fn debug_command(&mut self, ctx: &ExecutionContext, cmd: &str) {
        if cmd == "_stack" {
            self.host.show_stack_snapshot(ctx.stack.as_slice());
        } else if let Some(rest) = cmd.strip_prefix("_var=") {
            if let Some(name) = VarName::parse(rest)
                && let Some(value) = ctx.variables.get(name)
            {
                self.host.show_variable_snapshot(name, &value.render());
            }
        } else {
            trace!(cmd, "ignoring unknown debug command");
        }
    }
}

/// Tokenize a whole program and apply the top-level push pre-pass
pub fn tokenize_program(
    source: &str,
    config: &InterpreterConfig,
) -> Result<Vec<Token>, FatalError> {
    let tokens = lexer::tokenize(source, config.max_nesting_depth.max(1))?;
    debug!(count = tokens.len(), "program tokenized");
    Ok(merge_push_markers(tokens))
}

/// Fuse `▲&`, `▲N` and `▲x` into single push tokens
pub fn merge_push_markers(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        if token.is_glyph(Glyph::Push) {
            let fused = match iter.peek().map(|next| &next.kind) {
                Some(TokenKind::Glyph(Glyph::Input)) => Some(TokenKind::PushInput),
                Some(TokenKind::Number(n)) => Some(TokenKind::PushNumber(*n)),
                Some(TokenKind::VarRef(name)) => Some(TokenKind::PushVariable(*name)),
                _ => None,
            };
            if let Some(kind) = fused {
                iter.next();
                merged.push(Token::new(kind, token.offset));
                continue;
            }
        }
        merged.push(token);
    }
    merged
}

/// `↡[param]`
fn pop_n(ctx: &mut ExecutionContext, param: &str) {
    if param == "." {
        ctx.stack.clear();
        return;
    }
    if param.chars().any(|c| c.is_ascii_alphabetic()) {
        if let Some(name) = VarName::parse(param)
            && let Some(Value::Sequence(items)) = ctx.variables.get_mut(name)
        {
            items.pop_front();
        }
        return;
    }
    if let Some(n) = crate::assign::parse_int_prefix(param)
        && n > 0
    {
        ctx.stack.pop_n(usize::try_from(n).unwrap_or(usize::MAX));
    }
}
