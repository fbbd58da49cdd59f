//! Host boundary
//!
//! The engine never renders anything or talks to a user directly. Output,
//! interactive input, debug panels and error reports all go through the
//! [`Host`] trait, which the embedding application implements.
//!
//! Input is the only point where a run suspends: the engine calls
//! [`Host::request_scalar_input`] and resumes with whatever the host hands
//! back. A declined request, or a reply that is not a number, resumes with 0.

use bluenexus_core::VarName;
use std::collections::VecDeque;

/// What the host answered to an input request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputReply {
    Provided(String),
    /// The operator cancelled (or no more input is available)
    Declined,
}

pub trait Host {
    /// Append text to the program's output; never read back
    fn append_output(&mut self, text: &str);

    /// Suspend for one scalar from the operator
    fn request_scalar_input(&mut self) -> InputReply;

    /// Triggered by `_stack`; values run bottom to top
    fn show_stack_snapshot(&mut self, values: &[i64]) {
        let _ = values;
    }

    /// Triggered by `_var=<name>` when the variable exists
    fn show_variable_snapshot(&mut self, name: VarName, rendered: &str) {
        let _ = (name, rendered);
    }

    /// Called exactly once per fatal error
    fn report_error(&mut self, message: &str, offset: usize);
}

/// Turn an input reply into the scalar the engine resumes with
///
/// Accepts integers, and finite decimals (floored). Anything else is 0.
pub fn parse_scalar_input(reply: &InputReply) -> i64 {
    let InputReply::Provided(text) = reply else {
        return 0;
    };
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return n;
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => f.floor() as i64,
        _ => 0,
    }
}

/// An in-memory host with a queue of canned input
///
/// Useful for embedding and for deterministic tests: output, errors and
/// snapshots are recorded, and input requests are served from the queue
/// (declined once it is empty).
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub inputs: VecDeque<String>,
    pub output: Vec<String>,
    pub errors: Vec<(String, usize)>,
    pub stack_snapshots: Vec<Vec<i64>>,
    pub variable_snapshots: Vec<(VarName, String)>,
    pub input_requests: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        RecordingHost::default()
    }

    /// Queue replies for upcoming input requests (builder pattern)
    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    /// All output joined together
    pub fn output_text(&self) -> String {
        self.output.concat()
    }
}

impl Host for RecordingHost {
    fn append_output(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn request_scalar_input(&mut self) -> InputReply {
        self.input_requests += 1;
        match self.inputs.pop_front() {
            Some(text) => InputReply::Provided(text),
            None => InputReply::Declined,
        }
    }

    fn show_stack_snapshot(&mut self, values: &[i64]) {
        self.stack_snapshots.push(values.to_vec());
    }

    fn show_variable_snapshot(&mut self, name: VarName, rendered: &str) {
        self.variable_snapshots.push((name, rendered.to_string()));
    }

    fn report_error(&mut self, message: &str, offset: usize) {
        self.errors.push((message.to_string(), offset));
    }
}
