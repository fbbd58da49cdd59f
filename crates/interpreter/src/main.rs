//! BlueNexus CLI
//!
//! Command-line interface for running .bnx programs and inspecting how
//! they tokenize.

use bluenexus::{Host, InputReply, Interpreter, InterpreterConfig, VarName, tokenize_program};
use clap::{Args, CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit code for programs that halted on a fatal error
const EXIT_HALTED: i32 = 2;

#[derive(ClapParser)]
#[command(name = "bnx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "BlueNexus interpreter - run stack-based BlueNexus programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Program file to read
    #[arg(required_unless_present = "eval")]
    file: Option<PathBuf>,

    /// Program text given inline instead of a file
    #[arg(short = 'e', long, conflicts_with = "file")]
    eval: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Value to answer an input request with (repeatable, used in order
        /// before prompting on the terminal)
        #[arg(long = "input", value_name = "VALUE", allow_hyphen_values = true)]
        inputs: Vec<String>,

        /// Interpreter configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Do not print "Program completed." after a run with no output
        #[arg(long)]
        no_completion_notice: bool,
    },

    /// Print the top-level token list of a program
    Tokens {
        #[command(flatten)]
        source: SourceArgs,

        /// Interpreter configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Host that talks to the terminal
///
/// Output goes to stdout; prompts, debug snapshots and errors go to stderr
/// so program output stays clean when piped.
struct TerminalHost {
    queued_inputs: VecDeque<String>,
    /// Last output did not end with a newline
    line_open: bool,
}

impl Host for TerminalHost {
    fn append_output(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
        if !text.is_empty() {
            self.line_open = !text.ends_with('\n');
        }
    }

    fn request_scalar_input(&mut self) -> InputReply {
        if let Some(value) = self.queued_inputs.pop_front() {
            debug!(value = %value, "answering input request from --input");
            return InputReply::Provided(value);
        }
        eprint!("Enter input: ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => InputReply::Declined,
            Ok(_) => InputReply::Provided(line),
        }
    }

    fn show_stack_snapshot(&mut self, values: &[i64]) {
        eprintln!("--- stack ({} items, top first) ---", values.len());
        for value in values.iter().rev() {
            eprintln!("  {}", value);
        }
    }

    fn show_variable_snapshot(&mut self, name: VarName, rendered: &str) {
        eprintln!("--- variable {} ---", name);
        eprintln!("  {}", rendered);
    }

    fn report_error(&mut self, message: &str, offset: usize) {
        debug!(offset, "reporting fatal error");
        eprintln!("{}", message);
    }
}

fn main() {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            inputs,
            config,
            no_completion_notice,
        } => {
            let mut config = load_config(config.as_deref());
            if no_completion_notice {
                config = config.with_completion_notice(false);
            }
            run_program(&source, inputs, config);
        }
        Commands::Tokens { source, config } => {
            let config = load_config(config.as_deref());
            run_tokens(&source, &config);
        }
        Commands::Completions { shell } => {
            run_completions(shell);
        }
    }
}

/// `RUST_LOG` plus info-level logging for the CLI and the interpreter library
fn log_filter() -> EnvFilter {
    EnvFilter::from_default_env()
        .add_directive("bnx=info".parse().expect("static log directive"))
        .add_directive("bluenexus=info".parse().expect("static log directive"))
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "bnx", &mut io::stdout());
}

fn load_config(path: Option<&Path>) -> InterpreterConfig {
    let Some(path) = path else {
        return InterpreterConfig::default();
    };
    match InterpreterConfig::load(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn read_source(source: &SourceArgs) -> String {
    if let Some(code) = &source.eval {
        return code.clone();
    }
    let Some(path) = &source.file else {
        eprintln!("Error: no program given (pass a file or -e <CODE>)");
        process::exit(1);
    };
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn run_program(source: &SourceArgs, inputs: Vec<String>, config: InterpreterConfig) {
    let program = read_source(source);
    let host = TerminalHost {
        queued_inputs: inputs.into(),
        line_open: false,
    };
    let mut interp = Interpreter::with_config(host, config);
    let report = interp.run(&program);

    // Keep the shell prompt off the last line of output
    if interp.host().line_open {
        println!();
    }

    if report.is_halted() {
        process::exit(EXIT_HALTED);
    }
}

fn run_tokens(source: &SourceArgs, config: &InterpreterConfig) {
    let program = read_source(source);
    match tokenize_program(&program, config) {
        Ok(tokens) => {
            for token in &tokens {
                println!("{}", token);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_HALTED);
        }
    }
}
