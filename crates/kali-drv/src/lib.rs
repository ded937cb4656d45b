//! kali-drv - Compiler driver.
//!
//! The driver reads one source (a file given on the command line, or
//! standard input), then runs the dispatch loop over the atom stream:
//!
//! - eof: stop.
//! - `def`: parse a definition and lower it.
//! - `extern`: parse a prototype and lower it.
//! - comment, unknown atom: skip.
//! - `;`: skip.
//! - anything else: parse a top-level expression, lower it as an
//!   anonymous function, and erase the wrapper after printing it.
//!
//! A failed parse consumes a single atom and the loop continues, so
//! one bad item does not take the rest of the input with it. Each
//! successfully lowered item is echoed to standard error as IR, and
//! the whole module is dumped at the end regardless of earlier
//! failures.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use inkwell::context::Context;
use inkwell::targets::TargetMachine;

use kali_gen::CodegenContext;
use kali_lex::TokenKind;
use kali_par::Parser;
use kali_util::Handler;

/// Name of the module the session builds.
const MODULE_NAME: &str = "kaleidoscope";

/// Driver configuration.
#[derive(Debug)]
pub struct Config {
    /// Source path; standard input when absent.
    pub input: Option<PathBuf>,

    /// Dump the final module to stderr when done.
    pub dump_module: bool,
}

impl Config {
    /// Build a configuration from command-line arguments (without the
    /// program name).
    pub fn from_args(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut input = None;
        let mut dump_module = true;

        for arg in args {
            match arg.as_str() {
                "--no-dump" => dump_module = false,
                flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
                path => {
                    if input.replace(PathBuf::from(path)).is_some() {
                        bail!("expected a single input file");
                    }
                }
            }
        }

        Ok(Self { input, dump_module })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            dump_module: true,
        }
    }
}

/// One compilation session: configuration plus the diagnostic sink
/// every phase reports into.
pub struct Session {
    pub config: Config,
    pub handler: Handler,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handler: Handler::new(),
        }
    }

    /// Read the source, run the dispatch loop, print the module.
    /// Returns the number of error diagnostics emitted; the process
    /// keeps going past individual failures.
    pub fn run(&self) -> anyhow::Result<usize> {
        let source = self.read_source()?;

        let context = Context::create();
        let mut gen = CodegenContext::new(&context, MODULE_NAME)?;
        gen.module().set_triple(&TargetMachine::get_default_triple());

        let mut parser = Parser::new(&source, &self.handler);
        dispatch(&mut parser, &mut gen, &self.handler);

        gen.finalize();
        if self.config.dump_module {
            gen.module().print_to_stderr();
        }

        Ok(self.handler.error_count())
    }

    fn read_source(&self) -> anyhow::Result<String> {
        match &self.config.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display())),
            None => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("could not read stdin")?;
                Ok(source)
            }
        }
    }
}

/// The top-level dispatch loop.
///
/// Lowering failures become diagnostics at the item's first atom;
/// parse failures have already been reported by the parser, so the
/// loop just resynchronises by consuming one atom.
pub fn dispatch(parser: &mut Parser<'_>, gen: &mut CodegenContext<'_>, handler: &Handler) {
    loop {
        let kind = parser.current().kind.clone();
        let span = parser.current().span;

        match kind {
            TokenKind::Eof => break,

            TokenKind::Def => match parser.parse_definition() {
                Some(def) => match gen.lower_function(&def) {
                    Ok(function) => {
                        eprintln!("{}", function.print_to_string().to_string_lossy());
                    }
                    Err(err) => handler.error(err.to_string(), span),
                },
                None => parser.bump(),
            },

            TokenKind::Extern => match parser.parse_extern() {
                Some(proto) => match gen.lower_prototype(&proto) {
                    Ok(function) => {
                        eprintln!("{}", function.print_to_string().to_string_lossy());
                    }
                    Err(err) => handler.error(err.to_string(), span),
                },
                None => parser.bump(),
            },

            TokenKind::Comment(_) | TokenKind::Unknown(_) => parser.bump(),

            TokenKind::Semicolon => parser.bump(),

            _ => match parser.parse_top_level() {
                Some(def) => match gen.lower_function(&def) {
                    Ok(function) => {
                        eprintln!("{}", function.print_to_string().to_string_lossy());
                        // The anonymous wrapper has been inspected;
                        // drop it so it never reaches the backend.
                        // SAFETY: nothing else refers to it.
                        unsafe { function.delete() };
                    }
                    Err(err) => handler.error(err.to_string(), span),
                },
                None => parser.bump(),
            },
        }
    }
}
