//! In-process driver tests: the dispatch loop against a real module.

use inkwell::context::Context;

use kali_drv::{dispatch, Config, Session};
use kali_gen::CodegenContext;
use kali_par::{Parser, ANONYMOUS_FUNCTION_NAME};
use kali_util::Handler;

fn run_dispatch(source: &str) -> (Context, Handler) {
    let context = Context::create();
    let handler = Handler::silent();
    {
        let mut gen = CodegenContext::new(&context, "test").expect("codegen context");
        let mut parser = Parser::new(source, &handler);
        dispatch(&mut parser, &mut gen, &handler);
    }
    (context, handler)
}

#[test]
fn dispatch_compiles_a_program() {
    let context = Context::create();
    let handler = Handler::silent();
    let mut gen = CodegenContext::new(&context, "test").unwrap();
    let mut parser = Parser::new(
        "extern sin(x); def twice(x) sin(x) + sin(x); 1 + 2;",
        &handler,
    );

    dispatch(&mut parser, &mut gen, &handler);

    assert!(!handler.has_errors());
    assert!(gen.module().get_function("sin").is_some());
    assert!(gen.module().get_function("twice").is_some());
    // The top-level expression's wrapper is erased after inspection.
    assert!(gen.module().get_function(ANONYMOUS_FUNCTION_NAME).is_none());
}

#[test]
fn dispatch_skips_comments_and_semicolons() {
    let context = Context::create();
    let handler = Handler::silent();
    let mut gen = CodegenContext::new(&context, "test").unwrap();
    let mut parser = Parser::new("# a comment\n;;; def one() 1", &handler);

    dispatch(&mut parser, &mut gen, &handler);

    assert!(!handler.has_errors());
    assert!(gen.module().get_function("one").is_some());
}

#[test]
fn dispatch_resynchronises_after_a_parse_error() {
    let context = Context::create();
    let handler = Handler::silent();
    let mut gen = CodegenContext::new(&context, "test").unwrap();
    let mut parser = Parser::new("def 1bad(x) x; def ok(a) a", &handler);

    dispatch(&mut parser, &mut gen, &handler);

    assert!(handler.has_errors());
    // The definition after the broken one still compiles.
    assert!(gen.module().get_function("ok").is_some());
}

#[test]
fn dispatch_reports_lowering_failures_and_continues() {
    let context = Context::create();
    let handler = Handler::silent();
    let mut gen = CodegenContext::new(&context, "test").unwrap();
    let mut parser = Parser::new("def bad(x) unknown_var + x; def good(x) x", &handler);

    dispatch(&mut parser, &mut gen, &handler);

    assert!(handler.has_errors());
    assert!(gen.module().get_function("bad").is_none());
    assert!(gen.module().get_function("good").is_some());
}

#[test]
fn dispatch_handles_empty_input() {
    let (_context, handler) = run_dispatch("");
    assert!(!handler.has_errors());
}

#[test]
fn dispatch_ignores_unknown_atoms() {
    let (_context, handler) = run_dispatch("! ? @");
    assert!(!handler.has_errors());
}

#[test]
fn session_counts_errors_but_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.kali");
    std::fs::write(&path, "def bad(x) unknown_var + x\ndef good(x) x\n").unwrap();

    let session = Session::new(Config {
        input: Some(path),
        dump_module: false,
    });
    let errors = session.run().unwrap();
    assert_eq!(errors, 1);
}

#[test]
fn session_succeeds_on_a_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.kali");
    std::fs::write(&path, "def identity(x) x\n").unwrap();

    let session = Session::new(Config {
        input: Some(path),
        dump_module: false,
    });
    assert_eq!(session.run().unwrap(), 0);
}

#[test]
fn session_fails_on_a_missing_file() {
    let session = Session::new(Config {
        input: Some("does-not-exist.kali".into()),
        dump_module: false,
    });
    assert!(session.run().is_err());
}

#[test]
fn config_parses_arguments() {
    let config = Config::from_args(["--no-dump".to_string(), "a.kali".to_string()].into_iter())
        .unwrap();
    assert!(!config.dump_module);
    assert_eq!(config.input.as_deref(), Some(std::path::Path::new("a.kali")));

    let config = Config::from_args(std::iter::empty()).unwrap();
    assert!(config.input.is_none());
    assert!(config.dump_module);

    assert!(Config::from_args(["--wat".to_string()].into_iter()).is_err());
    assert!(
        Config::from_args(["a.kali".to_string(), "b.kali".to_string()].into_iter()).is_err()
    );
}
