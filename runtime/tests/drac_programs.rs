//! End-to-end runs of hand-written modules against the `drac` host.
//!
//! Each module declares exactly the imports a Drac compiler emits and runs
//! with a scripted console, so stdout can be compared byte for byte.

use drac_runtime::{
    execute_scripted, Console, FatalKind, HeapError, Runtime, RuntimeConfig, RuntimeError,
    Session,
};

const IMPORTS: &str = r#"
  (import "drac" "printi" (func $printi (param i32) (result i32)))
  (import "drac" "printc" (func $printc (param i32) (result i32)))
  (import "drac" "prints" (func $prints (param i32) (result i32)))
  (import "drac" "println" (func $println (result i32)))
  (import "drac" "readi" (func $readi (result i32)))
  (import "drac" "reads" (func $reads (result i32)))
  (import "drac" "new" (func $new (param i32) (result i32)))
  (import "drac" "size" (func $size (param i32) (result i32)))
  (import "drac" "add" (func $add (param i32 i32) (result i32)))
  (import "drac" "get" (func $get (param i32 i32) (result i32)))
  (import "drac" "set" (func $set (param i32 i32 i32)))
"#;

/// Wrap a `main` body in a module that imports the whole API.
fn program(body: &str) -> String {
    format!("(module {IMPORTS} (func (export \"main\") (local $h i32) (local $x i32) {body}))")
}

/// Run a program, keeping stdout even when the run fails.
fn run_capturing(body: &str, input: &str) -> (Result<Session, RuntimeError>, String) {
    let runtime = Runtime::new(RuntimeConfig::default()).unwrap();
    let module = runtime.load(program(body).as_bytes()).unwrap();
    let (console, output) = Console::scripted(input);
    let result = runtime.run(&module, Session::new(console));
    (result, output.contents())
}

fn expect_fatal(result: Result<Session, RuntimeError>) -> drac_runtime::Fatal {
    match result {
        Err(RuntimeError::Fatal(fatal)) => fatal,
        Err(other) => panic!("expected a fatal error, got {other}"),
        Ok(_) => panic!("expected a fatal error, run succeeded"),
    }
}

#[test]
fn full_import_preamble_links() {
    let out = execute_scripted(program("").as_bytes(), "").unwrap();
    assert!(out.is_empty());
}

#[test]
fn echo_line() {
    let body = r#"
        (drop (call $prints (call $reads)))
        (drop (call $println))
    "#;
    let out = execute_scripted(program(body).as_bytes(), "hello, wörld\n").unwrap();
    assert_eq!(out, "hello, wörld\n");
}

#[test]
fn prints_writes_array_without_newline() {
    let body = r#"
        (local.set $h (call $new (i32.const 0)))
        (drop (call $add (local.get $h) (i32.const 72)))
        (drop (call $add (local.get $h) (i32.const 73)))
        (drop (call $prints (local.get $h)))
    "#;
    assert_eq!(execute_scripted(program(body).as_bytes(), "").unwrap(), "HI");
}

#[test]
fn readi_skips_malformed_lines() {
    let body = r#"
        (drop (call $printi (i32.add (call $readi) (call $readi))))
    "#;
    let out = execute_scripted(program(body).as_bytes(), "abc\n\n  12  \nx1\n-20\n").unwrap();
    assert_eq!(out, "-8");
}

#[test]
fn array_operations() {
    let body = r#"
        (local.set $h (call $new (i32.const 0)))
        (drop (call $add (local.get $h) (i32.const 3)))
        (drop (call $add (local.get $h) (i32.const 4)))
        (call $set (local.get $h) (i32.const 0) (i32.const 10))
        (drop (call $printi (call $get (local.get $h) (i32.const 0))))
        (drop (call $printc (i32.const 44)))
        (drop (call $printi (call $get (local.get $h) (i32.const 1))))
        (drop (call $printc (i32.const 44)))
        (drop (call $printi (call $size (local.get $h))))
    "#;
    assert_eq!(execute_scripted(program(body).as_bytes(), "").unwrap(), "10,4,2");
}

#[test]
fn new_array_is_zero_filled() {
    let body = r#"
        (local.set $h (call $new (i32.const 3)))
        (drop (call $printi (call $size (local.get $h))))
        (drop (call $printi (call $get (local.get $h) (i32.const 0))))
        (drop (call $printi (call $get (local.get $h) (i32.const 2))))
    "#;
    assert_eq!(execute_scripted(program(body).as_bytes(), "").unwrap(), "300");
}

#[test]
fn handles_are_sequential_across_new_and_reads() {
    let body = r#"
        (drop (call $printi (call $new (i32.const 1))))
        (drop (call $printc (i32.const 32)))
        (drop (call $printi (call $reads)))
        (drop (call $printc (i32.const 32)))
        (drop (call $printi (call $new (i32.const 1))))
    "#;
    assert_eq!(execute_scripted(program(body).as_bytes(), "hi\n").unwrap(), "0 1 2");
}

#[test]
fn sessions_do_not_share_heaps() {
    let runtime = Runtime::new(RuntimeConfig::default()).unwrap();
    let module = runtime
        .load(program("(drop (call $printi (call $new (i32.const 1))))").as_bytes())
        .unwrap();

    for _ in 0..2 {
        let (console, output) = Console::scripted("");
        let session = runtime.run(&module, Session::new(console)).unwrap();
        assert_eq!(output.contents(), "0");
        assert_eq!(session.heap().len(), 1);
    }
}

#[test]
fn final_heap_is_inspectable() {
    let body = r#"
        (drop (call $reads))
        (local.set $h (call $new (i32.const 2)))
        (call $set (local.get $h) (i32.const 1) (i32.const -9))
    "#;
    let (result, _) = run_capturing(body, "ok\n");
    let session = result.unwrap();
    assert_eq!(session.heap().array(0).unwrap(), &[111, 107]);
    assert_eq!(session.heap().array(1).unwrap(), &[0, -9]);
}

#[test]
fn negative_size_is_fatal() {
    let (result, out) = run_capturing("(drop (call $new (i32.const -1)))", "");
    let fatal = expect_fatal(result);
    assert_eq!(fatal.function, "new");
    assert_eq!(fatal.heap_error(), Some(HeapError::NegativeSize(-1)));
    assert!(out.is_empty());
}

#[test]
fn output_before_fatal_is_kept() {
    let body = r#"
        (drop (call $printi (i32.const 1)))
        (local.set $h (call $new (i32.const 1)))
        (drop (call $get (local.get $h) (i32.const 5)))
        (drop (call $printi (i32.const 2)))
    "#;
    let (result, out) = run_capturing(body, "");
    let fatal = expect_fatal(result);
    assert_eq!(out, "1");
    assert_eq!(
        fatal.to_string(),
        "Runtime error in function get. Array index out of bounds: 5"
    );
}

#[test]
fn invalid_handles_are_fatal_for_every_array_function() {
    let cases = [
        ("prints", "(drop (call $prints (i32.const 0)))"),
        ("size", "(drop (call $size (i32.const 0)))"),
        ("add", "(drop (call $add (i32.const 0) (i32.const 1)))"),
        ("get", "(drop (call $get (i32.const 0) (i32.const 0)))"),
        ("set", "(call $set (i32.const 0) (i32.const 0) (i32.const 1))"),
    ];
    for (function, body) in cases {
        let (result, _) = run_capturing(body, "");
        let fatal = expect_fatal(result);
        assert_eq!(fatal.function, function);
        assert_eq!(fatal.heap_error(), Some(HeapError::InvalidHandle(0)));
    }
}

#[test]
fn negative_handle_is_fatal() {
    let body = r#"
        (drop (call $new (i32.const 1)))
        (drop (call $size (i32.const -1)))
    "#;
    let (result, _) = run_capturing(body, "");
    assert_eq!(expect_fatal(result).heap_error(), Some(HeapError::InvalidHandle(-1)));
}

#[test]
fn set_out_of_bounds_is_fatal() {
    let body = r#"
        (local.set $h (call $new (i32.const 2)))
        (call $set (local.get $h) (i32.const 2) (i32.const 1))
    "#;
    let (result, _) = run_capturing(body, "");
    let fatal = expect_fatal(result);
    assert_eq!(fatal.function, "set");
    assert_eq!(fatal.heap_error(), Some(HeapError::IndexOutOfBounds(2)));
}

#[test]
fn end_of_input_is_fatal() {
    let (result, _) = run_capturing("(drop (call $readi))", "abc\n");
    let fatal = expect_fatal(result);
    assert_eq!(fatal.function, "readi");
    assert!(matches!(fatal.kind, FatalKind::EndOfInput));
}

#[test]
fn fatal_errors_exit_with_status_one() {
    let (result, _) = run_capturing("(drop (call $size (i32.const 3)))", "");
    let err = result.err().unwrap();
    assert_eq!(err.exit_status(), 1);
    assert_eq!(
        err.to_string(),
        "Runtime error in function size. Invalid array handle: 3"
    );
}
