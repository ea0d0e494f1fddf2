use std::time::Duration;

use regex_tutor::{
    guard::{self, execute_with_deadline},
    ErrorKind, Executor,
};

#[test]
fn probe_reports_match_and_time() -> Result<(), regex_tutor::Error> {
    let probe = guard::probe(r"\d+", "abc 123", "", Duration::from_secs(10))?;
    assert!(probe.matched);
    assert!(!probe.slow);
    assert!(probe.elapsed < Duration::from_secs(10));

    let probe = guard::probe("^x$", "y", "", Duration::from_secs(10))?;
    assert!(!probe.matched);
    Ok(())
}

#[test]
fn probe_errors_are_not_timeouts() {
    let timeout = Duration::from_secs(10);
    let err = guard::probe("(", "", "", timeout).unwrap_err();
    assert_eq!(ErrorKind::Syntax, err.kind());
    let err = guard::probe("a", "a", "gg", timeout).unwrap_err();
    assert_eq!(ErrorKind::Flags, err.kind());
}

#[test]
fn probe_surfaces_backtrack_limit() {
    let executor = Executor::new().backtrack_limit(1_000);
    let text = format!("{}!", "a".repeat(30));
    let err = guard::probe_with(
        &executor,
        r"(a+)+\1b",
        &text,
        "",
        Duration::from_secs(10),
    )
    .unwrap_err();
    assert_eq!(ErrorKind::Limit, err.kind());
}

#[test]
fn deadline_execution_matches_plain_execution() {
    let executor = Executor::new();
    let (pattern, text) = (r"\b\w", "one two three");
    let guarded = execute_with_deadline(
        &executor,
        pattern,
        text,
        "g",
        Duration::from_secs(10),
    );
    let plain = executor.execute(pattern, text, "g");
    assert!(guarded.is_ok());
    assert_eq!(plain.matches, guarded.matches);
    assert_eq!(3, guarded.count());
}

#[test]
fn expired_deadline_is_a_timeout() {
    let got = guard::run_with_deadline(
        "sleeper",
        Duration::from_millis(10),
        || {
            std::thread::sleep(Duration::from_secs(2));
            Ok(())
        },
    );
    assert_eq!(ErrorKind::Timeout, got.unwrap_err().kind());
}
