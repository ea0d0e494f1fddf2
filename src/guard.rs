/*!
Deadlines for pattern execution.

A search can't be interrupted from the outside once it has started. So
instead of racing a timer against a search on the same thread, the search
runs on a worker thread and the caller waits for it with a deadline. When
the deadline passes, the caller gets a [`ErrorKind::Timeout`] error right
away and the worker is left to finish on its own.

Abandoning a worker is only sound because every engine used here is
bounded: the automata engines run in linear time, and the backtracking
engine gives up after a fixed number of backtracking steps. A worker that
is abandoned therefore always terminates, it just does so in the
background. Callers that need the work to stop at the deadline, at any
cost, should run it in a child process and kill that instead.
*/

use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use crate::{
    error::{Error, ErrorKind},
    exec::{Execution, Executor},
    flags::Flags,
};

/// Runs slower than this are marked as slow by [`probe`].
pub const SLOW: Duration = Duration::from_millis(100);

/// Run `f` on a new thread named `name` and wait at most `timeout` for its
/// result.
///
/// A panic in `f` is resumed on the calling thread.
pub fn run_with_deadline<T, F>(
    name: &str,
    timeout: Duration,
    f: F,
) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    let (send, recv) = mpsc::channel();
    let handle = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // The receiver is gone if the caller stopped waiting.
            let _ = send.send(f());
        })
        .map_err(|err| spawn_failed(name, err))?;
    match recv.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::warn!(
                "worker '{}' missed its deadline of {:?}, abandoning it",
                name,
                timeout,
            );
            Err(Error::new(
                ErrorKind::Timeout,
                format!("timed out after {:?}", timeout),
            ))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match handle.join() {
            Err(panic) => std::panic::resume_unwind(panic),
            // The worker always sends before exiting normally.
            Ok(()) => Err(Error::new(
                ErrorKind::Worker,
                format!("worker '{}' exited without a result", name),
            )),
        },
    }
}

fn spawn_failed(name: &str, err: std::io::Error) -> Error {
    Error::new(
        ErrorKind::Worker,
        format!("failed to spawn worker thread '{}': {}", name, err),
    )
}

/// The outcome of a single boolean search run by [`probe`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Probe {
    pub matched: bool,
    pub elapsed: Duration,
    /// Set when the search took longer than [`SLOW`].
    pub slow: bool,
}

/// Compile `pattern` and check whether it matches `text`, giving up after
/// `timeout`. Uses the default engine and limits.
pub fn probe(
    pattern: &str,
    text: &str,
    flags: &str,
    timeout: Duration,
) -> Result<Probe, Error> {
    probe_with(&Executor::new(), pattern, text, flags, timeout)
}

/// Like [`probe`], but with the engine and limits of `executor`.
pub fn probe_with(
    executor: &Executor,
    pattern: &str,
    text: &str,
    flags: &str,
    timeout: Duration,
) -> Result<Probe, Error> {
    let flags: Flags = flags.parse()?;
    let re = crate::engine::Compiled::new(
        pattern,
        flags,
        executor.get_engine(),
        executor.get_limits(),
    )?;
    let text = text.to_string();
    let start = Instant::now();
    let matched = run_with_deadline("regex-tutor-probe", timeout, move || {
        re.is_match(&text)
    })?;
    let elapsed = start.elapsed();
    Ok(Probe { matched, elapsed, slow: elapsed > SLOW })
}

/// Run [`Executor::execute`] on a worker thread with a deadline. When the
/// deadline passes, the execution has no matches and a timeout error.
pub fn execute_with_deadline(
    executor: &Executor,
    pattern: &str,
    text: &str,
    flags: &str,
    timeout: Duration,
) -> Execution {
    let (executor, pattern, text, flags) = (
        executor.clone(),
        pattern.to_string(),
        text.to_string(),
        flags.to_string(),
    );
    let result = run_with_deadline("regex-tutor-exec", timeout, move || {
        Ok(executor.execute(&pattern, &text, &flags))
    });
    match result {
        Ok(exec) => exec,
        Err(err) => Execution { matches: vec![], error: Some(err) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_before_deadline() {
        let got =
            run_with_deadline("quick", Duration::from_secs(5), || Ok(42));
        assert_eq!(Ok(42), got);
    }

    #[test]
    fn errors_pass_through() {
        let got: Result<(), Error> =
            run_with_deadline("failing", Duration::from_secs(5), || {
                Err(Error::input("nope"))
            });
        assert_eq!(ErrorKind::Input, got.unwrap_err().kind());
    }

    #[test]
    fn deadline_expires() {
        let start = Instant::now();
        let got = run_with_deadline("sleepy", Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(500));
            Ok(())
        });
        assert_eq!(ErrorKind::Timeout, got.unwrap_err().kind());
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn panics_are_resumed() {
        let _: Result<(), Error> =
            run_with_deadline("panicky", Duration::from_secs(5), || {
                panic!("boom")
            });
    }

    #[test]
    fn probe_simple_pattern() {
        let p = probe(r"^\d+$", "12345", "", Duration::from_secs(5)).unwrap();
        assert!(p.matched);
        assert!(!p.slow);
        let err = probe("(", "x", "", Duration::from_secs(5)).unwrap_err();
        assert_eq!(ErrorKind::Syntax, err.kind());
    }

    #[test]
    fn sticky_search_starts_at_zero() {
        let timeout = Duration::from_secs(5);
        assert!(!probe("b", "ab", "y", timeout).unwrap().matched);
        assert!(probe("b", "ba", "y", timeout).unwrap().matched);
    }

    #[test]
    fn spawn_failure_is_a_worker_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads");
        let err = spawn_failed("search", io);
        assert_eq!(ErrorKind::Worker, err.kind());
        assert_eq!(
            "failed to spawn worker thread 'search': no threads",
            err.message(),
        );
    }
}
