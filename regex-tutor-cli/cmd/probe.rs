use std::{
    io::{stdout, Read, Write},
    process::{Child, Command, Stdio},
    time::{Duration, Instant},
};

use {
    anyhow::Context,
    bstr::ByteSlice,
    lexopt::{Arg, Parser},
    regex_tutor::guard,
};

use crate::{
    args::{self, Configurable, Usage},
    util::Table,
};

const USAGE: &str = "\
Runs a pattern over a haystack and stops it at a hard deadline.

By default, the search runs in a child process (this program's 'find'
command) which is killed when the deadline passes. This stops any search,
even one running with --backtrack-limit none. With --threaded, the search
runs on a worker thread instead and is abandoned at the deadline. That only
stops waiting for it, so it relies on the backtrack limit to end the search.

USAGE:
    regex-tutor probe -p <pattern> <haystack-path>
    regex-tutor probe -p <pattern> -y <haystack>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

/// How often the child process is checked for completion.
const POLL: Duration = Duration::from_millis(5);

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    let mut common = args::common::Config::default();
    let mut patterns = args::patterns::Config::only_flags();
    let mut haystack = args::haystack::Config::default();
    let mut engine = args::engine::Config::default();
    let mut probe = Config::default();
    args::configure(
        p,
        USAGE,
        &mut [
            &mut common,
            &mut patterns,
            &mut haystack,
            &mut engine,
            &mut probe,
        ],
    )?;
    let pattern = patterns.one()?;

    let mut out = stdout();
    haystack.with(|haystack| {
        let mut table = Table::empty();
        table.add("timeout", probe.timeout);
        if probe.threaded {
            let result = guard::probe_with(
                &engine.executor(),
                &pattern,
                haystack,
                &engine.flags(),
                probe.timeout,
            )?;
            table.add("elapsed", result.elapsed);
            table.add("matched", result.matched);
            table.add("slow", result.slow);
        } else {
            let (outcome, elapsed) =
                run_child(&engine, &pattern, haystack, probe.timeout)?;
            table.add("elapsed", elapsed);
            match outcome {
                Outcome::Finished(count) => table.add("matches", count),
                Outcome::Killed => {
                    if common.table() {
                        table.print(&mut out)?;
                    }
                    anyhow::bail!(
                        "search did not finish within {:?}, killed it",
                        probe.timeout,
                    );
                }
            }
        }
        if common.table() {
            table.print(&mut out)?;
        }
        Ok(())
    })
}

#[derive(Debug)]
enum Outcome {
    Finished(usize),
    Killed,
}

/// Count matches by running `find` in a child process, killing it if it
/// runs past `timeout`.
fn run_child(
    engine: &args::engine::Config,
    pattern: &str,
    haystack: &str,
    timeout: Duration,
) -> anyhow::Result<(Outcome, Duration)> {
    let exe = std::env::current_exe()
        .context("failed to find the path of this executable")?;
    let limits = engine.limits();
    let (flags, backtrack_limit, size_limit) = (
        engine.flags(),
        limits.backtrack_limit.to_string(),
        limits.size_limit.to_string(),
    );
    let start = Instant::now();
    let mut child = Command::new(exe)
        .arg("find")
        .arg("--count")
        .arg("--no-table")
        .args(["--pattern", pattern])
        .args(["--flags", flags.as_str()])
        .args(["--engine", engine.engine().as_str()])
        .args(["--backtrack-limit", backtrack_limit.as_str()])
        .args(["--size-limit", size_limit.as_str()])
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to start child process")?;
    log::debug!("started child process {}", child.id());

    // Feed the haystack from another thread, so that a child that stops
    // reading can't block the deadline.
    let mut stdin = child.stdin.take().context("child has no stdin")?;
    let haystack = haystack.to_string();
    std::thread::spawn(move || {
        // A child that died early closes the pipe, which is reported below.
        let _ = stdin.write_all(haystack.as_bytes());
    });

    let deadline = start + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            let elapsed = start.elapsed();
            let (stdout, stderr) = read_output(&mut child)?;
            anyhow::ensure!(
                status.success(),
                "child failed ({}): {}",
                status,
                stderr.trim(),
            );
            let count = stdout
                .trim()
                .parse()
                .with_context(|| format!("unexpected output: {:?}", stdout))?;
            return Ok((Outcome::Finished(count), elapsed));
        }
        if Instant::now() >= deadline {
            log::warn!("child process {} missed its deadline", child.id());
            child.kill().context("failed to kill child process")?;
            child.wait()?;
            return Ok((Outcome::Killed, start.elapsed()));
        }
        std::thread::sleep(POLL);
    }
}

fn read_output(child: &mut Child) -> anyhow::Result<(String, String)> {
    let mut stdout = vec![];
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_end(&mut stdout)?;
    }
    let mut stderr = vec![];
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_end(&mut stderr)?;
    }
    let lossy = |bytes: Vec<u8>| bytes.to_str_lossy().into_owned();
    Ok((lossy(stdout), lossy(stderr)))
}

#[derive(Debug)]
struct Config {
    timeout: Duration,
    threaded: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config { timeout: Duration::from_secs(1), threaded: false }
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("timeout-ms") => {
                let ms: u64 = args::parse(p, "--timeout-ms")?;
                self.timeout = Duration::from_millis(ms);
            }
            Arg::Long("threaded") => {
                self.threaded = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "--timeout-ms <ms>",
                "The deadline for the search, in milliseconds.",
                r#"
Sets the deadline for the search, in milliseconds. Defaults to 1000. In the
default mode, the deadline includes the time it takes to start the child
process.
"#,
            ),
            Usage::new(
                "--threaded",
                "Run on a worker thread instead of a child process.",
                r#"
Runs the search as a single match attempt on a worker thread of this process,
and stops waiting for it at the deadline. The worker itself is not stopped.
"#,
            ),
        ];
        USAGES
    }
}
