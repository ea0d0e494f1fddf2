use std::{
    io::{stdout, Write},
    time::Duration,
};

use {
    bstr::ByteSlice,
    lexopt::{Arg, Parser},
    regex_tutor::{
        danger::{DangerAnalysis, EvilInput},
        guard, Executor,
    },
};

use crate::args::{self, Configurable, Usage};

const USAGE: &str = "\
Reports constructs in each pattern that are known to cause catastrophic
backtracking, along with an estimate of the worst case and suggested
rewrites.

The analysis only looks at the text of a pattern. It never compiles or runs
it, so invalid patterns are analyzed too. With --evil, adversarial inputs
for each pattern are also printed and run, each under a deadline.

USAGE:
    regex-tutor analyze <pattern> ...

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    let mut patterns = args::patterns::Config::positional();
    let mut danger = args::danger::Config::default();
    let mut engine = args::engine::Config::default();
    let mut evil = Evil::default();
    args::configure(
        p,
        USAGE,
        &mut [&mut patterns, &mut danger, &mut engine, &mut evil],
    )?;
    let pats = patterns.get();
    anyhow::ensure!(!pats.is_empty(), "at least one pattern is required");

    let analyzer = danger.analyzer();
    let (executor, flags) = (engine.executor(), engine.flags());
    let mut out = stdout();
    for (i, pat) in pats.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        let analysis = analyzer.analyze(pat);
        print_analysis(&mut out, &analysis)?;
        if evil.enabled {
            writeln!(out, "evil inputs:")?;
            if !engine.engine().backtracks() {
                writeln!(
                    out,
                    "    note: the {} engine does not backtrack, so these \
                     inputs are not expected to be slow",
                    engine.engine(),
                )?;
            }
            for input in analysis.evil_inputs().iter() {
                let outcome =
                    run_evil(&executor, pat, &flags, input, evil.timeout);
                writeln!(
                    out,
                    "    {:?} ({}), expected {}: {}",
                    input.input.as_bytes().as_bstr(),
                    input.description,
                    input.expected.as_str(),
                    outcome,
                )?;
            }
        }
    }
    Ok(())
}

fn print_analysis<W: Write>(
    mut out: W,
    analysis: &DangerAnalysis,
) -> anyhow::Result<()> {
    writeln!(out, "pattern: /{}/", analysis.pattern)?;
    writeln!(out, "level: {}", analysis.level)?;
    writeln!(out, "summary: {}", analysis.summary())?;
    writeln!(out, "complexity: {}", analysis.complexity)?;
    if !analysis.issues.is_empty() {
        writeln!(out, "issues:")?;
        for issue in analysis.issues.iter() {
            writeln!(
                out,
                "    [{}] {}: {} ({})",
                issue.severity, issue.kind, issue.description, issue.fragment,
            )?;
        }
    }
    if let Some(ref worst) = analysis.worst_case {
        writeln!(out, "worst case: {} {}", worst.class, worst.description)?;
        for &(n, ref estimate) in worst.samples.iter() {
            writeln!(out, "    n={}: {}", n, estimate)?;
        }
    }
    if !analysis.suggestions.is_empty() {
        writeln!(out, "suggestions:")?;
        for s in analysis.suggestions.iter() {
            writeln!(out, "    {} ({})", s.suggested, s.reason)?;
        }
    }
    Ok(())
}

/// Run one evil input and describe what happened. Failures are part of the
/// output, not errors.
fn run_evil(
    executor: &Executor,
    pattern: &str,
    flags: &str,
    input: &EvilInput,
    timeout: Duration,
) -> String {
    match guard::probe_with(executor, pattern, &input.input, flags, timeout) {
        Ok(probe) => format!(
            "{} in {:?}{}",
            if probe.matched { "match" } else { "no match" },
            probe.elapsed,
            if probe.slow { " (slow)" } else { "" },
        ),
        Err(err) => format!("{:?}: {}", err.kind(), err),
    }
}

#[derive(Debug)]
struct Evil {
    enabled: bool,
    timeout: Duration,
}

impl Default for Evil {
    fn default() -> Evil {
        Evil { enabled: false, timeout: Duration::from_secs(1) }
    }
}

impl Configurable for Evil {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("evil") => {
                self.enabled = true;
            }
            Arg::Long("timeout-ms") => {
                let ms: u64 = args::parse(p, "--timeout-ms")?;
                self.timeout = Duration::from_millis(ms);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "--evil",
                "Print and run adversarial inputs.",
                r#"
For each pattern, prints inputs that are likely to expose the problems found,
plus one ordinary input to compare against, and runs each of them with the
selected engine. Every run is a single match attempt with a deadline set by
--timeout-ms. A run that misses its deadline is reported as a timeout.
"#,
            ),
            Usage::new(
                "--timeout-ms <ms>",
                "The deadline for each run of an evil input.",
                r#"
Sets the deadline, in milliseconds, for each run started by --evil. Defaults
to 1000.
"#,
            ),
        ];
        USAGES
    }
}
