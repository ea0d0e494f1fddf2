use std::io::{stdout, Write};

use {
    lexopt::{Arg, Parser},
    regex_tutor::profile::{baseline, Profiler},
};

use crate::{
    args::{self, Configurable, Usage},
    util::Table,
};

const USAGE: &str = "\
Times each pattern against the haystack and prints them ranked from fastest
to slowest.

Each pattern is searched for with a single boolean match per iteration, after
a few untimed warmup runs. Compile time is measured separately. The numbers
are wall clock times, so only compare them with each other.

USAGE:
    regex-tutor profile -p <pattern> ... <haystack-path>
    regex-tutor profile -p <pattern> ... -y <haystack>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    let mut common = args::common::Config::default();
    let mut patterns = args::patterns::Config::only_flags();
    let mut haystack = args::haystack::Config::default();
    let mut engine = args::engine::Config::default();
    let mut profile = Config::default();
    args::configure(
        p,
        USAGE,
        &mut [
            &mut common,
            &mut patterns,
            &mut haystack,
            &mut engine,
            &mut profile,
        ],
    )?;
    let pats = patterns.get();
    anyhow::ensure!(!pats.is_empty(), "at least one pattern is required");

    let flags = engine.flags();
    let mut profiler =
        Profiler::new().engine(engine.engine()).limits(engine.limits());
    let mut out = stdout();
    haystack.with(|haystack| {
        for (i, pat) in pats.iter().enumerate() {
            let name = format!("pattern {}", i + 1);
            let n = profile.iterations;
            profiler.profile(&name, pat, &flags, haystack, n)?;
        }
        if !common.quiet {
            writeln!(out, "{}", profiler.report())?;
        }
        if let Some(ref needle) = profile.substring {
            let base = baseline::compare_substring_search(
                haystack,
                needle,
                profile.iterations,
            )?;
            if common.table() {
                let mut table = Table::empty();
                for t in base.timings.iter() {
                    table.add(
                        &t.method,
                        format!("{:?} (+{:.1}%)", t.time, t.percent_slower),
                    );
                }
                table.add("winner", base.winner().to_string());
                table.print(&mut out)?;
            }
        }
        Ok(())
    })
}

#[derive(Debug)]
struct Config {
    iterations: usize,
    substring: Option<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config { iterations: 1000, substring: None }
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('n') | Arg::Long("iterations") => {
                self.iterations = args::parse(p, "-n/--iterations")?;
            }
            Arg::Long("substring") => {
                self.substring = Some(args::parse(p, "--substring")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-n, --iterations <n>",
                "How many times to search with each pattern.",
                r#"
Sets how many timed searches are run for each pattern. Defaults to 1000. Zero
is an error.
"#,
            ),
            Usage::new(
                "--substring <needle>",
                "Compare plain substring search with regex search.",
                r#"
Also times searching the haystack for the literal needle given, with
str::contains, str::find and an escaped regex on every engine, and prints the
results as a table. The -n/--iterations flag applies here too.
"#,
            ),
        ];
        USAGES
    }
}
