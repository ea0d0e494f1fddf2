use std::io::{stdout, Write};

use {
    bstr::ByteSlice,
    lexopt::{Arg, Parser},
    regex_tutor::{Execution, Pattern},
};

use crate::{
    args::{self, Configurable, Usage},
    util::{self, Table},
};

const USAGE: &str = "\
Collects every match of a pattern in a haystack.

The search is global: it resumes where each match ended, and an empty match
moves the search forward by one character. Each match is printed as its
start and end byte offsets followed by the matched text. Capture groups are
printed below their match, '-' marking a group that didn't participate.

USAGE:
    regex-tutor find -p <pattern> <haystack-path>
    regex-tutor find -p <pattern> -y <haystack>

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
    let mut find = Config::default();
    args::configure(
        p,
        USAGE,
        &mut [
            &mut common,
            &mut patterns,
            &mut haystack,
            &mut engine,
            &mut find,
        ],
    )?;

    let pattern = Pattern::new(&patterns.one()?, &engine.flags());
    let mut table = Table::empty();
    let (re, time) = util::timeitr(|| {
        pattern.compile(engine.engine(), &engine.limits())
    })?;
    table.add("compile time", time);
    table.add("engine", engine.engine());

    let executor = engine.executor();
    let mut out = stdout();
    haystack.with(|haystack| {
        let (exec, time) = util::timeit(|| {
            let mut exec = Execution::default();
            for _ in 0..find.repeat() {
                exec = executor.execute_compiled(&re, haystack);
            }
            exec
        });
        table.add("search time", time);
        table.add("total matches", exec.count());
        if common.table() {
            table.print(&mut out)?;
        }
        if find.count {
            writeln!(out, "{}", exec.count())?;
        } else if !common.quiet {
            for m in exec.matches.iter() {
                let span = m.span();
                writeln!(
                    out,
                    "{}:{}:{}",
                    span.start,
                    span.end,
                    m.text.as_bytes().escape_bytes(),
                )?;
                for (i, group) in m.groups.iter().enumerate() {
                    match *group {
                        None => writeln!(out, "    {}: -", i + 1)?,
                        Some(ref g) => writeln!(
                            out,
                            "    {}: {}",
                            i + 1,
                            g.as_bytes().escape_bytes(),
                        )?,
                    }
                }
            }
        }
        // The matches found before a limit was hit are still printed.
        if let Some(err) = exec.error {
            anyhow::bail!("search stopped early: {}", err);
        }
        Ok(())
    })
}

#[derive(Debug, Default)]
struct Config {
    count: bool,
    repeat: Option<u32>,
}

impl Config {
    fn repeat(&self) -> u32 {
        self.repeat.unwrap_or(1)
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('c') | Arg::Long("count") => {
                self.count = true;
            }
            Arg::Long("repeat") => {
                self.repeat = Some(args::parse(p, "--repeat")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-c, --count",
                "Print only the number of matches.",
                r#"
Prints the number of matches instead of the matches themselves.
"#,
            ),
            Usage::new(
                "--repeat <n>",
                "Repeat the search this many times.",
                r#"
Repeats the search this many times. By default, this is set to 1. This is
useful when the search is too fast to measure reliably. Only the matches of
the last search are printed.
"#,
            ),
        ];
        USAGES
    }
}
