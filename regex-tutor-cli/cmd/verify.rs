use std::{
    io::{stdout, Write},
    path::{Path, PathBuf},
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser},
    regex_tutor::{Lessons, Verifier},
};

use crate::{
    args::{self, Configurable, Usage},
    util::{self, Table},
};

const USAGE: &str = "\
Checks that every step of the given lessons finds exactly the number of
matches it expects, and prints a report of the steps that don't.

Each argument is either a lesson file in TOML format or a directory. Every
file ending in '.toml' in a directory is loaded, in file name order. Lesson
ids default to the file stem and must be unique across all files.

The exit status is 1 if any step failed.

USAGE:
    regex-tutor verify <lesson-path> ...

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    let mut common = args::common::Config::default();
    let mut engine = args::engine::Config::default();
    let mut paths = Paths::default();
    args::configure(p, USAGE, &mut [&mut common, &mut engine, &mut paths])?;
    anyhow::ensure!(!paths.0.is_empty(), "a lesson path is required");

    let mut table = Table::empty();
    let (lessons, time) = util::timeitr(|| {
        let mut lessons = Lessons::new();
        for path in paths.0.iter() {
            load(&mut lessons, path)?;
        }
        Ok::<_, anyhow::Error>(lessons)
    })?;
    table.add("load time", time);
    table.add("lessons", lessons.len());
    table.add(
        "steps",
        lessons.iter().map(|l| l.steps().len()).sum::<usize>(),
    );

    let verifier = Verifier::new().executor(engine.executor());
    let (suite, time) = util::timeit(|| verifier.test_lessons(&lessons));
    table.add("verify time", time);
    table.add("failed steps", suite.failed_steps().count());

    let mut out = stdout();
    if common.table() {
        table.print(&mut out)?;
    }
    if !common.quiet {
        write!(out, "{}", suite)?;
    }
    anyhow::ensure!(
        suite.passed(),
        "{} of {} lesson(s) failed",
        suite.failed_lessons().count(),
        suite.total_lessons(),
    );
    Ok(())
}

fn load(lessons: &mut Lessons, path: &Path) -> anyhow::Result<()> {
    if !path.is_dir() {
        return lessons.load(path);
    }
    let mut files = vec![];
    let entries = std::fs::read_dir(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    for entry in entries {
        let file = entry
            .with_context(|| format!("failed to read {}", path.display()))?
            .path();
        if file.extension().map_or(false, |ext| ext == "toml") {
            files.push(file);
        }
    }
    files.sort();
    for file in files.iter() {
        lessons.load(file)?;
    }
    Ok(())
}

/// The lesson files and directories given as positional arguments.
#[derive(Debug, Default)]
struct Paths(Vec<PathBuf>);

impl Configurable for Paths {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Value(ref mut v) => {
                self.0.push(PathBuf::from(std::mem::take(v)));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[]
    }
}
