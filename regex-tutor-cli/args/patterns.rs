use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
};

use crate::args::{Configurable, Usage};

/// Patterns given on the command line.
///
/// Patterns always come from `-p/--pattern`. Commands that take no other
/// positional arguments can also accept patterns positionally, see
/// `Config::positional`.
#[derive(Debug, Default)]
pub struct Config {
    patterns: Vec<String>,
    fixed_strings: bool,
    positional: bool,
}

impl Config {
    /// Treat every positional argument as a pattern too.
    pub fn positional() -> Config {
        Config { positional: true, ..Config::default() }
    }

    /// Only read patterns from `-p/--pattern`.
    pub fn only_flags() -> Config {
        Config::default()
    }

    /// Every pattern given, escaped if `-F/--fixed-strings` was set. This
    /// may be empty.
    pub fn get(&self) -> Vec<String> {
        if self.fixed_strings {
            self.patterns.iter().map(|p| regex::escape(p)).collect()
        } else {
            self.patterns.clone()
        }
    }

    /// Like `get`, but fails unless exactly one pattern was given.
    pub fn one(&self) -> anyhow::Result<String> {
        let mut pats = self.get();
        anyhow::ensure!(
            pats.len() == 1,
            "exactly one pattern is required, but {} were given",
            pats.len(),
        );
        Ok(pats.remove(0))
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('p') | Arg::Long("pattern") => {
                let pat = p.value().context("-p/--pattern needs a value")?;
                let pat = pat
                    .string()
                    .context("-p/--pattern must be valid UTF-8")?;
                self.patterns.push(pat);
            }
            Arg::Short('F') | Arg::Long("fixed-strings") => {
                self.fixed_strings = true;
            }
            Arg::Value(ref mut v) => {
                if !self.positional {
                    return Ok(false);
                }
                let v = std::mem::take(v);
                self.patterns
                    .push(v.string().context("patterns must be valid UTF-8")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-p, --pattern <pattern>",
                "Add a pattern to this command.",
                r#"
Adds a pattern. Commands that work on one pattern at a time require exactly
one. Commands like 'regex-tutor profile' accept any number of them.

Patterns must be valid UTF-8.
"#,
            ),
            Usage::new(
                "-F, --fixed-strings",
                "Interpret all patterns literally.",
                r#"
When set, every pattern is escaped before use, so that meta characters like
'+' or '.' match themselves.
"#,
            ),
        ];
        USAGES
    }
}
