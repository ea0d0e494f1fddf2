use lexopt::{Arg, Parser};

use regex_tutor::{Engine, Executor, Flags, Limits};

use crate::args::{self, Configurable, Usage};

/// Which engine to use, the flags to compile with and the limits that keep
/// a search bounded.
#[derive(Debug, Default)]
pub struct Config {
    engine: Engine,
    flags: Flags,
    limits: Limits,
}

impl Config {
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// The flags in their canonical string form.
    pub fn flags(&self) -> String {
        self.flags.to_string()
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn executor(&self) -> Executor {
        Executor::new().engine(self.engine).limits(self.limits)
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('e') | Arg::Long("engine") => {
                self.engine = args::parse(p, "-e/--engine")?;
            }
            Arg::Short('g') | Arg::Long("flags") => {
                self.flags = args::parse(p, "-g/--flags")?;
            }
            Arg::Long("backtrack-limit") => {
                self.limits.backtrack_limit =
                    args::parse_maybe(p, "--backtrack-limit")?
                        .unwrap_or(usize::MAX);
            }
            Arg::Long("size-limit") => {
                self.limits.size_limit = args::parse_maybe(p, "--size-limit")?
                    .unwrap_or(usize::MAX);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-e, --engine <engine>",
                "Choose the regex engine: fancy, regex or lite.",
                r#"
Chooses the regex engine. 'fancy' is a backtracking engine and the default. It
is the only one that supports lookaround and backreferences, and the only one
whose search time can blow up.

'regex' and 'lite' run in time linear in the haystack. They reject patterns
that use features they don't support.
"#,
            ),
            Usage::new(
                "-g, --flags <flags>",
                "Set JavaScript style flags, e.g., 'gim'.",
                r#"
Sets the flags to compile the pattern with, as a string of letters: 'g'
global, 'i' ignore case, 'm' multi-line, 's' dot matches new line, 'u'
Unicode, 'y' sticky and 'd' indices. Unknown or repeated letters are an error.

Searches are always global, and Unicode is always enabled. With 'y', each
match must start where the previous one ended.
"#,
            ),
            Usage::new(
                "--backtrack-limit <limit>",
                "Set the backtracking limit of the fancy engine.",
                r#"
Sets how many times the backtracking engine may backtrack in a single search
before giving up with an error. The special value 'none' removes the limit,
which makes it possible for a search to run practically forever.
"#,
            ),
            Usage::new(
                "--size-limit <bytes>",
                "Set a limit on the size of a compiled regex.",
                r#"
Sets an approximate limit, in bytes, on the size of a compiled regex. The
special value 'none' indicates that no size limit should be imposed.
"#,
            ),
        ];
        USAGES
    }
}
