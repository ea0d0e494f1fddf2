use lexopt::{Arg, Parser};

use regex_tutor::danger::{Analyzer, Thresholds};

use crate::args::{self, Configurable, Usage};

/// The cut-offs used by the danger analyzer.
#[derive(Debug, Default)]
pub struct Config {
    thresholds: Thresholds,
}

impl Config {
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.thresholds)
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        let t = &mut self.thresholds;
        match *arg {
            Arg::Long("max-dot-stars") => {
                t.max_dot_stars = args::parse(p, "--max-dot-stars")?;
            }
            Arg::Long("unbounded-min") => {
                t.unbounded_min = args::parse(p, "--unbounded-min")?;
            }
            Arg::Long("max-lookarounds") => {
                t.max_lookarounds = args::parse(p, "--max-lookarounds")?;
            }
            Arg::Long("max-captures") => {
                t.max_captures = args::parse(p, "--max-captures")?;
            }
            Arg::Long("polynomial-alternations") => {
                t.polynomial_alternations =
                    args::parse(p, "--polynomial-alternations")?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "--max-dot-stars <n>",
                "Flag patterns with more than this many '.*'.",
                r#"
Patterns containing more than this many '.*' are reported as having multiple
dot stars, a medium severity problem. Defaults to 1.
"#,
            ),
            Usage::new(
                "--unbounded-min <n>",
                "Flag '{n,}' when n is greater than this.",
                r#"
A counted repetition without an upper bound, like '{20,}', is reported when
its minimum is greater than this value. Defaults to 10.
"#,
            ),
            Usage::new(
                "--max-lookarounds <n>",
                "Flag patterns with more lookarounds than this.",
                r#"
Patterns with more lookaheads and lookbehinds combined than this are reported
as having complex lookarounds. Defaults to 3.
"#,
            ),
            Usage::new(
                "--max-captures <n>",
                "Flag patterns with more capture groups than this.",
                r#"
Patterns with more capturing groups than this are reported as having
excessive captures, with a suggestion to use non-capturing groups. Defaults to
10.
"#,
            ),
            Usage::new(
                "--polynomial-alternations <n>",
                "Alternations needed for a polynomial estimate.",
                r#"
When a flagged pattern has no nested quantifiers, its worst case is estimated
as high polynomial if it has more '|' than this, and as linear otherwise.
Defaults to 5.
"#,
            ),
        ];
        USAGES
    }
}
