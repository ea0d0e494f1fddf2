use lexopt::{Arg, Parser};

use crate::args::{Configurable, Usage};

/// Output knobs shared by every command.
#[derive(Debug, Default)]
pub struct Config {
    pub quiet: bool,
    pub no_table: bool,
}

impl Config {
    pub fn table(&self) -> bool {
        !self.no_table
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('q') | Arg::Long("quiet") => {
                self.quiet = true;
            }
            Arg::Long("no-table") => {
                self.no_table = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-q, --quiet",
                "Suppress some output.",
                r#"
Suppresses the main output of a command, such as the list of matches printed
by 'regex-tutor find'. Tables and reports that summarize the run are still
printed unless they are turned off separately.
"#,
            ),
            Usage::new(
                "--no-table",
                "Omit the table of timings and counts.",
                r#"
Most commands print a small table with timings and counts before their main
output. Passing this flag suppresses that table.
"#,
            ),
        ];
        USAGES
    }
}
