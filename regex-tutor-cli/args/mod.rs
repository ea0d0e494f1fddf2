use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
};

pub mod common;
pub mod danger;
pub mod engine;
pub mod haystack;
pub mod patterns;

/// A group of related command line flags.
///
/// Each command builds the configs it needs and hands them to `configure`,
/// which offers every argument to each config in turn until one of them
/// claims it.
pub trait Configurable: Debug {
    /// Consume `arg` (and its value, if any, from `p`). Returns false if
    /// this config doesn't recognize the argument.
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    fn usage(&self) -> &[Usage];
}

/// Parse all remaining arguments into `targets`.
///
/// `-h` and `--help` turn `usage` into an error with `%options%` replaced
/// by the short or long docs of every target's flags.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    while let Some(arg) = p.next()? {
        if matches!(arg, Arg::Short('h') | Arg::Long("help")) {
            let mut usages: Vec<Usage> = targets
                .iter()
                .flat_map(|t| t.usage().iter().copied())
                .collect();
            usages.sort_by_key(|u| {
                u.format
                    .split_once(", ")
                    .map(|(_, long)| long)
                    .unwrap_or(u.format)
            });
            let options = if arg == Arg::Short('h') {
                Usage::short(&usages)
            } else {
                Usage::long(&usages)
            };
            anyhow::bail!("{}", usage.replace("%options%", &options).trim());
        }
        // `arg` borrows from `p`, which the targets need mutably. Copying
        // the long flag name out breaks that borrow.
        let long: Option<String> = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match (long.as_deref(), arg) {
            (Some(name), _) => Arg::Long(name),
            (None, Arg::Short(c)) => Arg::Short(c),
            (None, Arg::Value(value)) => Arg::Value(value),
            (None, Arg::Long(_)) => unreachable!(),
        };
        let mut recognized = false;
        for t in targets.iter_mut() {
            if t.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}

/// Read the next argument as a sub-command name. A missing command, `-h` or
/// `--help` all turn `usage` into an error.
pub fn next_as_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    let usage = usage.trim();
    let arg = match p.next()? {
        Some(arg) => arg,
        None => anyhow::bail!("{usage}"),
    };
    match arg {
        Arg::Value(cmd) => Ok(cmd.string()?),
        Arg::Short('h') | Arg::Long("help") => anyhow::bail!("{usage}"),
        arg => Err(arg.unexpected().into()),
    }
}

/// Parse the value of `flag_name` into `T`. Errors mention the flag.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let value = next_value(p, flag_name)?;
    // Not every `FromStr::Err` implements `std::error::Error`, so go
    // through `msg`.
    value
        .parse()
        .map_err(|err| anyhow::Error::msg(err).context(flag_name))
}

/// Like `parse`, but the value `none` means there is no value. Used for
/// limits, where `none` means unlimited.
pub fn parse_maybe<T>(
    p: &mut Parser,
    flag_name: &'static str,
) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let value = next_value(p, flag_name)?;
    if value == "none" {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|err| anyhow::Error::msg(err).context(flag_name))
}

fn next_value(
    p: &mut Parser,
    flag_name: &'static str,
) -> anyhow::Result<String> {
    let osv = p.value().context(flag_name)?;
    match osv.into_string() {
        Ok(value) => Ok(value),
        Err(osv) => {
            let err = lexopt::Error::NonUnicodeValue(osv);
            Err(anyhow::Error::from(err).context(flag_name))
        }
    }
}

/// The documentation of one flag.
///
/// `Usage::short` and `Usage::long` lay out a list of these as the OPTIONS
/// section of a help message.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// How the flag is written, e.g., `-e, --engine <engine>`.
    pub format: &'static str,
    /// A one line description.
    pub short: &'static str,
    /// A longer description. Paragraphs are separated by blank lines.
    pub long: &'static str,
}

impl Usage {
    pub const fn new(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { format, short, long }
    }

    /// Two aligned columns: the format and the short description.
    pub fn short(usages: &[Usage]) -> String {
        const MIN_SPACE: usize = 2;

        let mut result = String::new();
        let Some(max_len) = usages.iter().map(|u| u.format.len()).max() else {
            return result;
        };
        for usage in usages.iter() {
            let padding = " ".repeat(MIN_SPACE + max_len - usage.format.len());
            writeln!(result, "    {}{}{}", usage.format, padding, usage.short)
                .unwrap();
        }
        result
    }

    /// Each format on its own line, followed by its long description
    /// wrapped and indented below it.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            writeln!(result, "    {}", usage.format).unwrap();
            for (i, paragraph) in usage.long.trim().split("\n\n").enumerate() {
                if i > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace('\n', " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }
}
