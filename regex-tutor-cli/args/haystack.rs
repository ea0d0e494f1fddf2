use std::{io::Read, path::PathBuf};

use {
    anyhow::Context,
    bstr::{ByteSlice, ByteVec},
    lexopt::{Arg, Parser, ValueExt},
};

use crate::args::{Configurable, Usage};

/// Where the text to search comes from: inline with `-y/--haystack`, a file
/// path given as a positional argument, or stdin when that path is `-`.
///
/// Exactly one haystack is permitted, and it must be valid UTF-8.
#[derive(Debug, Default)]
pub struct Config {
    kind: Option<Kind>,
}

impl Config {
    /// Pass the haystack to `f`. Files are memory mapped instead of read
    /// onto the heap.
    pub fn with<T>(
        &self,
        mut f: impl FnMut(&str) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        match self.kind {
            Some(Kind::Inline(ref haystack)) => f(haystack.as_str()),
            Some(Kind::Path(ref path)) => {
                let file = std::fs::File::open(path).with_context(|| {
                    format!("failed to open {}", path.display())
                })?;
                // SAFETY: The mapping is only ever read, and we assume the
                // file isn't modified while we search it.
                let mmap = unsafe {
                    memmap2::Mmap::map(&file).with_context(|| {
                        format!("failed to mmap {}", path.display())
                    })?
                };
                let haystack = mmap.to_str().with_context(|| {
                    format!("{} is not valid UTF-8", path.display())
                })?;
                f(haystack)
            }
            Some(Kind::Stdin) => {
                let mut haystack = String::new();
                std::io::stdin()
                    .read_to_string(&mut haystack)
                    .context("failed to read haystack from stdin")?;
                f(&haystack)
            }
            None => anyhow::bail!(
                "haystack is required via the -y/--haystack flag \
                 or via a positional argument",
            ),
        }
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('y') | Arg::Long("haystack") => {
                anyhow::ensure!(
                    self.kind.is_none(),
                    "only one haystack is allowed",
                );
                let hay = p.value().context("-y/--haystack needs a value")?;
                let hay = hay
                    .string()
                    .context("-y/--haystack must be valid UTF-8")?;
                let hay = String::from_utf8(Vec::unescape_bytes(&hay))
                    .context("-y/--haystack must unescape to valid UTF-8")?;
                self.kind = Some(Kind::Inline(hay));
            }
            Arg::Value(ref mut v) => {
                anyhow::ensure!(
                    self.kind.is_none(),
                    "only one haystack is allowed",
                );
                let v = std::mem::take(v);
                self.kind = Some(if v == "-" {
                    Kind::Stdin
                } else {
                    Kind::Path(PathBuf::from(v))
                });
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[Usage::new(
            "-y, --haystack <haystack>",
            "Provide an inline haystack on the command line.",
            r#"
The value of this flag is the text to search itself, not a file path. It
supports escape sequences, so "-y 'a\tb\n'" is an 'a', a tab, a 'b' and a
newline. After unescaping, the haystack must be valid UTF-8.

Instead of this flag, a file path can be given as a positional argument. The
path '-' reads the haystack from stdin.
"#,
        )];
        USAGES
    }
}

#[derive(Debug)]
enum Kind {
    Inline(String),
    Path(PathBuf),
    Stdin,
}
