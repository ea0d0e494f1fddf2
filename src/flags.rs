use crate::error::Error;

/// A set of JavaScript style regex flags, e.g., `gi` or `gms`.
///
/// Lesson data specifies flags the way a browser would accept them, so this
/// parses the same alphabet. Every letter may appear at most once. An unknown
/// or repeated letter is an error.
///
/// | flag | meaning |
/// |------|---------|
/// | `d`  | report match indices (accepted, always on here) |
/// | `g`  | find all matches instead of just the first |
/// | `i`  | case insensitive matching |
/// | `m`  | `^` and `$` match at line boundaries |
/// | `s`  | `.` matches `\n` |
/// | `u`  | Unicode mode (accepted, always on here) |
/// | `y`  | sticky, every match must start where the last one ended |
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Flags {
    pub has_indices: bool,
    pub global: bool,
    pub ignore_case: bool,
    pub multi_line: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub sticky: bool,
}

impl Flags {
    /// The flags used for a lesson step that doesn't specify any.
    pub fn lesson_default() -> Flags {
        Flags { global: true, ..Flags::default() }
    }

    /// Returns a copy of these flags with `g` set.
    pub fn with_global(self) -> Flags {
        Flags { global: true, ..self }
    }

    /// Returns the inline flag group (e.g., `(?ims)`) equivalent to the
    /// case, line and dot settings in these flags. When none of them are
    /// enabled, the empty string is returned.
    pub(crate) fn inline_prefix(&self) -> String {
        let mut group = String::new();
        if self.ignore_case {
            group.push('i');
        }
        if self.multi_line {
            group.push('m');
        }
        if self.dot_all {
            group.push('s');
        }
        if group.is_empty() {
            group
        } else {
            format!("(?{group})")
        }
    }
}

impl std::str::FromStr for Flags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Flags, Error> {
        let mut flags = Flags::default();
        for ch in s.chars() {
            let slot = match ch {
                'd' => &mut flags.has_indices,
                'g' => &mut flags.global,
                'i' => &mut flags.ignore_case,
                'm' => &mut flags.multi_line,
                's' => &mut flags.dot_all,
                'u' => &mut flags.unicode,
                'y' => &mut flags.sticky,
                unk => {
                    return Err(Error::flags(format!(
                        "invalid flags '{s}': unrecognized flag '{unk}'"
                    )))
                }
            };
            if *slot {
                return Err(Error::flags(format!(
                    "invalid flags '{s}': duplicate flag '{ch}'"
                )));
            }
            *slot = true;
        }
        Ok(flags)
    }
}

impl std::fmt::Display for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let letters = [
            (self.has_indices, 'd'),
            (self.global, 'g'),
            (self.ignore_case, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
            (self.unicode, 'u'),
            (self.sticky, 'y'),
        ];
        for (enabled, letter) in letters {
            if enabled {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}
