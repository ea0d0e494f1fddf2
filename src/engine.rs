use crate::{error::Error, flags::Flags};

/// The regex engine used to compile and run a pattern.
///
/// Lesson patterns are written for a backtracking engine, so the default
/// is [`Engine::Fancy`], the only engine here that supports lookaround and
/// backreferences. The other two only accept patterns without those
/// features, but guarantee search time linear in the haystack.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Engine {
    /// A backtracking engine (`fancy-regex`) that delegates to the `regex`
    /// crate for every sub-expression that doesn't need backtracking.
    #[default]
    Fancy,
    /// The `regex` crate's finite automata based engine.
    Regex,
    /// The `regex-lite` engine, small and slow but still linear time.
    Lite,
}

impl Engine {
    /// All engines, in the order they are usually listed.
    pub const ALL: [Engine; 3] = [Engine::Fancy, Engine::Regex, Engine::Lite];

    /// The name of this engine as accepted by `FromStr`.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Engine::Fancy => "fancy",
            Engine::Regex => "regex",
            Engine::Lite => "lite",
        }
    }

    /// Whether this engine may backtrack, and therefore whether its search
    /// time can blow up on a hostile haystack.
    pub fn backtracks(&self) -> bool {
        matches!(*self, Engine::Fancy)
    }
}

impl std::str::FromStr for Engine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Engine, Error> {
        let engine = match s {
            "fancy" => Engine::Fancy,
            "regex" => Engine::Regex,
            "lite" => Engine::Lite,
            unk => {
                return Err(Error::input(format!(
                    "unrecognized engine '{unk}' \
                     (expected one of: fancy, regex, lite)"
                )))
            }
        };
        Ok(engine)
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Limits applied when building and running a compiled pattern.
///
/// These are what keep every execution bounded. The linear time engines
/// can't run away on their own, and the backtracking engine gives up with a
/// [`ErrorKind::Limit`](crate::ErrorKind::Limit) error once it has
/// backtracked `backtrack_limit` times.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    /// Approximate limit, in bytes, on the size of a compiled pattern.
    pub size_limit: usize,
    /// How many times the backtracking engine may backtrack in one search.
    pub backtrack_limit: usize,
}

impl Default for Limits {
    fn default() -> Limits {
        // Large enough for counted repetitions of Unicode classes, like
        // `(\w+\s?){1,100}`, which blow through the `regex` default.
        Limits { size_limit: 64 * (1 << 20), backtrack_limit: 1_000_000 }
    }
}

/// A half open range of byte offsets into a haystack.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Span {
        Span { start, end }
    }
}

/// A pattern compiled for one particular engine.
#[derive(Clone, Debug)]
pub struct Compiled {
    source: String,
    flags: Flags,
    imp: Imp,
}

#[derive(Clone, Debug)]
enum Imp {
    Fancy(fancy_regex::Regex),
    Regex(regex::Regex),
    Lite(regex_lite::Regex),
}

impl Compiled {
    /// Compile `pattern` with `flags` for the given engine.
    ///
    /// Only the case, line and dot flags influence compilation. The others
    /// change how a search is driven and are the executor's business.
    pub fn new(
        pattern: &str,
        flags: Flags,
        engine: Engine,
        limits: &Limits,
    ) -> Result<Compiled, Error> {
        let imp = match engine {
            Engine::Fancy => {
                // fancy-regex only exposes case insensitivity on its
                // builder, so all mode flags go in as an inline group.
                let full = format!("{}{}", flags.inline_prefix(), pattern);
                let re = fancy_regex::RegexBuilder::new(&full)
                    .backtrack_limit(limits.backtrack_limit)
                    .delegate_size_limit(limits.size_limit)
                    .build()
                    .map_err(Error::from_fancy)?;
                Imp::Fancy(re)
            }
            Engine::Regex => {
                let re = regex::RegexBuilder::new(pattern)
                    .case_insensitive(flags.ignore_case)
                    .multi_line(flags.multi_line)
                    .dot_matches_new_line(flags.dot_all)
                    .size_limit(limits.size_limit)
                    .build()
                    .map_err(|err| Error::syntax(err.to_string()))?;
                Imp::Regex(re)
            }
            Engine::Lite => {
                let re = regex_lite::RegexBuilder::new(pattern)
                    .case_insensitive(flags.ignore_case)
                    .multi_line(flags.multi_line)
                    .dot_matches_new_line(flags.dot_all)
                    .size_limit(limits.size_limit)
                    .build()
                    .map_err(|err| Error::syntax(err.to_string()))?;
                Imp::Lite(re)
            }
        };
        log::debug!(
            "compiled /{}/{} with the {} engine",
            pattern,
            flags,
            engine,
        );
        Ok(Compiled { source: pattern.to_string(), flags, imp })
    }

    /// The pattern as given, without any inline flag group.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn engine(&self) -> Engine {
        match self.imp {
            Imp::Fancy(_) => Engine::Fancy,
            Imp::Regex(_) => Engine::Regex,
            Imp::Lite(_) => Engine::Lite,
        }
    }

    /// Returns true if this pattern matches anywhere in `text`. With the
    /// sticky flag, the match must start at the beginning of `text`.
    pub fn is_match(&self, text: &str) -> Result<bool, Error> {
        if self.flags.sticky {
            let groups = self.captures_at(text, 0)?;
            return Ok(groups
                .and_then(|groups| groups[0])
                .map_or(false, |whole| whole.start == 0));
        }
        match self.imp {
            Imp::Fancy(ref re) => re.is_match(text).map_err(Error::from_fancy),
            Imp::Regex(ref re) => Ok(re.is_match(text)),
            Imp::Lite(ref re) => Ok(re.is_match(text)),
        }
    }

    /// Search for the leftmost match starting at or after `start`, and
    /// return the span of every group in it. Index `0` is the overall
    /// match. Groups that did not participate are `None`.
    ///
    /// Text before `start` is still visible to look-behind and to
    /// assertions like `\b` and `^`.
    pub fn captures_at(
        &self,
        text: &str,
        start: usize,
    ) -> Result<Option<Vec<Option<Span>>>, Error> {
        match self.imp {
            Imp::Fancy(ref re) => {
                let caps = match re
                    .captures_from_pos(text, start)
                    .map_err(Error::from_fancy)?
                {
                    None => return Ok(None),
                    Some(caps) => caps,
                };
                let groups = (0..caps.len())
                    .map(|i| {
                        caps.get(i)
                            .map(|m| Span { start: m.start(), end: m.end() })
                    })
                    .collect();
                Ok(Some(groups))
            }
            Imp::Regex(ref re) => {
                let mut locs = re.capture_locations();
                if re.captures_read_at(&mut locs, text, start).is_none() {
                    return Ok(None);
                }
                let groups = (0..locs.len())
                    .map(|i| locs.get(i).map(Span::from))
                    .collect();
                Ok(Some(groups))
            }
            Imp::Lite(ref re) => {
                let mut locs = re.capture_locations();
                if re.captures_read_at(&mut locs, text, start).is_none() {
                    return Ok(None);
                }
                let groups = (0..locs.len())
                    .map(|i| locs.get(i).map(Span::from))
                    .collect();
                Ok(Some(groups))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn compile(pattern: &str, flags: &str, engine: Engine) -> Compiled {
        let flags: Flags = flags.parse().unwrap();
        Compiled::new(pattern, flags, engine, &Limits::default()).unwrap()
    }

    #[test]
    fn engine_names_round_trip() {
        for engine in Engine::ALL {
            assert_eq!(engine, engine.as_str().parse().unwrap());
        }
        assert!("pcre".parse::<Engine>().is_err());
    }

    #[test]
    fn flags_apply_to_every_engine() {
        for engine in Engine::ALL {
            let re = compile("^cat.dog$", "ims", engine);
            assert!(re.is_match("x\nCAT\nDOG\ny").unwrap(), "{engine}");
        }
    }

    #[test]
    fn sticky_is_match_is_anchored_at_zero() {
        for engine in Engine::ALL {
            let re = compile("b", "y", engine);
            assert!(!re.is_match("ab").unwrap(), "{engine}");
            assert!(re.is_match("ba").unwrap(), "{engine}");
            assert!(compile("b", "", engine).is_match("ab").unwrap());
        }
    }

    #[test]
    fn lookaround_only_compiles_with_fancy() {
        let flags = Flags::default();
        let limits = Limits::default();
        assert!(Compiled::new(r"\d+(?=€)", flags, Engine::Fancy, &limits)
            .is_ok());
        assert!(Engine::Fancy.backtracks());
        for engine in [Engine::Regex, Engine::Lite] {
            assert!(!engine.backtracks(), "{engine}");
            let err = Compiled::new(r"\d+(?=€)", flags, engine, &limits)
                .unwrap_err();
            assert_eq!(ErrorKind::Syntax, err.kind());
        }
    }

    #[test]
    fn captures_at_respects_context_before_start() {
        let re = compile(r"\bcat", "", Engine::Fancy);
        // Position 3 is inside "bobcat", so there is no word boundary.
        assert_eq!(None, re.captures_at("bobcat", 3).unwrap());
        let groups = re.captures_at("a cat", 1).unwrap().unwrap();
        assert_eq!(Some(Span { start: 2, end: 5 }), groups[0]);
    }

    #[test]
    fn unmatched_groups_are_none() {
        for engine in Engine::ALL {
            let re = compile(r"(a)|(b)", "", engine);
            let groups = re.captures_at("b", 0).unwrap().unwrap();
            assert_eq!(3, groups.len());
            assert_eq!(None, groups[1]);
            assert_eq!(Some(Span { start: 0, end: 1 }), groups[2]);
        }
    }

    #[test]
    fn backtrack_limit_is_a_limit_error() {
        let limits = Limits { backtrack_limit: 1_000, ..Limits::default() };
        // The backreference forces the backtracking VM for the whole
        // pattern.
        let re = Compiled::new(
            r"(a+)+\1b",
            Flags::default(),
            Engine::Fancy,
            &limits,
        )
        .unwrap();
        let err = re.is_match(&"a".repeat(30)).unwrap_err();
        assert_eq!(ErrorKind::Limit, err.kind());
    }
}
