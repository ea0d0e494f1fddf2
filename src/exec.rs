use crate::{
    engine::{Compiled, Engine, Limits, Span},
    error::Error,
    flags::Flags,
};

/// A single match found by the [`Executor`].
///
/// `index` and `length` are byte offsets into the subject text, so
/// `index + length <= text.len()` always holds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match {
    /// The matched substring.
    pub text: String,
    /// The byte offset at which the match starts.
    pub index: usize,
    /// The length of the match in bytes. Zero for an empty match.
    pub length: usize,
    /// Every capturing group, in order. A group that did not take part in
    /// the match is `None`, so positions are preserved.
    pub groups: Vec<Option<String>>,
}

impl Match {
    pub fn span(&self) -> Span {
        Span { start: self.index, end: self.index + self.length }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// The outcome of running a pattern over a text.
///
/// An execution never fails as a whole. When the pattern or its flags are
/// invalid, `matches` is empty and `error` says why. When a search ran into
/// a limit part way through, `matches` holds everything found before that.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Execution {
    pub matches: Vec<Match>,
    pub error: Option<Error>,
}

impl Execution {
    fn failed(err: Error) -> Execution {
        Execution { matches: vec![], error: Some(err) }
    }

    /// The number of matches found.
    pub fn count(&self) -> usize {
        self.matches.len()
    }

    /// Returns true when no error occurred.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The matched substrings, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.text.as_str())
    }
}

/// A pattern source plus the flags it should be compiled with.
///
/// Nothing is checked until [`Pattern::compile`] is called.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

impl Pattern {
    pub fn new(source: &str, flags: &str) -> Pattern {
        Pattern { source: source.to_string(), flags: flags.to_string() }
    }

    /// Parse the flags and compile the source with the given engine.
    pub fn compile(
        &self,
        engine: Engine,
        limits: &Limits,
    ) -> Result<Compiled, Error> {
        let flags: Flags = self.flags.parse()?;
        Compiled::new(&self.source, flags, engine, limits)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Runs patterns over text and collects every match.
///
/// The search is always global: after each match the search resumes where
/// that match ended. An empty match moves the cursor forward by one
/// character first, so the cursor strictly increases and every run
/// terminates, whatever the pattern.
#[derive(Clone, Debug, Default)]
pub struct Executor {
    engine: Engine,
    limits: Limits,
}

impl Executor {
    pub fn new() -> Executor {
        Executor::default()
    }

    pub fn engine(mut self, engine: Engine) -> Executor {
        self.engine = engine;
        self
    }

    pub fn limits(mut self, limits: Limits) -> Executor {
        self.limits = limits;
        self
    }

    pub fn backtrack_limit(mut self, limit: usize) -> Executor {
        self.limits.backtrack_limit = limit;
        self
    }

    pub fn size_limit(mut self, limit: usize) -> Executor {
        self.limits.size_limit = limit;
        self
    }

    pub fn get_engine(&self) -> Engine {
        self.engine
    }

    pub fn get_limits(&self) -> &Limits {
        &self.limits
    }

    /// Compile `pattern` with `flags` and collect all of its matches in
    /// `text`. The `g` flag is implied.
    pub fn execute(
        &self,
        pattern: &str,
        text: &str,
        flags: &str,
    ) -> Execution {
        let flags = match flags.parse::<Flags>() {
            Ok(flags) => flags.with_global(),
            Err(err) => return Execution::failed(err),
        };
        let re = match Compiled::new(pattern, flags, self.engine, &self.limits)
        {
            Ok(re) => re,
            Err(err) => return Execution::failed(err),
        };
        let exec = self.execute_compiled(&re, text);
        log::debug!(
            "/{}/{} found {} matches in {} bytes ({} engine){}",
            pattern,
            flags,
            exec.count(),
            text.len(),
            self.engine,
            exec.error.as_ref().map_or(String::new(), |e| format!(": {e}")),
        );
        exec
    }

    /// Collect all matches of an already compiled pattern in `text`.
    pub fn execute_compiled(&self, re: &Compiled, text: &str) -> Execution {
        let sticky = re.flags().sticky;
        let mut exec = Execution::default();
        let mut at = 0;
        while at <= text.len() {
            let groups = match re.captures_at(text, at) {
                Ok(Some(groups)) => groups,
                Ok(None) => break,
                Err(err) => {
                    log::warn!(
                        "search for /{}/ stopped at offset {}: {}",
                        re.source(),
                        at,
                        err,
                    );
                    exec.error = Some(err);
                    break;
                }
            };
            // Group 0 always participates in a match.
            let Some(whole) = groups[0] else { break };
            if sticky && whole.start != at {
                break;
            }
            exec.matches.push(Match {
                text: text[whole.range()].to_string(),
                index: whole.start,
                length: whole.len(),
                groups: groups[1..]
                    .iter()
                    .map(|g| g.map(|sp| text[sp.range()].to_string()))
                    .collect(),
            });
            at = if whole.is_empty() {
                next_char_boundary(text, whole.end)
            } else {
                whole.end
            };
        }
        exec
    }
}

/// Collect all matches of `pattern` in `text` with the default executor.
pub fn execute(pattern: &str, text: &str, flags: &str) -> Execution {
    Executor::new().execute(pattern, text, flags)
}

/// Returns the offset just past the character starting at `at`. At the end
/// of `text`, this returns `text.len() + 1`, which ends the search.
fn next_char_boundary(text: &str, at: usize) -> usize {
    match text[at..].chars().next() {
        Some(ch) => at + ch.len_utf8(),
        None => at + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn indices(exec: &Execution) -> Vec<usize> {
        exec.matches.iter().map(|m| m.index).collect()
    }

    #[test]
    fn counts_every_match() {
        let exec = execute(r"c.t", "cat cot cut c7t cit c@t", "");
        assert!(exec.is_ok());
        assert_eq!(
            vec!["cat", "cot", "cut", "c7t", "cit", "c@t"],
            exec.texts().collect::<Vec<_>>(),
        );
        assert_eq!(vec![0, 4, 8, 12, 16, 20], indices(&exec));
    }

    #[test]
    fn empty_matches_advance_one_char() {
        let exec = execute(r"\d*", "a1b2", "g");
        assert_eq!(vec![0, 1, 2, 3, 4], indices(&exec));
        assert_eq!(
            vec!["", "1", "", "2", ""],
            exec.texts().collect::<Vec<_>>(),
        );
    }

    #[test]
    fn empty_pattern_matches_between_every_char() {
        let exec = execute(r"(?:)", "héllo", "");
        // One match per character boundary, in bytes.
        assert_eq!(vec![0, 1, 3, 4, 5, 6], indices(&exec));
        assert!(exec.matches.iter().all(|m| m.is_empty()));
    }

    #[test]
    fn word_boundaries_terminate() {
        let exec = execute(r"\b", "hi there", "g");
        assert_eq!(vec![0, 2, 3, 8], indices(&exec));
    }

    #[test]
    fn groups_keep_their_positions() {
        let exec = execute(r"(a)|(b)", "ab", "");
        assert_eq!(2, exec.count());
        assert_eq!(vec![Some("a".to_string()), None], exec.matches[0].groups);
        assert_eq!(vec![None, Some("b".to_string())], exec.matches[1].groups);
    }

    #[test]
    fn sticky_stops_at_first_gap() {
        let exec = execute(r"\d", "12a3", "y");
        assert_eq!(vec!["1", "2"], exec.texts().collect::<Vec<_>>());
    }

    #[test]
    fn bad_pattern_is_an_error_not_a_panic() {
        let exec = execute(r"(unclosed", "text", "g");
        assert_eq!(0, exec.count());
        assert_eq!(ErrorKind::Syntax, exec.error.unwrap().kind());
    }

    #[test]
    fn bad_flags_are_an_error() {
        let exec = execute(r"a", "a", "gq");
        assert_eq!(0, exec.count());
        assert_eq!(ErrorKind::Flags, exec.error.unwrap().kind());
    }

    #[test]
    fn engines_agree_on_simple_patterns() {
        let text = "I have 3 cats, 5 dogs and 12 fish";
        for engine in Engine::ALL {
            let exec =
                Executor::new().engine(engine).execute(r"\d+", text, "");
            assert_eq!(vec![7, 15, 26], indices(&exec), "{engine}");
        }
    }

    #[test]
    fn pattern_value_compiles_lazily() {
        let pat = Pattern::new(r"[", "g");
        assert_eq!("/[/g", pat.to_string());
        let err = pat.compile(Engine::default(), &Limits::default());
        assert_eq!(ErrorKind::Syntax, err.unwrap_err().kind());
    }
}
