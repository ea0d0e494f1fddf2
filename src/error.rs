/// An error that occurred while compiling or running a pattern.
///
/// Errors of this type never describe a programming mistake by the caller.
/// Almost all of them describe bad input: a pattern that doesn't parse, a
/// flag string that doesn't make sense, or a search that ran into one of the
/// limits that keep execution bounded. The exception is
/// [`ErrorKind::Worker`], which means the operating system refused to run a
/// guarded search at all.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
}

/// The kind of an [`Error`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The pattern could not be compiled by the selected engine.
    Syntax,
    /// The flag string contained an unknown or repeated flag.
    Flags,
    /// A search exceeded a configured limit, e.g., the backtrack limit.
    Limit,
    /// A search did not finish before its deadline.
    Timeout,
    /// An argument was out of range, e.g., zero profiling iterations.
    Input,
    /// The thread that runs a guarded search could not be started or
    /// stopped without reporting back.
    Worker,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Error {
        Error { kind, msg: msg.into() }
    }

    pub(crate) fn syntax(msg: impl Into<String>) -> Error {
        Error::new(ErrorKind::Syntax, msg)
    }

    pub(crate) fn flags(msg: impl Into<String>) -> Error {
        Error::new(ErrorKind::Flags, msg)
    }

    pub(crate) fn input(msg: impl Into<String>) -> Error {
        Error::new(ErrorKind::Input, msg)
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the diagnostic message, without any kind prefix.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Converts an error reported by the backtracking engine. Errors raised
    /// while searching are limit violations; everything else happens while
    /// parsing or compiling.
    pub(crate) fn from_fancy(err: fancy_regex::Error) -> Error {
        let kind = match err {
            fancy_regex::Error::RuntimeError(_) => ErrorKind::Limit,
            _ => ErrorKind::Syntax,
        };
        Error::new(kind, err.to_string())
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}
