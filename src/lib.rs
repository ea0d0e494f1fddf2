/*!
This crate provides the pattern checking machinery behind an interactive
regular expression tutorial.

It has four parts:

* A match executor that runs a pattern over a text with JavaScript style
  flags and collects every match, including empty ones, without ever
  getting stuck. See [`Executor`] and [`execute`].
* A lesson verifier that checks each step of a lesson produces the number of
  matches it claims to. Lessons are loaded from TOML files. See [`Lessons`]
  and [`Verifier`].
* A danger analyzer that looks at the source text of a pattern and flags
  constructs known to cause catastrophic backtracking, with suggested
  rewrites. See [`danger::analyze`].
* A profiler that times patterns against each other. See
  [`profile::Profiler`].

The [`guard`] module runs searches under a deadline.

# Example

Count the matches of a pattern:

```
let exec = regex_tutor::execute(r"c.t", "cat cot cut c7t cit c@t", "");
assert_eq!(6, exec.count());
assert_eq!(Some("c7t"), exec.texts().nth(3));
```

Verify a lesson:

```
use regex_tutor::{Lessons, Verifier};

let mut lessons = Lessons::new();
lessons.load_slice("digits", br#"
title = "Digits"

[[step]]
pattern = '\d+'
text = "I have 3 cats, 5 dogs and 12 fish"
expected-matches = 3
"#)?;
let suite = Verifier::new().test_lessons(&lessons);
assert!(suite.passed(), "{}", suite);
# Ok::<(), anyhow::Error>(())
```

Analyze a pattern for ReDoS risk:

```
use regex_tutor::danger::{self, DangerLevel, IssueKind};

let analysis = danger::analyze("(a+)+b");
assert_eq!(DangerLevel::Critical, analysis.level);
assert!(analysis.has(IssueKind::NestedQuantifiers));
assert_eq!("a+b", analysis.suggestions[0].suggested);
```

# Engines

Lesson patterns use lookaround and backreferences, so the default engine is
a backtracking one. The linear time engines from the `regex` and
`regex-lite` crates can be selected with [`Engine`]. Offsets reported by
every engine are byte offsets into the text.
*/

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

pub use crate::{
    engine::{Compiled, Engine, Limits, Span},
    error::{Error, ErrorKind},
    exec::{execute, Execution, Executor, Match, Pattern},
    flags::Flags,
    lesson::{Difficulty, Lesson, Lessons, Step},
    verify::{LessonResult, StepResult, SuiteResult, Verifier},
};

pub mod danger;
mod engine;
mod error;
mod exec;
mod flags;
pub mod guard;
mod lesson;
pub mod profile;
mod verify;
