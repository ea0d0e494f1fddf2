/*!
Regex searches timed against the plain string methods that do the same job.

Literal searches and prefix or suffix checks rarely need a regex. These
comparisons show by how much a regex loses (or, now and then, wins).
*/

use std::{hint::black_box, time::Duration};

use crate::{
    engine::{Compiled, Engine, Limits},
    error::Error,
    flags::Flags,
};

use super::{percent_slower, timeit};

/// The time one method took for all iterations.
#[derive(Clone, Debug)]
pub struct Timing {
    pub method: String,
    pub time: Duration,
    /// How much slower this is than the fastest method, in percent.
    pub percent_slower: f64,
}

/// The result of timing several methods that answer the same question.
#[derive(Clone, Debug)]
pub struct Baseline {
    /// Timings in the order the methods were run.
    pub timings: Vec<Timing>,
}

impl Baseline {
    fn new(raw: Vec<(String, Duration)>) -> Baseline {
        let fastest =
            raw.iter().map(|&(_, time)| time).min().unwrap_or_default();
        let timings = raw
            .into_iter()
            .map(|(method, time)| Timing {
                method,
                time,
                percent_slower: percent_slower(time, fastest),
            })
            .collect();
        Baseline { timings }
    }

    /// The name of the fastest method. The first one run wins ties.
    pub fn winner(&self) -> &str {
        let mut best: Option<&Timing> = None;
        for t in self.timings.iter() {
            if best.map_or(true, |b| t.time < b.time) {
                best = Some(t);
            }
        }
        best.map_or("", |t| t.method.as_str())
    }

    /// Look up the timing of a method by name.
    pub fn get(&self, method: &str) -> Option<&Timing> {
        self.timings.iter().find(|t| t.method == method)
    }
}

fn time_n(iterations: usize, mut f: impl FnMut() -> bool) -> Duration {
    let ((), time) = timeit(|| {
        for _ in 0..iterations {
            black_box(f());
        }
    });
    time
}

fn time_regex(
    re: &Compiled,
    text: &str,
    iterations: usize,
) -> Result<Duration, Error> {
    // Surface limit errors before timing, so the loop can ignore them.
    re.is_match(text)?;
    Ok(time_n(iterations, || re.is_match(black_box(text)).unwrap_or(false)))
}

fn literal(
    pattern: &str,
    engine: Engine,
    limits: &Limits,
) -> Result<Compiled, Error> {
    Compiled::new(pattern, Flags::default(), engine, limits)
}

/// Time `str::contains` and `str::find` against a regex search for the
/// literal `needle` with every engine.
pub fn compare_substring_search(
    text: &str,
    needle: &str,
    iterations: usize,
) -> Result<Baseline, Error> {
    let limits = Limits::default();
    let escaped = regex::escape(needle);
    let mut raw = vec![
        (
            "contains".to_string(),
            time_n(iterations, || black_box(text).contains(needle)),
        ),
        (
            "find".to_string(),
            time_n(iterations, || black_box(text).find(needle).is_some()),
        ),
    ];
    for engine in Engine::ALL {
        let re = literal(&escaped, engine, &limits)?;
        raw.push((
            format!("regex-{}", engine),
            time_regex(&re, text, iterations)?,
        ));
    }
    Ok(Baseline::new(raw))
}

/// Time `str::starts_with` and `str::ends_with` against the equivalent
/// anchored regexes, using the given engine.
pub fn compare_anchors(
    text: &str,
    prefix: &str,
    suffix: &str,
    engine: Engine,
    iterations: usize,
) -> Result<Baseline, Error> {
    let limits = Limits::default();
    let start = format!("^{}", regex::escape(prefix));
    let start = literal(&start, engine, &limits)?;
    let end = format!("{}$", regex::escape(suffix));
    let end = literal(&end, engine, &limits)?;
    let raw = vec![
        (
            "starts-with".to_string(),
            time_n(iterations, || black_box(text).starts_with(prefix)),
        ),
        ("regex-start".to_string(), time_regex(&start, text, iterations)?),
        (
            "ends-with".to_string(),
            time_n(iterations, || black_box(text).ends_with(suffix)),
        ),
        ("regex-end".to_string(), time_regex(&end, text, iterations)?),
    ];
    Ok(Baseline::new(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_search_times_every_method() {
        let text = "this is a test of performance";
        let base = compare_substring_search(text, "test", 100).unwrap();
        let methods: Vec<&str> =
            base.timings.iter().map(|t| t.method.as_str()).collect();
        assert_eq!(
            vec![
                "contains",
                "find",
                "regex-fancy",
                "regex-regex",
                "regex-lite",
            ],
            methods,
        );
        let winner = base.get(base.winner()).unwrap();
        assert_eq!(0.0, winner.percent_slower);
        assert!(base.timings.iter().all(|t| t.percent_slower >= 0.0));
    }

    #[test]
    fn needles_are_literal() {
        // An unescaped needle would fail to compile.
        assert!(compare_substring_search("a(b", "(", 1).is_ok());
    }

    #[test]
    fn anchors() {
        let text = format!("target{}", "x".repeat(100));
        let base =
            compare_anchors(&text, "target", "xx", Engine::Regex, 50).unwrap();
        assert_eq!(4, base.timings.len());
        assert!(base.get("regex-end").is_some());
        assert!(!base.winner().is_empty());
    }
}
