/*!
Ad hoc benchmarking of patterns.

A [`Profiler`] runs each pattern it is given many times against a text,
records how long that took and ranks everything it has measured so far.
The numbers are wall clock times from a single thread, so they are only
meaningful relative to each other and only on the machine that produced
them.

The [`baseline`] module compares regex searches against plain string
methods, and [`cases`] builds inputs that tend to separate fast patterns
from slow ones.
*/

use std::{fmt::Write, hint::black_box, time::Duration};

use crate::{
    engine::{Compiled, Engine, Limits},
    error::Error,
    flags::Flags,
};

pub mod baseline;
pub mod cases;

/// The number of untimed searches run before measuring.
const WARMUP: usize = 10;

/// Time an arbitrary operation.
pub(crate) fn timeit<T>(run: impl FnOnce() -> T) -> (T, Duration) {
    let start = std::time::Instant::now();
    let t = run();
    (t, start.elapsed())
}

/// Like [`timeit`], but for operations that can fail.
pub(crate) fn timeitr<T, E>(
    run: impl FnOnce() -> Result<T, E>,
) -> Result<(T, Duration), E> {
    let (result, time) = timeit(run);
    let t = result?;
    Ok((t, time))
}

/// How much slower `time` is than `fastest`, in percent.
pub(crate) fn percent_slower(time: Duration, fastest: Duration) -> f64 {
    let (time, fastest) = (time.as_secs_f64(), fastest.as_secs_f64());
    if time <= fastest {
        0.0
    } else if fastest == 0.0 {
        f64::INFINITY
    } else {
        (time / fastest - 1.0) * 100.0
    }
}

/// Guess how many steps a search of `pattern` over `text_len` bytes takes.
///
/// This is not an instruction count. The text length is scaled up for
/// constructs that tend to backtrack (`.*`, lazy `.*?`, repetition,
/// alternation, special groups) and scaled down for constructs that let an
/// engine give up early (anchors, negated classes).
pub fn estimate_steps(pattern: &str, text_len: usize) -> u64 {
    let mut steps = text_len as f64;
    if pattern.contains(".*") {
        steps *= 2.0;
    }
    if pattern.contains(".*?") {
        steps *= 1.5;
    }
    if pattern.contains('+') || pattern.contains('*') {
        steps *= 1.2;
    }
    if pattern.contains('|') {
        steps *= 1.3;
    }
    if pattern.contains("(?") {
        steps *= 1.5;
    }
    if pattern.starts_with('^') {
        steps *= 0.1;
    }
    if pattern.ends_with('$') {
        steps *= 0.5;
    }
    if pattern.contains("[^") {
        steps *= 0.8;
    }
    steps.round() as u64
}

/// The measurements taken for one profiled pattern.
#[derive(Clone, Debug)]
pub struct Profile {
    pub name: String,
    pub pattern: String,
    pub flags: Flags,
    pub engine: Engine,
    pub iterations: usize,
    /// How long one compilation of the pattern took.
    pub compile_time: Duration,
    /// How long all iterations took together.
    pub total_time: Duration,
    /// How many of the iterations found a match.
    pub matches: usize,
    pub estimated_steps: u64,
    pub text_length: usize,
}

impl Profile {
    /// The average time of a single search.
    pub fn avg_time(&self) -> Duration {
        // Never zero, enforced by `Profiler::profile`.
        let n = u32::try_from(self.iterations).unwrap_or(u32::MAX);
        self.total_time / n
    }

    pub fn compile_ms(&self) -> f64 {
        self.compile_time.as_secs_f64() * 1000.0
    }

    pub fn total_ms(&self) -> f64 {
        self.total_time.as_secs_f64() * 1000.0
    }

    pub fn avg_ms(&self) -> f64 {
        self.avg_time().as_secs_f64() * 1000.0
    }

    /// Searches per second, rounded. Saturates when a search was too fast
    /// to measure.
    pub fn ops_per_sec(&self) -> u64 {
        (1.0 / self.avg_time().as_secs_f64()).round() as u64
    }
}

/// A profile's place in a ranking produced by [`Profiler::compare`].
#[derive(Clone, Debug)]
pub struct Comparison<'p> {
    pub profile: &'p Profile,
    /// 1 for the fastest.
    pub rank: usize,
    pub is_fastest: bool,
    pub is_slowest: bool,
    /// How much slower this is than the fastest, in percent.
    pub percent_slower: f64,
}

/// Collects timings for a sequence of patterns.
///
/// Each profiler owns its results. Nothing is shared between instances.
#[derive(Clone, Debug, Default)]
pub struct Profiler {
    engine: Engine,
    limits: Limits,
    results: Vec<Profile>,
}

impl Profiler {
    pub fn new() -> Profiler {
        Profiler::default()
    }

    pub fn engine(mut self, engine: Engine) -> Profiler {
        self.engine = engine;
        self
    }

    pub fn limits(mut self, limits: Limits) -> Profiler {
        self.limits = limits;
        self
    }

    /// Time `iterations` boolean searches of `pattern` over `text` and add
    /// the result under `name`.
    ///
    /// A few untimed searches run first. Compilation is timed separately
    /// from searching, by compiling the pattern a second time.
    pub fn profile(
        &mut self,
        name: &str,
        pattern: &str,
        flags: &str,
        text: &str,
        iterations: usize,
    ) -> Result<&mut Profiler, Error> {
        if iterations == 0 {
            return Err(Error::input("iterations must be greater than zero"));
        }
        let flags: Flags = flags.parse()?;
        let re = Compiled::new(pattern, flags, self.engine, &self.limits)?;
        for _ in 0..WARMUP {
            black_box(re.is_match(black_box(text))?);
        }
        let (_, compile_time) = timeitr(|| {
            Compiled::new(pattern, flags, self.engine, &self.limits)
        })?;
        let (matches, total_time) = timeitr(|| {
            let mut matches = 0;
            for _ in 0..iterations {
                if re.is_match(black_box(text))? {
                    matches += 1;
                }
            }
            Ok::<usize, Error>(matches)
        })?;
        let profile = Profile {
            name: name.to_string(),
            pattern: pattern.to_string(),
            flags,
            engine: self.engine,
            iterations,
            compile_time,
            total_time,
            matches,
            estimated_steps: estimate_steps(pattern, text.len()),
            text_length: text.len(),
        };
        log::debug!(
            "profiled {} (/{}/{}): {} iterations, avg {:?}",
            profile.name,
            profile.pattern,
            profile.flags,
            iterations,
            profile.avg_time(),
        );
        self.results.push(profile);
        Ok(self)
    }

    /// Everything profiled so far, in the order it was profiled.
    pub fn results(&self) -> &[Profile] {
        &self.results
    }

    /// Rank everything profiled so far by average time, fastest first.
    /// Ties keep the order in which they were profiled.
    pub fn compare(&self) -> Vec<Comparison<'_>> {
        let mut sorted: Vec<&Profile> = self.results.iter().collect();
        sorted.sort_by_key(|p| p.avg_time());
        let Some(fastest) = sorted.first().map(|p| p.avg_time()) else {
            return vec![];
        };
        let last = sorted.len() - 1;
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, profile)| Comparison {
                profile,
                rank: i + 1,
                is_fastest: i == 0,
                is_slowest: i == last,
                percent_slower: if i == 0 {
                    0.0
                } else {
                    percent_slower(profile.avg_time(), fastest)
                },
            })
            .collect()
    }

    /// A human readable ranking of everything profiled so far.
    pub fn report(&self) -> String {
        let ranked = self.compare();
        if ranked.is_empty() {
            return "No results to report".to_string();
        }
        let mut report = String::new();
        self.write_report(&mut report, &ranked)
            .expect("writing to a String never fails");
        report
    }

    fn write_report(
        &self,
        out: &mut String,
        ranked: &[Comparison<'_>],
    ) -> std::fmt::Result {
        writeln!(out, "regex performance report")?;
        writeln!(out, "{}", "=".repeat(50))?;
        for cmp in ranked.iter() {
            let p = cmp.profile;
            let marker = if cmp.is_fastest {
                " (fastest)"
            } else if cmp.is_slowest {
                " (slowest)"
            } else {
                ""
            };
            writeln!(out)?;
            writeln!(out, "#{} {}{}", cmp.rank, p.name, marker)?;
            let flags = p.flags.to_string();
            let flags = if flags.is_empty() { "none" } else { flags.as_str() };
            writeln!(out, "    pattern: /{}/ flags: {}", p.pattern, flags)?;
            writeln!(out, "    engine: {}", p.engine)?;
            writeln!(out, "    avg time: {:.4}ms", p.avg_ms())?;
            writeln!(out, "    compile time: {:.4}ms", p.compile_ms())?;
            writeln!(out, "    ops/sec: {}", p.ops_per_sec())?;
            writeln!(out, "    est. steps: {}", p.estimated_steps)?;
            if !cmp.is_fastest {
                writeln!(
                    out,
                    "    {:.1}% slower than fastest",
                    cmp.percent_slower
                )?;
            }
        }
        Ok(())
    }

    /// Forget everything profiled so far.
    pub fn clear(&mut self) -> &mut Profiler {
        self.results.clear();
        self
    }
}
