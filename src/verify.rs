use std::fmt::Write;

use crate::{
    error::Error,
    exec::{Execution, Executor, Match},
    lesson::{Lesson, Step},
};

/// Checks lesson steps against their declared match counts.
///
/// Every step and every lesson is evaluated, even after a failure, so that
/// a report always covers everything that was asked for.
#[derive(Clone, Debug, Default)]
pub struct Verifier {
    executor: Executor,
}

impl Verifier {
    pub fn new() -> Verifier {
        Verifier::default()
    }

    /// Use the given executor, e.g., to pick a different engine.
    pub fn executor(mut self, executor: Executor) -> Verifier {
        self.executor = executor;
        self
    }

    /// Run a single step. The step passes when the pattern compiles, the
    /// search finishes and the number of matches equals the expected count.
    pub fn test_step(&self, step: &Step) -> StepResult {
        self.test_step_at(0, step)
    }

    fn test_step_at(&self, position: usize, step: &Step) -> StepResult {
        let pattern = step.to_pattern();
        let Execution { matches, error } = self.executor.execute(
            &pattern.source,
            step.text(),
            &pattern.flags,
        );
        // A step with an error never passes, even if the matches found
        // before a limit was hit happen to add up.
        let actual = matches.len();
        let passed = error.is_none() && actual == step.expected_matches();
        let result = StepResult {
            position,
            step_id: step.id().to_string(),
            full_name: step.full_name().to_string(),
            title: step.title().to_string(),
            expected: step.expected_matches(),
            actual,
            matches,
            passed,
            error,
            tips: step.tips().to_vec(),
        };
        if !result.passed {
            log::debug!(
                "step {} failed: {}",
                result.full_name,
                result.reason(),
            );
        }
        result
    }

    /// Run every step in a lesson.
    pub fn test_lesson(&self, lesson: &Lesson) -> LessonResult {
        let steps = lesson
            .steps()
            .iter()
            .enumerate()
            .map(|(i, step)| self.test_step_at(i, step))
            .collect();
        LessonResult {
            lesson_id: lesson.id().to_string(),
            title: lesson.title().to_string(),
            steps,
        }
    }

    /// Run every step of every lesson given.
    pub fn test_lessons<'a, I>(&self, lessons: I) -> SuiteResult
    where
        I: IntoIterator<Item = &'a Lesson>,
    {
        let lessons: Vec<LessonResult> =
            lessons.into_iter().map(|l| self.test_lesson(l)).collect();
        let suite = SuiteResult { lessons };
        log::debug!(
            "verified {} lessons, {} failed",
            suite.total_lessons(),
            suite.failed_lessons().count(),
        );
        suite
    }
}

/// The outcome of running one lesson step.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Zero based position of the step within its lesson.
    pub position: usize,
    pub step_id: String,
    pub full_name: String,
    pub title: String,
    pub expected: usize,
    pub actual: usize,
    pub matches: Vec<Match>,
    pub passed: bool,
    /// Set when the pattern didn't compile or the search hit a limit.
    pub error: Option<Error>,
    /// Hints from the lesson, shown when the step fails.
    pub tips: Vec<String>,
}

impl StepResult {
    /// A one line description of why this step failed. For a passing step,
    /// this is `ok`.
    pub fn reason(&self) -> String {
        match self.error {
            Some(ref err) => format!("error: {}", err),
            None if self.passed => "ok".to_string(),
            None => format!(
                "expected {} matches, but found {}",
                self.expected, self.actual,
            ),
        }
    }
}

/// The outcome of running every step in a lesson.
#[derive(Clone, Debug)]
pub struct LessonResult {
    pub lesson_id: String,
    pub title: String,
    pub steps: Vec<StepResult>,
}

impl LessonResult {
    /// A lesson passes when all of its steps pass.
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.passed)
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn passed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.passed).count()
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| !s.passed)
    }
}

/// The outcome of running a collection of lessons.
///
/// The `Display` impl renders a human readable report: the overall verdict,
/// then every lesson in order with each of its failing steps.
#[derive(Clone, Debug)]
pub struct SuiteResult {
    pub lessons: Vec<LessonResult>,
}

impl SuiteResult {
    /// The collection passes when every lesson passes.
    pub fn passed(&self) -> bool {
        self.lessons.iter().all(|l| l.passed())
    }

    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }

    pub fn passed_lessons(&self) -> usize {
        self.lessons.iter().filter(|l| l.passed()).count()
    }

    pub fn failed_lessons(&self) -> impl Iterator<Item = &LessonResult> {
        self.lessons.iter().filter(|l| !l.passed())
    }

    /// Every failing step across all lessons.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.lessons.iter().flat_map(|l| l.failed_steps())
    }
}

impl std::fmt::Display for SuiteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "lesson verification report")?;
        writeln!(f, "==========================")?;
        if self.passed() {
            writeln!(
                f,
                "all lessons passed ({}/{})",
                self.passed_lessons(),
                self.total_lessons(),
            )?;
        } else {
            writeln!(
                f,
                "{} of {} lesson(s) failed",
                self.failed_lessons().count(),
                self.total_lessons(),
            )?;
        }
        for lesson in self.lessons.iter() {
            let verdict = if lesson.passed() { "PASS" } else { "FAIL" };
            writeln!(f)?;
            let (title, id) = (&lesson.title, &lesson.lesson_id);
            writeln!(f, "{} {} ({})", verdict, title, id)?;
            writeln!(
                f,
                "    steps: {}/{} passed",
                lesson.passed_steps(),
                lesson.total_steps(),
            )?;
            for step in lesson.failed_steps() {
                let position = step.position + 1;
                writeln!(f, "    FAIL step {}: {}", position, step.title)?;
                writeln!(f, "        name: {}", step.full_name)?;
                writeln!(f, "        {}", step.reason())?;
                let mut found = String::new();
                for (i, m) in step.matches.iter().enumerate() {
                    if i > 0 {
                        found.push_str(", ");
                    }
                    write!(found, "{:?}", m.text)?;
                }
                writeln!(f, "        matches found: [{}]", found)?;
                for tip in step.tips.iter() {
                    writeln!(f, "        tip: {}", tip)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn step_passes_on_exact_count() {
        let step = Step::new(r"\d+", "I have 3 cats, 5 dogs and 12 fish", 3);
        let result = Verifier::new().test_step(&step);
        assert!(result.passed);
        assert_eq!(3, result.actual);
        assert_eq!("ok", result.reason());
    }

    #[test]
    fn step_fails_on_wrong_count() {
        let step = Step::new(r"\d+", "1 2", 3);
        let result = Verifier::new().test_step(&step);
        assert!(!result.passed);
        assert_eq!(2, result.actual);
        assert!(result.error.is_none());
        assert_eq!("expected 3 matches, but found 2", result.reason());
    }

    #[test]
    fn step_fails_on_bad_pattern() {
        let step = Step::new(r"(", "anything", 0);
        let result = Verifier::new().test_step(&step);
        assert!(!result.passed);
        assert_eq!(0, result.actual);
        assert_eq!(ErrorKind::Syntax, result.error.unwrap().kind());
    }

    #[test]
    fn explicit_empty_flags_still_find_everything() {
        let step = Step::new("a", "aaa", 3).with_flags("");
        assert!(Verifier::new().test_step(&step).passed);
    }

    #[test]
    fn no_short_circuit() {
        let lesson = Lesson::new(
            "mixed",
            "Mixed",
            vec![
                Step::new("x", "x", 2),
                Step::new("a", "a", 1),
                Step::new("[", "", 0),
            ],
        );
        let result = Verifier::new().test_lesson(&lesson);
        assert!(!result.passed());
        assert_eq!(3, result.total_steps());
        assert_eq!(1, result.passed_steps());
        let failed: Vec<&str> =
            result.failed_steps().map(|s| s.full_name.as_str()).collect();
        assert_eq!(vec!["mixed/1", "mixed/3"], failed);
    }

    #[test]
    fn report_lists_failures() {
        let good = Lesson::new("good", "Good", vec![Step::new("a", "a", 1)]);
        let bad = Lesson::new(
            "bad",
            "Bad",
            vec![Step::new("cat", "cat cat", 1).with_id("cats")],
        );
        let suite = Verifier::new().test_lessons([&good, &bad]);
        assert!(!suite.passed());
        assert_eq!(1, suite.passed_lessons());
        let report = suite.to_string();
        assert!(report.contains("1 of 2 lesson(s) failed"));
        assert!(report.contains("PASS Good (good)"));
        assert!(report.contains("FAIL Bad (bad)"));
        assert!(report.contains("name: bad/cats"));
        assert!(report.contains("expected 1 matches, but found 2"));
        assert!(report.contains(r#"matches found: ["cat", "cat"]"#));
    }
}
