/*!
Heuristic ReDoS risk analysis of a pattern's source text.

Nothing in this module parses or runs a pattern. Each rule is a shape check
on the raw text, in the same spirit as a linter: it flags constructs that
are known to make backtracking engines blow up, like `(a+)+`, and proposes
textual rewrites. An invalid pattern is analyzed like any other string.

The rules are deliberately approximate. A pattern reported as safe can
still be slow, and a flagged one may be fine on the engine that runs it.
The numeric cut-offs live in [`Thresholds`] so that callers can tune them.
*/

use std::sync::LazyLock;

use regex::Regex;

static NESTED_QUANTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*[+*]\)[+*?]").unwrap());
static REPEATED_ALTERNATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)|]*\|[^)]*\)[+*]").unwrap());
static UNBOUNDED_REPETITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+),\}").unwrap());
static COLLAPSIBLE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\+\)\+").unwrap());
static LOOKAHEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\?[=!]").unwrap());
static LOOKBEHIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\?<[=!]").unwrap());
static CAPTURE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^?]").unwrap());

/// Cut-offs used by the rules that count things.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Thresholds {
    /// Flag `multiple-dot-star` when there are more `.*` than this.
    pub max_dot_stars: usize,
    /// Flag `{n,}` when `n` is greater than this.
    pub unbounded_min: u64,
    /// Flag `complex-lookarounds` when there are more lookarounds than this.
    pub max_lookarounds: usize,
    /// Flag `excessive-captures` when there are more groups than this.
    pub max_captures: usize,
    /// Without nested quantifiers, a flagged pattern with more `|` than
    /// this is estimated to be high polynomial instead of linear.
    pub polynomial_alternations: usize,
}

impl Default for Thresholds {
    fn default() -> Thresholds {
        Thresholds {
            max_dot_stars: 1,
            unbounded_min: 10,
            max_lookarounds: 3,
            max_captures: 10,
            polynomial_alternations: 5,
        }
    }
}

/// The construct a [`DangerIssue`] was raised for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IssueKind {
    NestedQuantifiers,
    OverlappingAlternations,
    MultipleDotStar,
    UnanchoredDotStar,
    UnlimitedQuantifier,
    ComplexLookarounds,
    ExcessiveCaptures,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        use self::IssueKind::*;

        match *self {
            NestedQuantifiers => "nested-quantifiers",
            OverlappingAlternations => "overlapping-alternations",
            MultipleDotStar => "multiple-dot-star",
            UnanchoredDotStar => "unanchored-dot-star",
            UnlimitedQuantifier => "unlimited-quantifier",
            ComplexLookarounds => "complex-lookarounds",
            ExcessiveCaptures => "excessive-captures",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How bad a single issue is, from least to most.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The overall risk of a pattern, from least to most.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DangerLevel {
    #[default]
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl DangerLevel {
    /// Aggregate the severities of a set of issues.
    ///
    /// Any critical issue makes the pattern critical. Any high issue, or at
    /// least two medium ones, make it high. Otherwise the level is that of
    /// the worst issue, and no issues at all is safe.
    pub fn from_issues(issues: &[DangerIssue]) -> DangerLevel {
        let has = |sev| issues.iter().any(|i| i.severity == sev);
        let mediums =
            issues.iter().filter(|i| i.severity == Severity::Medium).count();
        if has(Severity::Critical) {
            DangerLevel::Critical
        } else if has(Severity::High) || mediums >= 2 {
            DangerLevel::High
        } else if mediums > 0 {
            DangerLevel::Medium
        } else if !issues.is_empty() {
            DangerLevel::Low
        } else {
            DangerLevel::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            DangerLevel::Safe => "safe",
            DangerLevel::Low => "low",
            DangerLevel::Medium => "medium",
            DangerLevel::High => "high",
            DangerLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single risky construct found in a pattern.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DangerIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    /// The part of the pattern that triggered the rule, or a short summary
    /// when the rule counts things.
    pub fragment: String,
}

/// A rewrite of the whole pattern that avoids one or more issues.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Suggestion {
    pub original: String,
    pub suggested: String,
    pub reason: String,
}

/// A rough, illustrative estimate of how search time grows with the length
/// of the haystack. The timings are not measured.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct WorstCase {
    /// The complexity class in big-O notation, e.g., `O(2^n)`.
    pub class: String,
    pub description: String,
    /// Pairs of haystack length and an indicative time.
    pub samples: Vec<(usize, String)>,
}

impl WorstCase {
    fn new(class: &str, description: &str, samples: &[(usize, &str)]) -> Self {
        WorstCase {
            class: class.to_string(),
            description: description.to_string(),
            samples: samples
                .iter()
                .map(|&(len, time)| (len, time.to_string()))
                .collect(),
        }
    }
}

/// The result of analyzing one pattern.
///
/// This is a pure function of the pattern and the thresholds used. Two
/// analyses of the same input always compare equal.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DangerAnalysis {
    pub pattern: String,
    pub level: DangerLevel,
    pub issues: Vec<DangerIssue>,
    /// A weighted count of the pattern's features. Only meaningful when
    /// comparing patterns with each other.
    pub complexity: usize,
    pub suggestions: Vec<Suggestion>,
    /// Only set when at least one issue was found.
    pub worst_case: Option<WorstCase>,
}

impl DangerAnalysis {
    pub fn is_safe(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true if an issue of the given kind was found.
    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// A short one line verdict.
    pub fn summary(&self) -> String {
        if self.issues.is_empty() {
            "safe pattern, no problems detected".to_string()
        } else {
            format!("{} problem(s) detected", self.issues.len())
        }
    }

    /// Inputs likely to expose the issues found in this analysis, plus one
    /// ordinary input to compare against.
    pub fn evil_inputs(&self) -> Vec<EvilInput> {
        let mut inputs = vec![];
        if self.has(IssueKind::NestedQuantifiers) {
            for len in [10, 15, 20, 25] {
                inputs.push(EvilInput {
                    input: format!("{}!", "a".repeat(len)),
                    description: format!(
                        "{} 'a's with no final match",
                        len
                    ),
                    expected: Behavior::Timeout,
                });
            }
        }
        if self.has(IssueKind::MultipleDotStar) {
            inputs.push(EvilInput {
                input: "x".repeat(1000),
                description: "long input for multiple .*".to_string(),
                expected: Behavior::Slow,
            });
        }
        inputs.push(EvilInput {
            input: "test".to_string(),
            description: "short ordinary input".to_string(),
            expected: Behavior::Fast,
        });
        inputs
    }
}

/// An adversarial input for a pattern.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EvilInput {
    pub input: String,
    pub description: String,
    pub expected: Behavior,
}

/// How a backtracking engine is expected to behave on an [`EvilInput`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Behavior {
    Fast,
    Slow,
    Timeout,
}

impl Behavior {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Behavior::Fast => "fast",
            Behavior::Slow => "slow",
            Behavior::Timeout => "timeout",
        }
    }
}

/// Runs the danger rules with a particular set of thresholds.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    thresholds: Thresholds,
}

impl Analyzer {
    pub fn new(thresholds: Thresholds) -> Analyzer {
        Analyzer { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Analyze the source text of `pattern`.
    pub fn analyze(&self, pattern: &str) -> DangerAnalysis {
        let issues = self.detect(pattern);
        let level = DangerLevel::from_issues(&issues);
        let (suggestions, worst_case) = if issues.is_empty() {
            (vec![], None)
        } else {
            (suggest(pattern, &issues), Some(self.worst_case(pattern)))
        };
        log::trace!("/{}/ is {} ({} issues)", pattern, level, issues.len());
        DangerAnalysis {
            pattern: pattern.to_string(),
            level,
            issues,
            complexity: complexity(pattern),
            suggestions,
            worst_case,
        }
    }

    fn detect(&self, pattern: &str) -> Vec<DangerIssue> {
        let t = &self.thresholds;
        let mut issues = vec![];
        let mut push = |kind, severity, description: String, fragment: &str| {
            issues.push(DangerIssue {
                kind,
                severity,
                description,
                fragment: fragment.to_string(),
            })
        };

        if let Some(m) = NESTED_QUANTIFIER.find(pattern) {
            push(
                IssueKind::NestedQuantifiers,
                Severity::Critical,
                "nested quantifiers detected (e.g., (a+)+)".to_string(),
                m.as_str(),
            );
        }
        if let Some(m) = REPEATED_ALTERNATION.find(pattern) {
            if has_overlapping_alternatives(m.as_str()) {
                push(
                    IssueKind::OverlappingAlternations,
                    Severity::High,
                    "overlapping alternatives under repetition".to_string(),
                    m.as_str(),
                );
            }
        }
        let dot_stars = pattern.matches(".*").count();
        if dot_stars > t.max_dot_stars {
            push(
                IssueKind::MultipleDotStar,
                Severity::Medium,
                format!("multiple .* detected ({} instances)", dot_stars),
                ".*",
            );
        }
        if pattern.starts_with(".*") || pattern.ends_with(".*") {
            push(
                IssueKind::UnanchoredDotStar,
                Severity::Low,
                ".* without an anchor at the start or end".to_string(),
                ".*",
            );
        }
        let unbounded = UNBOUNDED_REPETITION.captures_iter(pattern).find(|c| {
            // Too many digits to fit is certainly over any threshold.
            c[1].parse::<u64>().map_or(true, |min| min > t.unbounded_min)
        });
        if let Some(caps) = unbounded {
            push(
                IssueKind::UnlimitedQuantifier,
                Severity::Medium,
                format!("quantifier without an upper bound: {}", &caps[0]),
                &caps[0],
            );
        }
        let lookarounds = LOOKAHEAD.find_iter(pattern).count()
            + LOOKBEHIND.find_iter(pattern).count();
        if lookarounds > t.max_lookarounds {
            push(
                IssueKind::ComplexLookarounds,
                Severity::Medium,
                format!("too many lookarounds ({} found)", lookarounds),
                "multiple lookarounds",
            );
        }
        let captures = CAPTURE_GROUP.find_iter(pattern).count();
        if captures > t.max_captures {
            push(
                IssueKind::ExcessiveCaptures,
                Severity::Low,
                format!("too many capture groups ({} found)", captures),
                &format!("{} capture groups", captures),
            );
        }
        issues
    }

    fn worst_case(&self, pattern: &str) -> WorstCase {
        if NESTED_QUANTIFIER.is_match(pattern) {
            WorstCase::new(
                "O(2^n)",
                "exponential time due to nested quantifiers",
                &[(10, "~1ms"), (20, "~1s"), (30, "~17min"), (40, "~11 days")],
            )
        } else if pattern.matches('|').count()
            > self.thresholds.polynomial_alternations
        {
            WorstCase::new(
                "O(n^m)",
                "high polynomial time due to many alternatives",
                &[(10, "~1ms"), (100, "~100ms"), (1000, "~10s")],
            )
        } else {
            WorstCase::new(
                "O(n)",
                "linear time",
                &[(1000, "<1ms"), (10000, "<10ms")],
            )
        }
    }
}

/// Analyze `pattern` with the default thresholds.
pub fn analyze(pattern: &str) -> DangerAnalysis {
    Analyzer::default().analyze(pattern)
}

/// Adversarial inputs for `pattern`, derived from its analysis with the
/// default thresholds.
pub fn evil_inputs(pattern: &str) -> Vec<EvilInput> {
    analyze(pattern).evil_inputs()
}

/// A weighted count of the features of a pattern: its length in characters
/// plus extra weight for quantifiers, counted repetitions, alternations,
/// special groups and escapes.
pub fn complexity(pattern: &str) -> usize {
    let count =
        |pred: fn(char) -> bool| pattern.chars().filter(|&c| pred(c)).count();
    pattern.chars().count()
        + 2 * count(|c| matches!(c, '+' | '*' | '?'))
        + 3 * count(|c| c == '{')
        + 2 * count(|c| c == '|')
        + 5 * pattern.matches("(?").count()
        + count(|c| c == '\\')
}

/// `alternation` looks like `(x|y|...)+`. Returns true if one alternative is
/// a prefix of another.
fn has_overlapping_alternatives(alternation: &str) -> bool {
    let inner = alternation.strip_prefix('(').unwrap_or(alternation);
    let inner = match inner.rfind(')') {
        Some(end) => &inner[..end],
        None => inner,
    };
    let alts: Vec<&str> = inner.split('|').collect();
    for (i, a) in alts.iter().enumerate() {
        for b in alts[i + 1..].iter() {
            if a.starts_with(b) || b.starts_with(a) {
                return true;
            }
        }
    }
    false
}

fn suggest(pattern: &str, issues: &[DangerIssue]) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = vec![];
    let mut add = |suggested: String, reason: &str| {
        if suggestions.iter().any(|s| s.suggested == suggested) {
            return;
        }
        suggestions.push(Suggestion {
            original: pattern.to_string(),
            suggested,
            reason: reason.to_string(),
        });
    };
    for issue in issues.iter() {
        match issue.kind {
            IssueKind::NestedQuantifiers => {
                let collapsed =
                    COLLAPSIBLE_GROUP.replacen(pattern, 1, "${1}+");
                if collapsed != pattern {
                    add(collapsed.into_owned(), "remove nested quantifiers");
                }
            }
            IssueKind::MultipleDotStar => {
                add(
                    pattern.replace(".*", r"[^\n]*"),
                    r"use [^\n]* instead of .* to be more specific",
                );
            }
            IssueKind::UnlimitedQuantifier => {
                let bounded = UNBOUNDED_REPETITION.replace_all(
                    pattern,
                    |caps: &regex::Captures| match caps[1].parse::<usize>() {
                        Ok(min) => {
                            format!("{{{},{}}}", min, min.saturating_mul(10))
                        }
                        Err(_) => caps[0].to_string(),
                    },
                );
                add(bounded.into_owned(), "add an upper bound to quantifiers");
            }
            IssueKind::ExcessiveCaptures => {
                add(
                    "consider using (?:...) for non-capturing groups"
                        .to_string(),
                    "non-capturing groups use less memory",
                );
            }
            _ => {}
        }
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(analysis: &DangerAnalysis) -> Vec<IssueKind> {
        analysis.issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn nested_quantifiers() {
        let a = analyze("(a+)+b");
        assert_eq!(DangerLevel::Critical, a.level);
        assert_eq!(vec![IssueKind::NestedQuantifiers], kinds(&a));
        assert_eq!("(a+)+", a.issues[0].fragment);
        assert_eq!("a+b", a.suggestions[0].suggested);
        let worst = a.worst_case.unwrap();
        assert_eq!("O(2^n)", worst.class);
        assert_eq!(4, worst.samples.len());
    }

    #[test]
    fn safe_pattern() {
        let a = analyze("^[a-zA-Z0-9]{3,20}$");
        assert_eq!(DangerLevel::Safe, a.level);
        assert!(a.issues.is_empty());
        assert!(a.suggestions.is_empty());
        assert_eq!(None, a.worst_case);
        assert_eq!("safe pattern, no problems detected", a.summary());
    }

    #[test]
    fn overlapping_alternation() {
        let a = analyze("(a|ab)*c");
        assert_eq!(vec![IssueKind::OverlappingAlternations], kinds(&a));
        assert_eq!(DangerLevel::High, a.level);
        assert_eq!("(a|ab)*", a.issues[0].fragment);
        // Alternatives that don't share a prefix are fine.
        assert!(analyze("(cat|dog)+").is_safe());
    }

    #[test]
    fn dot_stars() {
        let a = analyze(".*foo.*");
        assert_eq!(
            vec![IssueKind::MultipleDotStar, IssueKind::UnanchoredDotStar],
            kinds(&a),
        );
        assert_eq!(DangerLevel::Medium, a.level);
        assert_eq!(r"[^\n]*foo[^\n]*", a.suggestions[0].suggested);
        assert_eq!("O(n)", a.worst_case.unwrap().class);
    }

    #[test]
    fn unlimited_quantifier() {
        let a = analyze(r"a{11,}b{2,}");
        assert_eq!(vec![IssueKind::UnlimitedQuantifier], kinds(&a));
        assert_eq!("{11,}", a.issues[0].fragment);
        assert_eq!("a{11,110}b{2,20}", a.suggestions[0].suggested);
        assert!(analyze(r"a{10,}").is_safe());
    }

    #[test]
    fn two_mediums_make_high() {
        let a = analyze(r"x.*y.*z{20,}");
        assert_eq!(
            vec![IssueKind::MultipleDotStar, IssueKind::UnlimitedQuantifier],
            kinds(&a),
        );
        assert_eq!(DangerLevel::High, a.level);
        assert_eq!(2, a.suggestions.len());
    }

    #[test]
    fn lookarounds_and_captures() {
        let a = analyze(r"(?=a)(?!b)(?<=c)(?<!d)e");
        assert_eq!(vec![IssueKind::ComplexLookarounds], kinds(&a));
        assert_eq!("too many lookarounds (4 found)", a.issues[0].description);

        let groups = "(a)".repeat(11);
        let a = analyze(&groups);
        assert_eq!(vec![IssueKind::ExcessiveCaptures], kinds(&a));
        assert_eq!(DangerLevel::Low, a.level);
        assert_eq!("11 capture groups", a.issues[0].fragment);
    }

    #[test]
    fn many_alternatives_are_polynomial() {
        let a = analyze("(a|b|c|d|e|f|g)+.*");
        assert_eq!("O(n^m)", a.worst_case.unwrap().class);
    }

    #[test]
    fn custom_thresholds() {
        let analyzer = Analyzer::new(Thresholds {
            max_captures: 1,
            ..Thresholds::default()
        });
        let a = analyzer.analyze("(a)(b)");
        assert_eq!(vec![IssueKind::ExcessiveCaptures], kinds(&a));
    }

    #[test]
    fn invalid_patterns_are_still_analyzed() {
        let a = analyze("((a+)+");
        assert!(a.has(IssueKind::NestedQuantifiers));
    }

    #[test]
    fn complexity_score() {
        // 6 chars, 2 quantifiers.
        assert_eq!(10, complexity("(a+)+b"));
        // 8 chars, one '?', one "(?", one '|'.
        assert_eq!(8 + 2 + 5 + 2, complexity("(?:a|bc)"));
        assert_eq!(2 + 1, complexity(r"\d"));
        assert_eq!(6 + 3, complexity("a{1,3}"));
    }

    #[test]
    fn evil_inputs_follow_issues() {
        let inputs = evil_inputs("(a+)+b");
        assert_eq!(5, inputs.len());
        assert_eq!("aaaaaaaaaa!", inputs[0].input);
        assert_eq!(Behavior::Timeout, inputs[0].expected);
        assert_eq!(Behavior::Fast, inputs[4].expected);

        let inputs = evil_inputs("a.*b.*");
        assert_eq!(2, inputs.len());
        assert_eq!(1000, inputs[0].input.len());
        assert_eq!(Behavior::Slow, inputs[0].expected);
    }
}
