use {
    anyhow::Result,
    regex_tutor::{ErrorKind, Lesson, Lessons, Step, Verifier},
};

#[test]
fn passes_iff_counts_are_equal() {
    let text = "I have 3 cats, 5 dogs and 12 fish";
    let verifier = Verifier::new();
    for expected in 0..6 {
        let result = verifier.test_step(&Step::new(r"\d+", text, expected));
        assert_eq!(3, result.actual);
        assert_eq!(expected == 3, result.passed, "expected {}", expected);
    }
}

#[test]
fn broken_step_does_not_hide_others() -> Result<()> {
    let data = r#"
title = "Mixed bag"
difficulty = "intermediate"

[[step]]
id = "broken"
title = "Unclosed group"
pattern = '(\d+'
text = "123"
expected-matches = 1

[[step]]
id = "wrong-count"
pattern = 'o'
text = "foo"
expected-matches = 1
tips = ["'o' appears twice in \"foo\""]

[[step]]
id = "fine"
pattern = 'c.t'
text = "cat cot"
expected-matches = 2
"#;
    let mut lessons = Lessons::new();
    lessons.load_slice("mixed", data.as_bytes())?;
    let other = Lesson::new("other", "Other", vec![Step::new("a", "a", 1)]);
    lessons.push(other)?;

    let suite = Verifier::new().test_lessons(&lessons);
    assert!(!suite.passed());
    assert_eq!(2, suite.total_lessons());
    assert_eq!(1, suite.passed_lessons());

    let failed: Vec<&str> =
        suite.failed_steps().map(|s| s.full_name.as_str()).collect();
    assert_eq!(vec!["mixed/broken", "mixed/wrong-count"], failed);

    let mixed = &suite.lessons[0];
    assert_eq!(3, mixed.total_steps());
    assert_eq!(1, mixed.passed_steps());
    let broken = &mixed.steps[0];
    assert_eq!(0, broken.actual);
    assert_eq!(ErrorKind::Syntax, broken.error.as_ref().unwrap().kind());
    assert_eq!(2, mixed.steps[1].actual);

    let report = suite.to_string();
    assert!(report.contains("1 of 2 lesson(s) failed"));
    assert!(report.contains("FAIL step 1: Unclosed group"));
    assert!(report.contains("FAIL step 2: "));
    assert!(report.contains(r#"matches found: ["o", "o"]"#));
    assert!(report.contains(r#"tip: 'o' appears twice in "foo""#));
    assert!(report.contains("PASS Other (other)"));
    Ok(())
}

#[test]
fn load_from_disk() -> Result<()> {
    let path =
        concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/lessons/flags.toml");
    let mut lessons = Lessons::new();
    lessons.load(path)?;
    let flags = lessons.get("flags").unwrap();
    assert_eq!(8, flags.steps().len());
    assert_eq!("gi", flags.steps()[1].flags());
    assert!(Verifier::new().test_lesson(flags).passed());
    Ok(())
}

#[test]
fn missing_file_has_context() {
    let mut lessons = Lessons::new();
    let err = lessons.load("does/not/exist.toml").unwrap_err();
    assert!(format!("{:#}", err).contains("failed to read"));
}
