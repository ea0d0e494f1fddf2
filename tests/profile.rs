use regex_tutor::{
    profile::{baseline, cases, estimate_steps, Profiler},
    Engine, ErrorKind,
};

#[test]
fn anchors_fail_fast_on_long_text() -> Result<(), regex_tutor::Error> {
    let text = "y".repeat(1_000_000);
    let mut profiler = Profiler::new();
    profiler
        .profile("anchored", "^x$", "", &text, 20)?
        .profile("unanchored", "x", "", &text, 20)?;
    let (anchored, unanchored) =
        (&profiler.results()[0], &profiler.results()[1]);
    assert_eq!(0, anchored.matches);
    assert_eq!(0, unanchored.matches);
    assert!(
        anchored.avg_time().as_secs_f64()
            <= unanchored.avg_time().as_secs_f64() * 1.5,
        "anchored {:?}, unanchored {:?}",
        anchored.avg_time(),
        unanchored.avg_time(),
    );
    assert!(anchored.estimated_steps < unanchored.estimated_steps);
    Ok(())
}

#[test]
fn ranking_and_report() -> Result<(), regex_tutor::Error> {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(100);
    let mut profiler = Profiler::new().engine(Engine::Regex);
    assert_eq!("No results to report", profiler.report());
    profiler
        .profile("literal", "fox", "g", &text, 50)?
        .profile("class", r"[a-z]+x", "gi", &text, 50)?
        .profile("anchor", "^The", "", &text, 50)?;

    let ranked = profiler.compare();
    assert_eq!(3, ranked.len());
    assert!(ranked[0].is_fastest);
    assert!(ranked[2].is_slowest);
    assert_eq!(0.0, ranked[0].percent_slower);
    for pair in ranked.windows(2) {
        assert!(pair[0].profile.avg_time() <= pair[1].profile.avg_time());
        assert_eq!(pair[0].rank + 1, pair[1].rank);
    }
    for p in profiler.results() {
        assert_eq!(50, p.matches, "{}", p.name);
        assert_eq!(Engine::Regex, p.engine);
    }

    let report = profiler.report();
    assert!(report.starts_with("regex performance report"));
    assert!(report.contains("(fastest)"));
    assert!(report.contains("(slowest)"));
    assert!(report.contains("pattern: /^The/ flags: none"));
    assert!(report.contains("pattern: /fox/ flags: g"));
    assert!(report.contains("slower than fastest"));

    profiler.clear();
    assert!(profiler.results().is_empty());
    Ok(())
}

#[test]
fn profile_errors() {
    let mut profiler = Profiler::new();
    let err = profiler.profile("zero", "a", "", "a", 0).unwrap_err();
    assert_eq!(ErrorKind::Input, err.kind());
    let err = profiler.profile("bad", "(", "", "a", 1).unwrap_err();
    assert_eq!(ErrorKind::Syntax, err.kind());
    let err = profiler.profile("flags", "a", "q", "a", 1).unwrap_err();
    assert_eq!(ErrorKind::Flags, err.kind());
    assert!(profiler.results().is_empty());
}

#[test]
fn step_estimates_scale_with_text() {
    assert_eq!(1000, estimate_steps("abc", 1000));
    assert!(estimate_steps(".*x", 1000) > estimate_steps("[^x]x", 1000));
    assert!(estimate_steps("^abc", 1000) < estimate_steps("abc", 1000));
    assert!(estimate_steps("(a|b)+", 100) < estimate_steps("(a|b)+", 1000));
}

#[test]
fn baselines_cover_every_method() -> Result<(), regex_tutor::Error> {
    let text = "lorem ipsum dolor sit amet ".repeat(200) + "needle.";
    let search = baseline::compare_substring_search(&text, "needle.", 20)?;
    let methods: Vec<&str> =
        search.timings.iter().map(|t| t.method.as_str()).collect();
    assert_eq!(
        vec!["contains", "find", "regex-fancy", "regex-regex", "regex-lite"],
        methods,
    );
    assert!(search.get(search.winner()).is_some());
    assert!(search.timings.iter().any(|t| t.percent_slower == 0.0));

    let anchors = baseline::compare_anchors(
        &text,
        "lorem",
        "needle.",
        Engine::Fancy,
        20,
    )?;
    assert_eq!(4, anchors.timings.len());
    assert!(anchors.get("regex-start").is_some());
    assert!(anchors.get("ends-with").is_some());
    Ok(())
}

#[test]
fn generated_cases_match_what_they_claim() {
    let texts = cases::repeat_to_lengths("ab", &[0, 1, 5]);
    assert_eq!(vec!["", "a", "ababa"], texts);
    for case in cases::anchor_cases() {
        let exec = regex_tutor::execute(&case.pattern, &case.text, "");
        assert!(exec.is_ok(), "{}: {:?}", case.name, exec.error);
    }
}
