use {
    anyhow::Result,
    regex_tutor::{Engine, ErrorKind, Executor, Verifier},
};

#[test]
fn every_lesson_passes() -> Result<()> {
    let lessons = crate::suite()?;
    assert_eq!(8, lessons.len());
    let suite = Verifier::new().test_lessons(&lessons);
    assert!(suite.passed(), "{}", suite);
    assert_eq!(8, suite.passed_lessons());
    Ok(())
}

#[test]
fn lesson_ids_and_step_names() -> Result<()> {
    let lessons = crate::suite()?;
    let ids: Vec<&str> = lessons.iter().map(|l| l.id()).collect();
    assert_eq!(
        vec![
            "basic-regex",
            "character-classes",
            "quantifiers",
            "groups",
            "real-world",
            "flags",
            "dangerous-regex",
            "performance",
        ],
        ids,
    );
    let steps: usize = lessons.iter().map(|l| l.steps().len()).sum();
    assert_eq!(61, steps);

    let real = lessons.get("real-world").unwrap();
    assert_eq!("real-world/8", real.steps()[7].full_name());
    let dangerous = lessons.get("dangerous-regex").unwrap();
    assert_eq!(
        "dangerous-regex/catastrophic-backtracking",
        dangerous.steps()[0].full_name(),
    );
    assert_eq!("", dangerous.steps()[0].flags());
    Ok(())
}

// The linear time engines can't compile lookaround or backreferences, but
// everything they can compile must agree with the default engine.
#[test]
fn linear_engine_agrees_where_it_compiles() -> Result<()> {
    let lessons = crate::suite()?;
    let verifier =
        Verifier::new().executor(Executor::new().engine(Engine::Regex));
    let suite = verifier.test_lessons(&lessons);
    let mut unsupported = vec![];
    for step in suite.lessons.iter().flat_map(|l| l.steps.iter()) {
        match step.error {
            Some(ref err) => {
                let name = &step.full_name;
                assert_eq!(ErrorKind::Syntax, err.kind(), "{}", name);
                unsupported.push(step.full_name.as_str());
            }
            None => {
                assert!(step.passed, "{}: {}", step.full_name, step.reason())
            }
        }
    }
    assert_eq!(
        vec![
            "groups/step4",
            "groups/step6",
            "groups/step7",
            "groups/step8",
        ],
        unsupported,
    );
    Ok(())
}
