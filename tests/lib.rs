mod guard;
mod lessons;
mod profile;
mod verify;

/// Every lesson shipped in `testdata/lessons`.
fn suite() -> anyhow::Result<regex_tutor::Lessons> {
    let mut lessons = regex_tutor::Lessons::new();
    macro_rules! load {
        ($name:expr) => {{
            const DATA: &[u8] = include_bytes!(concat!(
                "../testdata/lessons/",
                $name,
                ".toml"
            ));
            lessons.load_slice($name, DATA)?;
        }};
    }

    load!("basics");
    load!("character-classes");
    load!("quantifiers");
    load!("groups");
    load!("real-world");
    load!("flags");
    load!("dangerous");
    load!("performance");

    Ok(lessons)
}
