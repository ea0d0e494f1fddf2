use std::{collections::HashSet, fs, path::Path};

use {
    anyhow::{bail, Context, Result},
    serde::Deserialize,
};

use crate::exec::Pattern;

/// A collection of lessons, usually loaded from TOML files.
#[derive(Clone, Debug, Default)]
pub struct Lessons {
    lessons: Vec<Lesson>,
    seen: HashSet<String>,
}

impl Lessons {
    /// Create a new empty collection of lessons.
    pub fn new() -> Lessons {
        Lessons::default()
    }

    /// Loads the lesson in the given TOML file. Unless the file sets an `id`
    /// explicitly, the lesson id is the stem of the file name. For example,
    /// loading `lessons/flags.toml` yields a lesson with id `flags`.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let stem = path
            .file_stem()
            .with_context(|| {
                format!("failed to get file name of {}", path.display())
            })?
            .to_str()
            .with_context(|| {
                format!("invalid UTF-8 found in {}", path.display())
            })?;
        self.load_slice(stem, &data)
            .with_context(|| format!("error loading {}", path.display()))?;
        Ok(())
    }

    /// Load a single TOML encoded lesson from `data`. `name` is used as the
    /// lesson id when the data doesn't set one.
    pub fn load_slice(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let data = std::str::from_utf8(data)
            .with_context(|| format!("data in {} is not valid UTF-8", name))?;
        let mut lesson: Lesson = toml::from_str(data)
            .with_context(|| format!("error decoding TOML for '{}'", name))?;
        if lesson.id.is_empty() {
            lesson.id = name.to_string();
        }
        self.add(lesson)
    }

    /// Adds a lesson built in code. The same uniqueness rules as for loaded
    /// lessons apply.
    pub fn push(&mut self, lesson: Lesson) -> Result<()> {
        if lesson.id.is_empty() {
            bail!("lessons built in code must have an id");
        }
        self.add(lesson)
    }

    fn add(&mut self, mut lesson: Lesson) -> Result<()> {
        if self.seen.contains(&lesson.id) {
            bail!("found duplicate lessons for id '{}'", lesson.id);
        }
        lesson.name_steps()?;
        self.seen.insert(lesson.id.clone());
        self.lessons.push(lesson);
        Ok(())
    }

    /// Iterate over all lessons in the order they were loaded.
    pub fn iter(&self) -> std::slice::Iter<'_, Lesson> {
        self.lessons.iter()
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Find a lesson by id.
    pub fn get(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }
}

impl<'a> IntoIterator for &'a Lessons {
    type Item = &'a Lesson;
    type IntoIter = std::slice::Iter<'a, Lesson>;

    fn into_iter(self) -> std::slice::Iter<'a, Lesson> {
        self.iter()
    }
}

/// How hard a lesson is.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// A lesson is an ordered sequence of steps.
///
/// Each `Lesson` corresponds to one TOML file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Lesson {
    #[serde(default)]
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    difficulty: Difficulty,
    /// 'default' permits a lesson without any steps.
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

impl Lesson {
    /// Build a lesson in code. Step ids that are empty get numbered like
    /// they would be when loaded from TOML.
    pub fn new(id: &str, title: &str, steps: Vec<Step>) -> Lesson {
        let mut lesson = Lesson {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            difficulty: Difficulty::default(),
            steps,
        };
        // Duplicates are reported when the lesson is added to `Lessons`.
        let _ = lesson.name_steps();
        lesson
    }

    /// Number the steps without an id and give every step its full name.
    /// Fails if two steps end up with the same id.
    fn name_steps(&mut self) -> Result<()> {
        let mut step_ids = HashSet::new();
        for (i, step) in self.steps.iter_mut().enumerate() {
            if step.id.is_empty() {
                step.id = format!("{}", i + 1);
            }
            step.full_name = format!("{}/{}", self.id, step.id);
            if !step_ids.insert(step.id.clone()) {
                bail!("found duplicate steps for name '{}'", step.full_name);
            }
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// A single exercise: a pattern, the text to run it on, and how many
/// matches it should produce.
///
/// Each `Step` represents a single `[[step]]` table in a lesson file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    #[serde(default)]
    id: String,
    #[serde(skip)]
    full_name: String,
    #[serde(default)]
    title: String,
    pattern: String,
    text: String,
    #[serde(rename = "expected-matches")]
    expected_matches: usize,
    flags: Option<String>,
    #[serde(default)]
    tips: Vec<String>,
}

impl Step {
    /// Build a step in code, with the default flags.
    pub fn new(pattern: &str, text: &str, expected_matches: usize) -> Step {
        Step {
            id: String::new(),
            full_name: String::new(),
            title: String::new(),
            pattern: pattern.to_string(),
            text: text.to_string(),
            expected_matches,
            flags: None,
            tips: vec![],
        }
    }

    /// Set an explicit id for this step.
    pub fn with_id(mut self, id: &str) -> Step {
        self.id = id.to_string();
        self
    }

    /// Set explicit flags for this step.
    pub fn with_flags(mut self, flags: &str) -> Step {
        self.flags = Some(flags.to_string());
        self
    }

    /// The id of this step, unique within its lesson.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The lesson id and the step id joined by a `/`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The sample text the pattern is run against.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expected_matches(&self) -> usize {
        self.expected_matches
    }

    /// The flags to run this step with. When a step doesn't specify any,
    /// this is `g`. An explicitly empty string is kept as is.
    pub fn flags(&self) -> &str {
        self.flags.as_deref().unwrap_or("g")
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    /// This step's pattern and flags as a single value.
    pub fn to_pattern(&self) -> Pattern {
        Pattern::new(&self.pattern, self.flags())
    }
}
