/*!
Inputs for profiling.
*/

/// How a case is expected to perform relative to its siblings.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Speed {
    Fastest,
    Fast,
    Slow,
}

/// A named pattern and text to profile together.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Case {
    pub name: String,
    pub pattern: String,
    pub text: String,
    pub expected: Option<Speed>,
}

impl Case {
    fn new(name: &str, pattern: &str, text: String) -> Case {
        Case {
            name: name.to_string(),
            pattern: pattern.to_string(),
            text,
            expected: None,
        }
    }

    fn expect(self, speed: Speed) -> Case {
        Case { expected: Some(speed), ..self }
    }
}

/// Repeat `seed` until it is exactly each of the given lengths, in
/// characters. An empty seed yields empty texts.
pub fn repeat_to_lengths(seed: &str, lengths: &[usize]) -> Vec<String> {
    lengths
        .iter()
        .map(|&len| {
            if seed.is_empty() {
                String::new()
            } else {
                seed.chars().cycle().take(len).collect()
            }
        })
        .collect()
}

/// Texts at the edges of what `base` can be searched in: nothing, a single
/// character, no match, nothing but matches, and a match at either end.
/// `base` is used as both the pattern and the matching text.
pub fn edge_cases(base: &str) -> Vec<Case> {
    let filler = "x".repeat(100);
    vec![
        Case::new("empty string", base, String::new()),
        Case::new("single character", base, "a".to_string()),
        Case::new("no match", base, "xyz".repeat(100)),
        Case::new("all match", base, base.repeat(100)),
        Case::new("match at start", base, format!("{base}{}", filler)),
        Case::new("match at end", base, format!("{}{base}", filler)),
    ]
}

/// The same literal with different anchors, each with a text it matches.
/// Anchored patterns can reject a position without scanning.
pub fn anchor_cases() -> Vec<Case> {
    let text = format!("{}target{}", "x".repeat(1000), "y".repeat(1000));
    vec![
        Case::new("no anchor", "target", text.clone()).expect(Speed::Slow),
        Case::new("start anchor", "^target", format!("target{text}"))
            .expect(Speed::Fast),
        Case::new("end anchor", "target$", format!("{text}target"))
            .expect(Speed::Fast),
        Case::new("both anchors", "^target$", "target".to_string())
            .expect(Speed::Fastest),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::execute;

    #[test]
    fn lengths_are_exact() {
        let texts = repeat_to_lengths("abc", &[0, 1, 10]);
        assert_eq!(vec!["", "a", "abcabcabca"], texts);
        let texts = repeat_to_lengths("é", &[3]);
        assert_eq!(3, texts[0].chars().count());
        assert_eq!(vec![""], repeat_to_lengths("", &[5]));
    }

    #[test]
    fn edge_cases_match_where_they_say() {
        let cases = edge_cases("abc");
        assert_eq!(6, cases.len());
        let counts: Vec<usize> = cases
            .iter()
            .map(|c| execute(&c.pattern, &c.text, "").count())
            .collect();
        assert_eq!(vec![0, 0, 0, 100, 1, 1], counts);
    }

    #[test]
    fn every_anchor_case_matches() {
        for case in anchor_cases() {
            let exec = execute(&case.pattern, &case.text, "");
            assert_eq!(1, exec.count(), "{}", case.name);
        }
    }
}
