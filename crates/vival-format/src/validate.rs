//! Comparing captured output against an expected `OUTPUT` feature

use crate::{Feature, Modifier, Tag, Test};

impl Feature {
    /// Whether `actual` is acceptable for this feature as an expected output
    ///
    /// Without [`Modifier::Shuffled`] this is plain equality with
    /// [`Feature::merged`]. With it, the blocks may appear in any order, each
    /// adjacent pair separated by exactly one separator and nothing trailing.
    pub fn matches(&self, actual: &str) -> bool {
        if self.has(Modifier::Shuffled) {
            let mut used = vec![false; self.contents().len()];
            matches_unordered(actual, self.contents(), self.separator(), &mut used, 0)
        } else {
            actual == self.merged()
        }
    }
}

impl Test {
    /// Whether the last captured output satisfies the expected output
    pub fn validate(&self) -> bool {
        let Some(actual) = self.captured_output() else {
            return false;
        };
        match self.get(Tag::Output) {
            Some(expected) => expected.matches(actual),
            None => actual.is_empty(),
        }
    }
}

/// Backtracking search over the unused candidates
///
/// Exponential in the number of candidates; expected outputs are small.
fn matches_unordered(
    rest: &str,
    candidates: &[String],
    separator: &str,
    used: &mut [bool],
    consumed: usize,
) -> bool {
    let remaining = candidates.len() - consumed;
    if remaining == 0 {
        return rest.is_empty();
    }

    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        let Some(after) = rest.strip_prefix(candidates[i].as_str()) else {
            continue;
        };
        let after = if remaining > 1 {
            match after.strip_prefix(separator) {
                Some(after) => after,
                None => continue,
            }
        } else {
            after
        };

        used[i] = true;
        if matches_unordered(after, candidates, separator, used, consumed + 1) {
            return true;
        }
        used[i] = false;
    }

    false
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TagRegistry;

    fn shuffled(blocks: &[&str]) -> Feature {
        TagRegistry::new()
            .feature(Tag::Output)
            .with_contents(blocks.iter().copied())
            .with_modifier(Modifier::Shuffled)
    }

    #[test]
    fn exact_without_shuffle() {
        let expected = TagRegistry::new()
            .feature(Tag::Output)
            .with_contents(["1", "2"]);
        assert!(expected.matches("1\n2"));
        assert!(!expected.matches("2\n1"));
        assert!(!expected.matches("1\n2\n"));
    }

    #[test]
    fn shuffled_any_permutation() {
        let expected = shuffled(&["1", "2"]);
        assert!(expected.matches("1\n2"));
        assert!(expected.matches("2\n1"));
        assert!(!expected.matches("1\n2\n"));
        assert!(!expected.matches("12"));
    }

    #[test]
    fn shuffled_needs_backtracking() {
        // Greedily taking "a" first leaves "a\nb" unmatched against ["a\nb"]
        let expected = shuffled(&["a", "a\nb"]);
        assert!(expected.matches("a\nb\na"));
        assert!(expected.matches("a\na\nb"));
        assert!(!expected.matches("a\nb"));
    }

    #[test]
    fn shuffled_duplicates() {
        let expected = shuffled(&["x", "x", "y"]);
        assert!(expected.matches("x\ny\nx"));
        assert!(!expected.matches("x\ny\ny"));
    }

    #[test]
    fn shuffled_custom_separator() {
        let expected = shuffled(&["1", "2", "3"]).with_modifier(Modifier::EndSpace);
        assert!(expected.matches("3 1 2"));
        assert!(!expected.matches("3\n1\n2"));
    }

    #[test]
    fn shuffled_empty() {
        let expected = shuffled(&[]);
        assert!(expected.matches(""));
        assert!(!expected.matches("x"));
    }

    #[test]
    fn test_without_run_fails() {
        let registry = TagRegistry::new();
        let test = Test::new("t").with_feature(registry.feature(Tag::Output).with_contents([""]));
        assert!(!test.validate());
    }

    #[test]
    fn test_validates_captured() {
        let registry = TagRegistry::new();
        let mut test =
            Test::new("t").with_feature(registry.feature(Tag::Output).with_contents(["2 3 4 "]));
        test.record_run("2 3 4 ".to_owned(), false);
        assert!(test.validate());
        test.record_run("2 3 4".to_owned(), false);
        assert!(!test.validate());
    }
}
