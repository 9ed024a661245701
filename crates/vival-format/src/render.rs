//! Serialization back into the bracketed format

use crate::{Feature, FeatureContainer, Modifier, Scope, Tag, TagRegistry, Test};

const HEADER: &str = "Contents of this file were automatically generated by vival.";
const BANNER_WIDTH: usize = 70;

/// Write `globals` and `tests` as a test file that parses back to the same content
///
/// Global features are written as a single block since repeating a global
/// tag replaces it. Every test starts with a `COMMENT`, empty when it has
/// none, so test boundaries survive a round trip.
pub fn render(registry: &TagRegistry, globals: &FeatureContainer, tests: &[Test]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");

    for tag in registry.ordered(Scope::Global) {
        if let Some(feature) = globals.get(tag) {
            out.push_str(&feature.collapsed().to_string());
        }
    }

    let dashes = "-".repeat((BANNER_WIDTH - "Tests".len()) / 2);
    out.push_str(&format!("{dashes}Tests{dashes}\n\n"));

    for test in tests {
        out.push_str(&inert_title(test.title()));
        if !test.is_filled() {
            out.push_str(" (unfilled)");
        }
        out.push_str("\n\n");

        match test.get(Tag::Comment) {
            Some(comment) => out.push_str(&comment.to_string()),
            None => out.push_str(&registry.feature(Tag::Comment).to_string()),
        }
        for tag in registry.ordered(Scope::PerTest) {
            if tag == Tag::Comment {
                continue;
            }
            if let Some(feature) = test.get(tag) {
                out.push_str(&feature.to_string());
            }
        }
    }

    out
}

/// `title` with keywords lowercased and brackets bent out of shape
///
/// Titles land in wild space, where a keyword would change the tag of the
/// next block. Parsing renumbers tests anyway, so titles need not survive.
fn inert_title(title: &str) -> String {
    let mut title = title
        .replace(crate::parse::OPEN, "/(")
        .replace(crate::parse::CLOSE, ")/");
    let keywords = Tag::ALL
        .into_iter()
        .map(Tag::keyword)
        .chain(Modifier::ALL.into_iter().map(Modifier::keyword));
    for keyword in keywords {
        title = title.replace(keyword, &keyword.to_lowercase());
    }
    title
}

impl std::fmt::Display for Feature {
    /// `TAG mods` line, then every block followed by the separator
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())?;
        for modifier in modifier_order(self) {
            write!(f, " {modifier}")?;
        }
        writeln!(f)?;

        if self.contents().is_empty() {
            return writeln!(f, "/{{}}/\n");
        }
        for block in self.contents() {
            write!(f, "/{{{block}}}/{}", self.separator())?;
        }
        if self.separator() == "\n" {
            writeln!(f)
        } else {
            writeln!(f, "\n")
        }
    }
}

/// Modifiers with the one producing the active separator last
///
/// On re-parse modifiers apply in order of appearance, so the last `END*`
/// keyword decides the separator.
fn modifier_order(feature: &Feature) -> Vec<Modifier> {
    let mut modifiers: Vec<_> = feature.modifiers().collect();
    modifiers.sort_by_key(|m| match m.separator() {
        None => 0,
        Some(separator) if separator != feature.separator() => 1,
        Some(_) => 2,
    });
    modifiers
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Parser;

    #[test]
    fn feature_layout() {
        let registry = TagRegistry::new();
        let input = registry.feature(Tag::Input).with_contents(["1 2", "3"]);
        assert_eq!(input.to_string(), "INPUT\n/{1 2}/\n/{3}/\n\n");

        let cmd = registry.feature(Tag::Cmd).with_contents(["-a", "-b"]);
        assert_eq!(cmd.to_string(), "CMD\n/{-a}/ /{-b}/ \n\n");

        let output = registry
            .feature(Tag::Output)
            .with_contents(["x", "y"])
            .with_modifier(Modifier::Shuffled)
            .with_modifier(Modifier::EndNone);
        assert_eq!(
            output.to_string(),
            "OUTPUT mSHUFFLED mENDNONE\n/{x}//{y}/\n\n"
        );

        assert_eq!(registry.feature(Tag::Comment).to_string(), "COMMENT\n/{}/\n\n");
    }

    #[test]
    fn active_end_modifier_written_last() {
        let registry = TagRegistry::new();
        let output = registry
            .feature(Tag::Output)
            .with_modifier(Modifier::EndNone)
            .with_modifier(Modifier::EndNl);
        assert_eq!(
            output.to_string(),
            "OUTPUT mENDNONE mENDNL\n/{}/\n\n"
        );
    }

    #[test]
    fn suite_layout() {
        let registry = TagRegistry::new();
        let suite = Parser::new(&registry)
            .parse("DESCRIPTION /{adds one}/ INPUT /{1}/ OUTPUT /{2}/ INPUT /{5}/")
            .unwrap();
        let dashes = "-".repeat(32);
        let expected = format!(
            "{HEADER}

DESCRIPTION
/{{adds one}}/

{dashes}Tests{dashes}

Test 1

COMMENT
/{{}}/

INPUT
/{{1}}/

OUTPUT
/{{2}}/

Test 2 (unfilled)

COMMENT
/{{}}/

INPUT
/{{5}}/

"
        );
        assert_eq!(suite.render(), expected);
    }

    #[test]
    fn keywords_in_titles_stay_inert() {
        let registry = TagRegistry::new();
        let tests = [
            Test::new("INPUT check /{x}/")
                .with_feature(registry.feature(Tag::Input).with_contents(["1"]))
                .with_feature(registry.feature(Tag::Output).with_contents(["2"])),
            Test::new("mSHUFFLED OUTPUT")
                .with_feature(registry.feature(Tag::Input).with_contents(["3"])),
        ];
        let rendered = render(&registry, &FeatureContainer::new(), &tests);
        assert!(rendered.contains("input check /(x)/\n"), "{rendered}");
        assert!(rendered.contains("mshuffled output (unfilled)\n"), "{rendered}");

        let reparsed = Parser::new(&registry).parse(&rendered).unwrap();
        assert_eq!(reparsed.tests.len(), 2);
        for (a, b) in reparsed.tests.iter().zip(&tests) {
            assert!(a.features().content_eq(b.features()), "{a:?} != {b:?}");
        }
    }

    #[test]
    fn round_trip() {
        let registry = TagRegistry::new();
        let original = Parser::new(&registry)
            .parse(
                "
TIMEOUT /{1}/
MAIN /{int main() {}}/
COMMENT /{both orders}/
CMD /{-v}/ /{--fast}/
INPUT /{1 2}/
OUTPUT mSHUFFLED /{a}/ /{b}/
STARTUP /{touch f}/
INPUT /{3}/
CLEANUP /{rm f}/
",
            )
            .unwrap();
        assert_eq!(original.tests.len(), 2);

        let reparsed = Parser::new(&registry).parse(&original.render()).unwrap();
        assert!(reparsed.globals.content_eq(&original.globals));
        assert_eq!(reparsed.tests.len(), original.tests.len());
        for (a, b) in reparsed.tests.iter().zip(&original.tests) {
            assert!(a.features().content_eq(b.features()), "{a:?} != {b:?}");
            assert_eq!(a.is_filled(), b.is_filled());
        }
    }
}
