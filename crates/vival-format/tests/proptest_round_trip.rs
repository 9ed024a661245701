//! Property tests for the parse/render pair and for shuffled matching

use proptest::prelude::*;
use vival_format::{Feature, FeatureContainer, Modifier, Parser, Scope, Tag, TagRegistry, Test};

/// Block text: no tag keywords, no bracket markers
fn block() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9 \n]{0,8}").unwrap()
}

fn end_modifier() -> impl Strategy<Value = Option<Modifier>> {
    prop_oneof![
        Just(None),
        Just(Some(Modifier::EndNl)),
        Just(Some(Modifier::EndSpace)),
        Just(Some(Modifier::EndNone)),
    ]
}

fn per_test_feature(tag: Tag) -> impl Strategy<Value = Option<Feature>> {
    prop::option::of((
        prop::collection::vec(block(), 1..4),
        any::<bool>(),
        end_modifier(),
    ))
    .prop_map(move |spec| {
        spec.map(|(blocks, shuffled, end)| {
            let mut feature = TagRegistry::new().feature(tag).with_contents(blocks);
            if shuffled {
                feature.apply(Modifier::Shuffled);
            }
            if let Some(end) = end {
                feature.apply(end);
            }
            feature
        })
    })
}

fn test_case() -> impl Strategy<Value = Test> {
    let tags = TagRegistry::new().ordered(Scope::PerTest);
    tags.into_iter()
        .map(per_test_feature)
        .collect::<Vec<_>>()
        .prop_map(|features| {
            let mut test = Test::new("generated");
            for feature in features.into_iter().flatten() {
                test.add(feature);
            }
            test
        })
}

fn globals() -> impl Strategy<Value = FeatureContainer> {
    let tags = TagRegistry::new().ordered(Scope::Global);
    tags.into_iter()
        .map(|tag| prop::option::of(block()).prop_map(move |b| (tag, b)))
        .collect::<Vec<_>>()
        .prop_map(|blocks| {
            let registry = TagRegistry::new();
            let mut globals = FeatureContainer::new();
            for (tag, block) in blocks {
                if let Some(block) = block {
                    globals.add(registry.feature(tag).with_contents([block]));
                }
            }
            globals
        })
}

proptest! {
    #[test]
    fn parse_render_round_trip(
        globals in globals(),
        tests in prop::collection::vec(test_case(), 1..5),
    ) {
        let registry = TagRegistry::new();
        let text = vival_format::render(&registry, &globals, &tests);
        let suite = Parser::new(&registry).parse(&text).unwrap();

        prop_assert!(suite.globals.content_eq(&globals), "{}", text);
        prop_assert_eq!(suite.tests.len(), tests.len());
        for (parsed, original) in suite.tests.iter().zip(&tests) {
            prop_assert!(parsed.features().content_eq(original.features()), "{}", text);
            prop_assert_eq!(parsed.is_filled(), original.is_filled());
        }
    }

    #[test]
    fn shuffled_accepts_any_permutation(
        (blocks, permuted) in prop::collection::vec("[a-z]{1,3}", 1..6)
            .prop_flat_map(|blocks| (Just(blocks.clone()), Just(blocks).prop_shuffle())),
    ) {
        let expected = TagRegistry::new()
            .feature(Tag::Output)
            .with_contents(blocks.clone())
            .with_modifier(Modifier::Shuffled);
        prop_assert!(expected.matches(&permuted.join("\n")));
        let with_trailing_newline = format!("{}\n", permuted.join("\n"));
        prop_assert!(!expected.matches(&with_trailing_newline));
    }

    #[test]
    fn per_test_merge_concatenates(
        a in prop::collection::vec(block(), 0..4),
        b in prop::collection::vec(block(), 0..4),
    ) {
        let registry = TagRegistry::new();
        let mut merged = registry.feature(Tag::Input).with_contents(a.clone());
        merged.merge(registry.feature(Tag::Input).with_contents(b.clone()));
        let expected: Vec<_> = a.into_iter().chain(b).collect();
        prop_assert_eq!(merged.contents(), expected.as_slice());
    }
}
