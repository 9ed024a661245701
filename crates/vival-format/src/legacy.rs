//! Line-delimited format predating bracketed blocks
//!
//! ```text
//! [INPUT]
//! --verbose
//! {CMD}
//! 1 2 3
//! [OUTPUT]
//! 2 3 4
//! ```

use crate::{ParseError, Tag, TagRegistry, Test};

pub(crate) const INPUT_MARKER: &str = "[INPUT]\n";
pub(crate) const CMD_MARKER: &str = "{CMD}\n";
pub(crate) const OUTPUT_MARKER: &str = "[OUTPUT]\n";

pub(crate) fn parse(
    registry: &TagRegistry,
    text: &str,
    expect_filled: bool,
) -> Result<Vec<Test>, ParseError> {
    let mut tests = Vec::new();

    // Anything before the first `[INPUT]` is a preamble
    for (index, section) in text.split(INPUT_MARKER).skip(1).enumerate() {
        let mut test = Test::new(crate::parse::test_title(index));

        let (input, output) = if expect_filled {
            let (input, output) =
                section
                    .split_once(OUTPUT_MARKER)
                    .ok_or(ParseError::MalformedLegacySection {
                        index: index + 1,
                        marker: OUTPUT_MARKER,
                    })?;
            (input, Some(output))
        } else {
            (section, None)
        };

        let input = match input.split_once(CMD_MARKER) {
            Some((cmd, input)) => {
                // The newline ends the argument line, it is not part of the last argument
                let cmd = cmd.strip_suffix('\n').unwrap_or(cmd);
                test.add(registry.feature(Tag::Cmd).with_contents([cmd]));
                input
            }
            None => input,
        };
        test.add(registry.feature(Tag::Input).with_contents([input]));

        if let Some(output) = output {
            test.add(registry.feature(Tag::Output).with_contents([output]));
        }

        vival_macros::debug!("legacy section {}: {:?}", index + 1, test);
        tests.push(test);
    }

    Ok(tests)
}
