use vival_format::{Scope, Tag, TagRegistry, Test};

use crate::report::{write_diff, Palette};
use crate::Failure;

const RULE_WIDTH: usize = 30;

/// What a failed test ran with and what it printed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReport {
    title: String,
    failure: Failure,
    comment: Option<String>,
    /// Labelled per-test features, in serialization order
    sections: Vec<(String, String)>,
    expected: Option<String>,
    actual: String,
}

impl FailureReport {
    pub fn new(registry: &TagRegistry, test: &Test, failure: Failure) -> Self {
        let comment = test
            .get(Tag::Comment)
            .map(|f| f.merged())
            .filter(|c| !c.is_empty());
        let sections = registry
            .ordered(Scope::PerTest)
            .into_iter()
            .filter_map(|tag| {
                let label = registry.spec(tag).label.clone()?;
                let feature = test.get(tag)?;
                // An empty expected output is still worth showing
                (tag == Tag::Output || !feature.is_empty()).then(|| (label, feature.merged()))
            })
            .collect();
        let expected = (failure == Failure::Mismatch).then(|| test.merged(Tag::Output));
        Self {
            title: test.title().to_owned(),
            failure,
            comment,
            sections,
            expected,
            actual: test.captured_output().unwrap_or_default().to_owned(),
        }
    }

    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    pub fn write(
        &self,
        writer: &mut dyn std::fmt::Write,
        palette: Palette,
    ) -> Result<(), std::fmt::Error> {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(writer, "{}", palette.hint(&rule))?;
        writeln!(
            writer,
            "{}: {}",
            self.title,
            palette.error(&self.failure)
        )?;
        if let Some(comment) = &self.comment {
            writeln!(writer, "{comment}")?;
        }
        for (label, text) in &self.sections {
            writeln!(writer)?;
            writeln!(writer, "{}", palette.info(format_args!("{label}:")))?;
            writeln!(writer, "{text}")?;
        }
        writeln!(writer)?;
        writeln!(writer, "{}", palette.info("PROGRAM OUTPUT:"))?;
        writeln!(writer, "{}", self.actual)?;
        if let Some(expected) = &self.expected {
            write_diff(
                writer,
                expected,
                &self.actual,
                &"EXPECTED OUTPUT",
                &"PROGRAM OUTPUT",
                palette,
            )?;
        }
        writeln!(writer, "{}", palette.hint(&rule))?;
        Ok(())
    }
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write(f, Palette::plain())
    }
}
