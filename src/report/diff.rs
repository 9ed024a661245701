use crate::report::Palette;

/// Line diff of `expected` against `actual`
///
/// Writes nothing without the `diff` feature; both texts are shown in full
/// by the caller either way.
pub fn write_diff(
    writer: &mut dyn std::fmt::Write,
    expected: &str,
    actual: &str,
    expected_name: &dyn std::fmt::Display,
    actual_name: &dyn std::fmt::Display,
    palette: Palette,
) -> Result<(), std::fmt::Error> {
    #[cfg(feature = "diff")]
    write_diff_inner(writer, expected, actual, expected_name, actual_name, palette)?;
    #[cfg(not(feature = "diff"))]
    let _ = (writer, expected, actual, expected_name, actual_name, palette);

    Ok(())
}

#[cfg(feature = "diff")]
fn write_diff_inner(
    writer: &mut dyn std::fmt::Write,
    expected: &str,
    actual: &str,
    expected_name: &dyn std::fmt::Display,
    actual_name: &dyn std::fmt::Display,
    palette: Palette,
) -> Result<(), std::fmt::Error> {
    let changes = similar::TextDiff::configure()
        .algorithm(similar::Algorithm::Patience)
        .timeout(std::time::Duration::from_millis(500))
        .newline_terminated(false)
        .diff_lines(expected, actual);

    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        palette.info(format_args!("--- {expected_name}"))
    )?;
    writeln!(
        writer,
        "{}",
        palette.error(format_args!("+++ {actual_name}"))
    )?;
    for op in changes.ops() {
        for change in changes.iter_inline_changes(op) {
            match change.tag() {
                similar::ChangeTag::Insert => {
                    write_change(writer, change, "+", palette.actual, palette.error, palette)?;
                }
                similar::ChangeTag::Delete => {
                    write_change(writer, change, "-", palette.expected, palette.info, palette)?;
                }
                similar::ChangeTag::Equal => {
                    write_change(writer, change, "|", palette.hint, palette.hint, palette)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "diff")]
fn write_change(
    writer: &mut dyn std::fmt::Write,
    change: similar::InlineChange<'_, str>,
    sign: &str,
    em_style: anstyle::Style,
    style: anstyle::Style,
    palette: Palette,
) -> Result<(), std::fmt::Error> {
    use crate::report::Styled;

    if let Some(index) = change.old_index() {
        write!(writer, "{:>4} ", palette.hint(index + 1))?;
    } else {
        write!(writer, "{:>4} ", " ")?;
    }
    if let Some(index) = change.new_index() {
        write!(writer, "{:>4} ", palette.hint(index + 1))?;
    } else {
        write!(writer, "{:>4} ", " ")?;
    }
    write!(writer, "{} ", Styled::new(sign, style))?;
    for &(emphasized, change) in change.values() {
        let cur_style = if emphasized { em_style } else { style };
        write!(writer, "{}", Styled::new(change, cur_style))?;
    }
    if change.missing_newline() {
        writeln!(writer, "{}", Styled::new("∅", em_style))?;
    }

    Ok(())
}
