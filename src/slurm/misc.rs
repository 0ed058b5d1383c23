use color_eyre::{eyre::bail, Result};

/// Converts an iterator of &str to an ``--Format`` argument with fixed-width columns
pub fn format_string<'a, I, S>(iter: I, width: usize) -> String
where
    I: Iterator<Item = &'a S>,
    S: ?Sized + AsRef<str> + 'a,
{
    iter.map(|v| format!("{}:{}", v.as_ref(), width))
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits fixed-width `sinfo` output into columns of `width` characters, trimming each column.
///
/// Values that fill their column completely are truncated by `sinfo` and cannot be detected
/// here; neither can a mismatch between `width` and the width actually used by `sinfo`.
pub fn split_columns(output: &str, width: usize) -> Result<Vec<String>> {
    if width == 0 {
        bail!("column width must be greater than zero");
    }

    let chars = output.chars().collect::<Vec<_>>();

    Ok(chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect::<String>().trim().to_string())
        .collect())
}
