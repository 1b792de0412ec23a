use crate::comparator::AheadForks;
use crate::ranker::RankedSet;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

const COLUMN_PADDING: usize = 1;

/// One row per ranked fork, `owner/name  +ahead -behind`, with the first
/// column padded to the widest key.
pub fn render(ranked: &RankedSet, results: &AheadForks) -> String {
    let rows: Vec<(&str, String)> = ranked
        .iter()
        .filter_map(|entry| {
            let counts = results.get(&entry.key)?.counts;
            Some((entry.key.as_str(), format!("+{} -{}", counts.ahead, counts.behind)))
        })
        .collect();

    let width = rows
        .iter()
        .map(|(key, _)| UnicodeWidthStr::width(*key))
        .max()
        .unwrap_or(0)
        + COLUMN_PADDING;

    let mut out = String::new();
    for (key, counts) in rows {
        out.push_str(key);
        out.push_str(&" ".repeat(width - UnicodeWidthStr::width(key)));
        out.push_str(&counts);
        out.push('\n');
    }
    out
}

/// Writes the whole table in one block.
pub fn write_report(out: &mut impl Write, ranked: &RankedSet, results: &AheadForks) -> io::Result<()> {
    out.write_all(render(ranked, results).as_bytes())?;
    out.flush()
}
