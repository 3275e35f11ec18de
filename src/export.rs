//! CSV export of result titles.

use recipe_search::SearchResult;

/// Suggested file name for a titles export.
pub const EXPORT_FILE_NAME: &str = "recipe_titles.csv";

/// Render `results` as a one-column CSV: a `title` header, then one quoted
/// row per result with embedded quotes doubled. Rows are separated by `\n`
/// with no trailing newline.
#[must_use]
pub fn titles_csv(results: &[SearchResult]) -> String {
    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push("title".to_owned());
    lines.extend(
        results
            .iter()
            .map(|r| format!("\"{}\"", r.title.replace('"', "\"\""))),
    );
    lines.join("\n")
}
