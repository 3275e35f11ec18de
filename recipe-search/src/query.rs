//! Query text composition for one date window.

use crate::types::DateWindow;

/// Compose the effective query for one window.
///
/// The result is the keyword, then the extra clause (if any), then an
/// `after:<date> before:<date>` pair when the window carries both bounds.
/// Dates are not validated; they reach the provider exactly as given.
pub fn build_query(keyword: &str, extra_clause: Option<&str>, window: Option<&DateWindow>) -> String {
    let mut query = keyword.to_string();

    if let Some(clause) = extra_clause.filter(|c| !c.trim().is_empty()) {
        query.push(' ');
        query.push_str(clause);
    }

    if let Some((after, before)) = window.and_then(DateWindow::bounds) {
        query.push_str(&format!(" after:{after} before:{before}"));
    }

    query
}
