//! Instruction prompt for the title filter.

/// Ingredients named in the exclusion instruction.
pub const DISALLOWED_INGREDIENTS: &[&str] = &["pork", "bacon", "ham", "lard", "wine", "beer", "rum"];

/// Build the filter prompt for `titles`.
///
/// The prompt always asks for a bare JSON array of surviving titles and ends
/// with the full input list as pretty-printed JSON.
pub fn build_filter_prompt(titles: &[String], dedupe: bool, exclude_disallowed: bool) -> String {
    let mut prompt = String::from("You are a content filter. ");

    if dedupe {
        prompt.push_str("Deduplicate this list of recipe titles. Remove exact and near duplicates. ");
    }

    if exclude_disallowed {
        prompt.push_str(&format!(
            "Exclude any recipes containing {}, or alcoholic ingredients. ",
            DISALLOWED_INGREDIENTS.join(", ")
        ));
    }

    prompt.push_str("Return the cleaned list as a JSON array of strings (just the titles). ");
    prompt.push_str("Here is the list:\n\n");
    // Serializing a slice of strings cannot fail.
    prompt.push_str(&serde_json::to_string_pretty(titles).unwrap_or_else(|_| "[]".into()));
    prompt
}
