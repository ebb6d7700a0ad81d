//! Keyword scenario classification

use specforge_core_types::Category;

const NEGATIVE: &[&str] = &["negative", "invalid"];
const BOUNDARY: &[&str] = &["boundary", "max", "min", "maximum", "minimum"];
const END_TO_END: &[&str] = &["e2e", "end_to_end"];

/// An explicit recognized category wins; otherwise the first keyword family
/// found in title, id or tags (negative, then boundary, then end-to-end).
pub fn classify(explicit: Option<&str>, title: &str, id: &str, tags: &[String]) -> Category {
    if let Some(category) = explicit.and_then(Category::parse) {
        return category;
    }
    let mut tokens = Vec::new();
    for text in std::iter::once(title)
        .chain(std::iter::once(id))
        .chain(tags.iter().map(String::as_str))
    {
        tokens.extend(tokenize(text));
    }
    let has = |family: &[&str]| tokens.iter().any(|token| family.contains(&token.as_str()));
    if has(NEGATIVE) {
        Category::Negative
    } else if has(BOUNDARY) {
        Category::Boundary
    } else if has(END_TO_END) {
        Category::EndToEnd
    } else {
        Category::HappyPath
    }
}

/// Lowercase words; `end-to-end` and `end_to_end` also yield `end_to_end`.
fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase().replace('-', "_");
    let mut tokens = Vec::new();
    for word in lower.split(|c: char| !c.is_alphanumeric() && c != '_') {
        if word.is_empty() {
            continue;
        }
        if word.contains("end_to_end") {
            tokens.push("end_to_end".to_string());
        }
        tokens.extend(
            word.split('_')
                .filter(|part| !part.is_empty())
                .map(str::to_string),
        );
    }
    tokens
}
