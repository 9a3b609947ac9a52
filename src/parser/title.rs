use std::sync::LazyLock;

use regex::Regex;

use super::normalize::fix_title_spacing;

static ROLE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Sub-?Clause|Clause|Article|Section)?\s*(\d+(?:\.\d+)*)\.?\s*(.*)$").unwrap()
});
static BARE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)\.?\s*(.*)$").unwrap());

/// Split `"Sub-Clause 20.1 Payment Terms"` into `("20.1", "Payment Terms")`.
///
/// A remainder shorter than two characters is treated as noise and yields no
/// title. Text without a leading number comes back whole as the title.
pub fn separate_clause_number_and_title(text: &str) -> (Option<String>, Option<String>) {
    let text = text.trim();
    if text.is_empty() {
        return (None, None);
    }

    for re in [&*ROLE_NUMBER_RE, &*BARE_NUMBER_RE] {
        if let Some(caps) = re.captures(text) {
            let number = caps[1].to_string();
            let rest = caps[2].trim();
            let title = if rest.chars().count() < 2 {
                None
            } else {
                Some(fix_title_spacing(rest))
            };
            return (Some(number), title);
        }
    }

    (None, Some(fix_title_spacing(text)))
}
