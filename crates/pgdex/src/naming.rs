//! Storage naming convention.
//!
//! Rust field and type identifiers are turned into Postgres names by
//! lower-casing them and inserting an underscore at every word boundary.

/// Convert a mixed-case identifier to its lower-case, underscore-separated form.
///
/// An ASCII upper-case character starts a new word when it is not the first
/// character and either the previous character or the next one is lower-case.
/// Runs of capitals (acronyms) therefore stay together, and the last capital
/// of a run splits off when a lower-case run follows it.
///
/// ```
/// use pgdex::underscore;
///
/// assert_eq!(underscore("UserID"), "user_id");
/// assert_eq!(underscore("HTTPServer"), "http_server");
/// assert_eq!(underscore("Name"), "name");
/// assert_eq!(underscore("created_at"), "created_at");
/// ```
pub fn underscore(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 5);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }

        let prev_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
        let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
        if i > 0 && (prev_lower || next_lower) {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}
