//! Label to field-name normalization.

/// Turns a form label into a query-safe field name.
///
/// - Lower-cases the label
/// - Replaces each run of whitespace with a single `_`
/// - Drops every character outside `[a-z0-9_]`
pub fn sanitize_field_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_whitespace = false;

    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            out.push(c);
        }
    }

    out
}
