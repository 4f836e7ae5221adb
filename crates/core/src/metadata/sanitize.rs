//! Field sanitation.

/// Redundant edition marker stripped from every field.
const EDITION_MARKER: &str = "(Unabridged)";

/// Normalizes a raw metadata value.
///
/// In order: drops every `/`, drops every `(Unabridged)`, trims, and collapses
/// internal whitespace runs to one space. The marker is removed until none
/// is left, so `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let mut value: String = raw.chars().filter(|c| *c != '/').collect();

    while value.contains(EDITION_MARKER) {
        value = value.replace(EDITION_MARKER, "");
    }

    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitizes a title for use as a filename.
///
/// On top of [`sanitize`], colons become dashes and `- ` collapses to `-`.
pub fn sanitize_title(raw: &str) -> String {
    sanitize(raw).replace(':', "-").replace("- ", "-")
}
