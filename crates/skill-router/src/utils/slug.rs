const MAX_SLUG_LEN: usize = 60;
const FALLBACK_SLUG: &str = "issue";

/// Reduce free text to a file-name-safe slug of `[a-z0-9-]`.
///
/// Runs of any other character become a single `-`; leading and trailing
/// dashes are dropped. Empty results fall back to `"issue"`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            let needs_dash = pending_dash && !slug.is_empty();
            let width = if needs_dash { 2 } else { 1 };
            if slug.len() + width > MAX_SLUG_LEN {
                break;
            }
            if needs_dash {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
