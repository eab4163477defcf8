//! Filesystem- and archive-safe filename sanitization.

/// Linux NAME_MAX; also the default bound for archive entry names.
pub const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename for use on disk and as a ZIP entry name.
///
/// - Replaces NUL, `/`, `\`, control characters and whitespace with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing spaces, dots and underscores
/// - Limits length to `max_bytes`, keeping a short extension when truncating
///
/// May return an empty string; callers pick a fallback.
pub fn sanitize_filename(name: &str, max_bytes: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '\0' || c == '/' || c == '\\' || c.is_control();
        let replacement = if unsafe_char || c.is_whitespace() {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');
    truncate_keeping_extension(trimmed, max_bytes.max(1))
}

fn truncate_keeping_extension(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }
    let ext = name
        .rfind('.')
        .map(|i| &name[i..])
        .filter(|ext| ext.len() <= 16 && ext.len() < max_bytes);
    let ext = ext.unwrap_or("");
    let mut take = max_bytes - ext.len();
    while take > 0 && !name.is_char_boundary(take) {
        take -= 1;
    }
    let stem = name[..take].trim_end_matches(|c| c == '.' || c == '_');
    format!("{}{}", stem, ext)
}
