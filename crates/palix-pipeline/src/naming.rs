//! Image recognition and bundle key derivation.

/// Whether `path` ends with `extension`.
pub fn is_recognized_image(path: &str, extension: &str, case_sensitive: bool) -> bool {
    strip_extension(base_name(path), extension, case_sensitive).is_some()
}

/// Derive the bundle key for an input path.
///
/// Takes the last `/`-separated segment, strips `extension` and collapses
/// every run of characters outside `[A-Za-z0-9_]` into a single `_`.
/// A name without the extension is sanitized whole.
pub fn sanitize_name(path: &str, extension: &str, case_sensitive: bool) -> String {
    let base = base_name(path);
    let stem = strip_extension(base, extension, case_sensitive).unwrap_or(base);

    let mut out = String::with_capacity(stem.len());
    let mut in_run = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn strip_extension<'a>(name: &'a str, extension: &str, case_sensitive: bool) -> Option<&'a str> {
    if case_sensitive {
        return name.strip_suffix(extension);
    }
    let split = name.len().checked_sub(extension.len())?;
    let (stem, suffix) = (name.get(..split)?, name.get(split..)?);
    suffix.eq_ignore_ascii_case(extension).then_some(stem)
}
