/// Shared helpers used across the codebase

/// Lower-case ASCII slug: letters and digits, runs of anything else collapse
/// to a single dash. May be empty when the input has no usable characters.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(80);
    slug.trim_end_matches('-').to_string()
}

/// `base`, or `base-2`, `base-3`, ... whichever is free first.
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = if base.is_empty() { "untitled" } else { base };
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Acme   Corp  "), "acme-corp");
        assert_eq!(slugify("Ünïcode ok"), "n-code-ok");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn unique_slug_appends_counter() {
        let taken = ["acme", "acme-2"];
        assert_eq!(unique_slug("acme", |s| taken.contains(&s)), "acme-3");
        assert_eq!(unique_slug("other", |s| taken.contains(&s)), "other");
        assert_eq!(unique_slug("", |_| false), "untitled");
    }
}
