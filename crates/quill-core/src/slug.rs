//! URL slug generation.
//!
//! `generate_slug` derives a URL-safe identifier from free text;
//! `generate_unique_slug` resolves collisions against a known set by suffix
//! counting. Callers that probe a backing store instead of a preloaded set
//! use `candidates`, which yields the same sequence one value at a time, so
//! the behavior is equivalent to checking the entire persisted slug set.
//! Either way the store's unique constraint remains the authoritative
//! backstop.

use std::collections::HashSet;

use uuid::Uuid;

/// Convert arbitrary text into a URL-safe slug: lower-cased, every run of
/// non-alphanumeric characters collapsed to a single hyphen, no leading or
/// trailing hyphen.
///
/// Fully-symbolic input yields an empty string; callers must substitute
/// [`fallback_slug`] before persisting.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut gap = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }

    slug
}

/// The candidate sequence for a base slug: `base`, `base-2`, `base-3`, ...
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((2u64..).map(move |n| format!("{base}-{n}")))
}

/// Return `base` unchanged if it is not taken, otherwise the first suffixed
/// candidate absent from `taken`.
pub fn generate_unique_slug(base: &str, taken: &HashSet<String>) -> String {
    candidates(base)
        .find(|candidate| !taken.contains(candidate))
        .expect("candidate sequence is infinite")
}

/// Replacement slug for titles that slugify to nothing.
pub fn fallback_slug(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(slug: &str) -> bool {
        !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn slugifies_title_with_punctuation() {
        assert_eq!(
            generate_slug("Modern Surveillance Techniques!"),
            "modern-surveillance-techniques"
        );
    }

    #[test]
    fn collapses_symbol_runs_and_trims_hyphens() {
        assert_eq!(generate_slug("  Hello --- World!!  "), "hello-world");
        assert_eq!(generate_slug("A&B, C/D"), "a-b-c-d");
        assert_eq!(generate_slug("Caf\u{e9} au lait"), "caf-au-lait");
    }

    #[test]
    fn output_is_always_well_formed() {
        for input in [
            "Modern Surveillance Techniques!",
            "--already--hyphenated--",
            "MiXeD CaSe 123",
            "unicode \u{2014} d\u{e9}j\u{e0} vu",
            "trailing symbols!!!",
        ] {
            let slug = generate_slug(input);
            assert!(is_well_formed(&slug), "bad slug {slug:?} from {input:?}");
        }
    }

    #[test]
    fn symbol_only_input_yields_empty() {
        assert_eq!(generate_slug("!!! ??? ***"), "");
        assert_eq!(generate_slug(""), "");
    }

    #[test]
    fn unique_slug_is_identity_when_free() {
        let taken = HashSet::new();
        assert_eq!(generate_unique_slug("my-post", &taken), "my-post");
    }

    #[test]
    fn unique_slug_suffixes_on_collision() {
        let taken: HashSet<String> = ["my-post".to_string()].into_iter().collect();
        assert_eq!(generate_unique_slug("my-post", &taken), "my-post-2");

        let taken: HashSet<String> = ["my-post", "my-post-2", "my-post-3"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(generate_unique_slug("my-post", &taken), "my-post-4");
    }

    #[test]
    fn unique_slug_never_returns_taken_value() {
        let taken: HashSet<String> = (0..20)
            .map(|n| {
                if n == 0 {
                    "base".to_string()
                } else {
                    format!("base-{}", n + 1)
                }
            })
            .collect();
        let slug = generate_unique_slug("base", &taken);
        assert!(!taken.contains(&slug));
    }

    #[test]
    fn fallback_slug_is_nonempty_and_well_formed() {
        let slug = fallback_slug("post");
        assert!(slug.starts_with("post-"));
        assert!(is_well_formed(&slug));
    }
}
