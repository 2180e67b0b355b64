//! Filename sanitization (spec.md 4.9 step 3).

use crate::naming::GeneratedName;

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_PREFIX_LEN: usize = 50;

/// Replace reserved filesystem characters, fold whitespace runs to a
/// single underscore, and trim the generated prefix to `MAX_PREFIX_LEN`
/// characters. `name` carries the generated-prefix/original-base-and-
/// extension boundary explicitly (from `naming.rs`), so the original base
/// name and extension are left untouched no matter what characters they
/// contain — this function never re-derives that boundary by scanning
/// the combined string.
pub fn sanitize_filename(name: &GeneratedName) -> String {
    let cleaned: String = name
        .prefix
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let folded = fold_whitespace(&cleaned);
    let trimmed: String = folded.chars().take(MAX_PREFIX_LEN).collect();

    let rest_cleaned: String = name
        .base_and_ext
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();

    format!("{}{}", trimmed, rest_cleaned)
}

fn fold_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push('_');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(prefix: &str, base_and_ext: &str) -> GeneratedName {
        GeneratedName {
            prefix: prefix.to_string(),
            base_and_ext: base_and_ext.to_string(),
        }
    }

    #[test]
    fn reserved_characters_are_replaced() {
        let sanitized = sanitize_filename(&generated("bad:name?_", "clip.mp4"));
        assert!(!sanitized.chars().any(|c| RESERVED_CHARS.contains(&c)));
    }

    #[test]
    fn whitespace_runs_fold_to_single_underscore() {
        let sanitized = sanitize_filename(&generated("my   clip   name_", "take.mp4"));
        assert!(!sanitized.contains("  "));
    }

    #[test]
    fn long_prefix_is_trimmed_to_max_len() {
        let long_prefix = format!("{}_", "a".repeat(100));
        let sanitized = sanitize_filename(&generated(&long_prefix, "clip.mp4"));
        let prefix_len = sanitized.len() - "clip.mp4".len();
        assert_eq!(prefix_len, MAX_PREFIX_LEN);
    }

    #[test]
    fn original_base_name_with_underscores_is_never_folded_into_the_prefix_cap() {
        // Regression: the prefix/base boundary now comes from naming.rs
        // explicitly, so an underscore-heavy original filename can no
        // longer be mistaken for part of the generated prefix.
        let sanitized = sanitize_filename(&generated("x_", "longpart_of_the_real_name_b.mp4"));
        assert_eq!(sanitized, "x_longpart_of_the_real_name_b.mp4");
    }
}
