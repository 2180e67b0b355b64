//! Destination filename generation per naming mode (spec.md 4.9).

use chrono::{DateTime, Utc};
use reelsort_core::{AnalysisResult, NamingMode};

const EXTENSION_WHITELIST: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v"];
const DEFAULT_EXTENSION: &str = "mp4";

/// A caller-supplied filename generator for `NamingMode::Custom`.
pub type CustomNamer = dyn Fn(&str, Option<&AnalysisResult>) -> String + Send + Sync;

/// The two parts of a generated filename, kept separate so
/// `sanitize_filename` knows exactly where the generated prefix ends and
/// the original base name begins, rather than having to guess the
/// boundary back out of one concatenated string. `prefix` already
/// carries whatever separator joins it to `base_and_ext` (e.g. a
/// trailing `_`), so the two fields are meant to be concatenated
/// directly, with no separator logic applied a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    /// The part this module generated: a category/keyword prefix (plus
    /// its trailing `_`), a whole timestamp stem, or a custom namer's
    /// entire output. Empty when the mode doesn't prepend anything.
    pub prefix: String,
    /// The original base name plus normalized extension, untouched by
    /// generation and never truncated. Empty when the mode has no
    /// original-name component (`Custom`), or just the extension when
    /// the mode replaces the base name outright (`Timestamp`).
    pub base_and_ext: String,
}

impl GeneratedName {
    pub fn into_combined(self) -> String {
        format!("{}{}", self.prefix, self.base_and_ext)
    }
}

/// Generate a destination filename (before sanitization) for `original_path`.
///
/// `custom` is only consulted for `NamingMode::Custom`; it is not called
/// otherwise, so callers are free to pass `None` when not using that mode.
pub fn generate_filename(
    original_path: &str,
    mode: NamingMode,
    analysis: Option<&AnalysisResult>,
    custom: Option<&CustomNamer>,
) -> GeneratedName {
    generate_filename_at(original_path, mode, analysis, custom, Utc::now())
}

/// Same as [`generate_filename`] but with the timestamp-mode clock
/// supplied explicitly, so tests can assert on an exact filename.
pub fn generate_filename_at(
    original_path: &str,
    mode: NamingMode,
    analysis: Option<&AnalysisResult>,
    custom: Option<&CustomNamer>,
    now: DateTime<Utc>,
) -> GeneratedName {
    let base = base_name(original_path);
    let ext = normalize_extension(original_path);
    let base_and_ext = format!("{}.{}", base, ext);

    match mode {
        NamingMode::PreserveOriginal => GeneratedName {
            prefix: String::new(),
            base_and_ext,
        },
        NamingMode::Smart => GeneratedName {
            prefix: format!("{}_", smart_prefix(analysis)),
            base_and_ext,
        },
        NamingMode::ContentBased => {
            let descriptors = content_descriptors(analysis);
            if descriptors.is_empty() {
                GeneratedName {
                    prefix: String::new(),
                    base_and_ext,
                }
            } else {
                GeneratedName {
                    prefix: format!("{}_", descriptors.join("_")),
                    base_and_ext,
                }
            }
        }
        NamingMode::Timestamp => GeneratedName {
            prefix: format!("video_{}", now.format("%Y%m%dT%H%M%SZ")),
            base_and_ext: format!(".{}", ext),
        },
        NamingMode::Custom => {
            let namer = custom.expect("NamingMode::Custom requires a custom namer");
            GeneratedName {
                prefix: namer(original_path, analysis),
                base_and_ext: String::new(),
            }
        }
    }
}

fn base_name(original_path: &str) -> String {
    std::path::Path::new(original_path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string())
}

fn normalize_extension(original_path: &str) -> String {
    std::path::Path::new(original_path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| EXTENSION_WHITELIST.contains(&e.as_str()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn smart_prefix(analysis: Option<&AnalysisResult>) -> String {
    analysis
        .and_then(|a| {
            if !a.summary.category.is_empty() {
                Some(a.summary.category.clone())
            } else if let Some(kw) = a.summary.keywords.first() {
                Some(kw.clone())
            } else {
                a.objects.first().map(|o| o.name.clone())
            }
        })
        .unwrap_or_else(|| "clip".to_string())
}

fn content_descriptors(analysis: Option<&AnalysisResult>) -> Vec<String> {
    let Some(a) = analysis else { return Vec::new() };
    let mut descriptors = Vec::new();
    if !a.summary.category.is_empty() {
        descriptors.push(a.summary.category.clone());
    }
    if let Some(obj) = a.objects.first() {
        descriptors.push(obj.name.clone());
    }
    descriptors.truncate(2);
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsort_core::Summary;

    fn analysis_with_category(category: &str) -> AnalysisResult {
        let mut a = AnalysisResult::new("seg1", "model-a", "fp1");
        a.summary = Summary {
            description: String::new(),
            keywords: vec![],
            topics: vec![],
            mood: String::new(),
            category: category.to_string(),
        };
        a
    }

    #[test]
    fn preserve_original_keeps_base_and_normalized_extension() {
        let name = generate_filename("/in/clip.MP4", NamingMode::PreserveOriginal, None, None);
        assert_eq!(name.prefix, "");
        assert_eq!(name.into_combined(), "clip.mp4");
    }

    #[test]
    fn unknown_extension_falls_back_to_mp4() {
        let name = generate_filename("/in/clip.xyz", NamingMode::PreserveOriginal, None, None);
        assert_eq!(name.into_combined(), "clip.mp4");
    }

    #[test]
    fn smart_mode_prefixes_with_category() {
        let analysis = analysis_with_category("product");
        let name = generate_filename("/in/clip.mp4", NamingMode::Smart, Some(&analysis), None);
        assert_eq!(name.prefix, "product_");
        assert_eq!(name.base_and_ext, "clip.mp4");
        assert_eq!(name.into_combined(), "product_clip.mp4");
    }

    #[test]
    fn smart_mode_prefix_split_survives_underscores_in_the_original_name() {
        let analysis = analysis_with_category("x");
        let name = generate_filename(
            "/in/longpart_of_the_real_name_b.mp4",
            NamingMode::Smart,
            Some(&analysis),
            None,
        );
        assert_eq!(name.prefix, "x_");
        assert_eq!(name.base_and_ext, "longpart_of_the_real_name_b.mp4");
    }

    #[test]
    fn timestamp_mode_formats_compact_utc() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let name = generate_filename_at("/in/clip.mp4", NamingMode::Timestamp, None, None, now);
        assert_eq!(name.into_combined(), "video_20260102T030405Z.mp4");
    }

    #[test]
    fn custom_mode_invokes_the_supplied_closure() {
        let namer: Box<CustomNamer> = Box::new(|path, _| format!("custom_{}", path));
        let name = generate_filename("x.mp4", NamingMode::Custom, None, Some(&*namer));
        assert_eq!(name.into_combined(), "custom_x.mp4");
    }
}
