//! Prompt registry: named prompt templates loaded from a directory of
//! text files, memoized in-process, falling back to an embedded default
//! when the directory has no file for a given name.
//!
//! Shared between the analysis orchestrator (comprehensive/product/
//! scene/object/custom) and the folder matcher's semantic-judge prompt
//! (`folder_match`), since both render a `{contentDescription}`-style
//! template and only the folder matcher additionally needs `{folderList}`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::debug;

const COMPREHENSIVE_DEFAULT: &str = include_str!("prompts/comprehensive.txt");
const PRODUCT_DEFAULT: &str = include_str!("prompts/product.txt");
const SCENE_DEFAULT: &str = include_str!("prompts/scene.txt");
const OBJECT_DEFAULT: &str = include_str!("prompts/object.txt");
const FOLDER_MATCH_DEFAULT: &str = include_str!("prompts/folder_match.txt");

/// Which analysis prompt to run for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Comprehensive,
    Product,
    Scene,
    Object,
    Custom,
    FolderMatch,
}

impl PromptKind {
    pub fn name(&self) -> &'static str {
        match self {
            PromptKind::Comprehensive => "comprehensive",
            PromptKind::Product => "product",
            PromptKind::Scene => "scene",
            PromptKind::Object => "object",
            PromptKind::Custom => "custom",
            PromptKind::FolderMatch => "folder_match",
        }
    }

    fn embedded_default(&self) -> Option<&'static str> {
        match self {
            PromptKind::Comprehensive => Some(COMPREHENSIVE_DEFAULT),
            PromptKind::Product => Some(PRODUCT_DEFAULT),
            PromptKind::Scene => Some(SCENE_DEFAULT),
            PromptKind::Object => Some(OBJECT_DEFAULT),
            PromptKind::Custom => None,
            PromptKind::FolderMatch => Some(FOLDER_MATCH_DEFAULT),
        }
    }
}

/// Loads `<dir>/<name>.txt` templates on first use and caches them for
/// the registry's lifetime. A `Custom` prompt has no embedded default:
/// it must be present on disk or rendering fails.
pub struct PromptRegistry {
    dir: Option<PathBuf>,
    cache: RwLock<HashMap<&'static str, String>>,
}

impl PromptRegistry {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Render the named prompt's template with `{placeholder}` substitutions.
    pub fn render(&self, kind: PromptKind, placeholders: &HashMap<&str, String>) -> std::io::Result<String> {
        let template = self.template_for(kind)?;
        let mut rendered = template;
        for (key, value) in placeholders {
            rendered = rendered.replace(&format!("{{{}}}", key), value);
        }
        Ok(rendered)
    }

    fn template_for(&self, kind: PromptKind) -> std::io::Result<String> {
        if let Some(cached) = self.cache.read().unwrap().get(kind.name()) {
            return Ok(cached.clone());
        }

        let template = self.load_from_disk(kind)?.unwrap_or_else(|| kind.embedded_default().unwrap_or("").to_string());

        if template.is_empty() && kind.embedded_default().is_none() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no template on disk for custom prompt '{}'", kind.name()),
            ));
        }

        self.cache.write().unwrap().insert(kind.name(), template.clone());
        Ok(template)
    }

    fn load_from_disk(&self, kind: PromptKind) -> std::io::Result<Option<String>> {
        let Some(dir) = &self.dir else { return Ok(None) };
        let path = dir.join(format!("{}.txt", kind.name()));
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(prompt = kind.name(), path = %path.display(), "loaded prompt template from disk");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_default_is_used_with_no_directory() {
        let registry = PromptRegistry::new(None);
        let mut placeholders = HashMap::new();
        placeholders.insert("contentDescription", "a red car".to_string());
        let rendered = registry.render(PromptKind::Comprehensive, &placeholders).unwrap();
        assert!(rendered.contains("a red car"));
    }

    #[test]
    fn disk_template_overrides_embedded_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("comprehensive.txt"), "custom template: {contentDescription}").unwrap();

        let registry = PromptRegistry::new(Some(dir.path().to_path_buf()));
        let mut placeholders = HashMap::new();
        placeholders.insert("contentDescription", "a blue bike".to_string());
        let rendered = registry.render(PromptKind::Comprehensive, &placeholders).unwrap();
        assert_eq!(rendered, "custom template: a blue bike");
    }

    #[test]
    fn custom_without_disk_file_errors() {
        let registry = PromptRegistry::new(None);
        let err = registry.render(PromptKind::Custom, &HashMap::new()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn folder_match_template_has_folder_list_placeholder() {
        let registry = PromptRegistry::new(None);
        let mut placeholders = HashMap::new();
        placeholders.insert("contentDescription", "desc".to_string());
        placeholders.insert("folderList", "Folder A, Folder B".to_string());
        let rendered = registry.render(PromptKind::FolderMatch, &placeholders).unwrap();
        assert!(rendered.contains("Folder A, Folder B"));
    }
}
