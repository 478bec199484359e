//! Template storage and loading.

use std::collections::HashMap;
use std::path::Path;

use image::GrayImage;
use log::{info, warn};

use crate::error::{PickerError, PickerResult};

/// A stored reference image used for correlation matching.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub category: String,
    pub image: GrayImage,
}

impl Template {
    pub fn new(name: impl Into<String>, category: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            image,
        }
    }

    /// Load a template from disk; the name is the file stem.
    pub fn from_file(path: &Path, category: &str) -> PickerResult<Self> {
        let image = image::open(path).map_err(|source| PickerError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Self::new(name, category, image.to_luma8()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Named template collection for the active season.
///
/// Loading a template under an existing name silently overwrites it.
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Template>,
}

impl TemplateLibrary {
    const SUPPORTED_EXTENSIONS: [&'static str; 3] = ["png", "jpg", "jpeg"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Load every supported image file from a directory.
    ///
    /// Per-file failures are logged and skipped; only an unreadable
    /// directory is an error. Returns the number of templates loaded.
    pub fn load_dir(&mut self, directory: &Path, category: &str) -> PickerResult<usize> {
        if !directory.is_dir() {
            return Err(PickerError::TemplateDirNotFound {
                path: directory.to_path_buf(),
            });
        }

        let entries =
            std::fs::read_dir(directory).map_err(|source| PickerError::TemplateDirRead {
                path: directory.to_path_buf(),
                source,
            })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !Self::is_supported(&path) {
                continue;
            }
            match Template::from_file(&path, category) {
                Ok(template) => {
                    self.insert(template);
                    loaded += 1;
                }
                Err(err) => warn!("skipping template: {err}"),
            }
        }

        info!("loaded {loaded} templates from {directory:?} as '{category}'");
        Ok(loaded)
    }

    fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                Self::SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|s| ext.eq_ignore_ascii_case(s))
            })
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn names_in_category(&self, category: &str) -> Vec<&str> {
        self.templates
            .values()
            .filter(|t| t.category == category)
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
        info!("template library cleared");
    }
}
