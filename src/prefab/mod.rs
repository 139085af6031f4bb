//! Prefab templates and the services used to look them up.
//!
//! A template is a hierarchical JSON document describing a composable object graph. It is
//! identified by a numeric [`TemplateId`] and by the relative path of the file it was loaded
//! from. The spawnable container only reads templates, through the [`TemplateStore`] trait.

pub mod path;

pub mod prelude {
    pub use super::path::{PathResolver, ProjectPathResolver};
    pub use super::{PrefabDom, Template, TemplateId, TemplateLibrary, TemplateStore};
    pub use super::INVALID_TEMPLATE_ID;
}

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::errors::*;
use crate::utils::prelude::FastHashMap;

pub type TemplateId = u64;

/// The identifier that never refers to a template.
pub const INVALID_TEMPLATE_ID: TemplateId = 0;

/// The in-memory representation of a prefab document.
pub type PrefabDom = serde_json::Value;

/// An immutable prefab document.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    id: TemplateId,
    file_path: PathBuf,
    dom: PrefabDom,
}

impl Template {
    pub fn new<T: Into<PathBuf>>(id: TemplateId, file_path: T, dom: PrefabDom) -> Self {
        Template {
            id,
            file_path: file_path.into(),
            dom,
        }
    }

    #[inline]
    pub fn id(&self) -> TemplateId {
        self.id
    }

    #[inline]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    #[inline]
    pub fn prefab_dom(&self) -> &PrefabDom {
        &self.dom
    }

    /// Returns true if the document is a JSON object, the only valid root of a prefab.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.dom.is_object()
    }
}

/// The store owning all the prefab templates.
pub trait TemplateStore: Send + Sync {
    /// Returns the template with identifier `id` if exists.
    fn find_template(&self, id: TemplateId) -> Option<Arc<Template>>;

    /// Returns the identifier of the template loaded from the relative path `path`, or
    /// `INVALID_TEMPLATE_ID` if there is none.
    fn template_id_from_file_path(&self, path: &Path) -> TemplateId;
}

/// A `TemplateStore` keeping its templates in memory.
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    tables: RwLock<TemplateTables>,
}

#[derive(Debug, Default)]
struct TemplateTables {
    templates: FastHashMap<TemplateId, Arc<Template>>,
    paths: FastHashMap<PathBuf, TemplateId>,
    last_id: TemplateId,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        TemplateLibrary::default()
    }

    /// Adds a template loaded from relative path `file_path`. If the path has been added before,
    /// its document is replaced and the identifier is kept.
    pub fn add_template<T: Into<PathBuf>>(&self, file_path: T, dom: PrefabDom) -> TemplateId {
        let file_path = file_path.into();
        let mut tables = self.tables.write().unwrap();

        let id = match tables.paths.get(&file_path).cloned() {
            Some(id) => id,
            None => {
                tables.last_id += 1;
                tables.last_id
            }
        };

        tables.insert(Template::new(id, file_path, dom));
        id
    }

    /// Adds a template with a caller chosen identifier, replacing the template that used to be
    /// stored under `id` or `file_path`.
    pub fn add_template_with_id<T: Into<PathBuf>>(
        &self,
        id: TemplateId,
        file_path: T,
        dom: PrefabDom,
    ) -> Result<TemplateId> {
        if id == INVALID_TEMPLATE_ID {
            bail!("Template id {} is reserved.", INVALID_TEMPLATE_ID);
        }

        let file_path = file_path.into();
        let mut tables = self.tables.write().unwrap();
        if let Some(prev) = tables.paths.get(&file_path).cloned() {
            if prev != id {
                tables.templates.remove(&prev);
            }
        }

        tables.last_id = tables.last_id.max(id);
        tables.insert(Template::new(id, file_path, dom));
        Ok(id)
    }

    /// Parses a JSON prefab document from `file` and adds it under `file_path`.
    pub fn load_template<T: Into<PathBuf>>(
        &self,
        file_path: T,
        file: &mut dyn Read,
    ) -> Result<TemplateId> {
        let file_path = file_path.into();
        let dom: PrefabDom = serde_json::from_reader(file)?;
        if !dom.is_object() {
            bail!(
                "Prefab '{}' must have an object as its root.",
                file_path.display()
            );
        }

        Ok(self.add_template(file_path, dom))
    }

    /// Removes the template `id` from this library.
    pub fn remove_template(&self, id: TemplateId) -> Option<Arc<Template>> {
        let mut tables = self.tables.write().unwrap();
        let template = tables.templates.remove(&id)?;
        tables.paths.remove(template.file_path());
        Some(template)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tables.read().unwrap().templates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateTables {
    fn insert(&mut self, template: Template) {
        if let Some(prev) = self.templates.get(&template.id) {
            if prev.file_path != template.file_path {
                let path = prev.file_path.clone();
                self.paths.remove(&path);
            }
        }

        self.paths.insert(template.file_path.clone(), template.id);
        self.templates.insert(template.id, Arc::new(template));
    }
}

impl TemplateStore for TemplateLibrary {
    fn find_template(&self, id: TemplateId) -> Option<Arc<Template>> {
        self.tables.read().unwrap().templates.get(&id).cloned()
    }

    fn template_id_from_file_path(&self, path: &Path) -> TemplateId {
        self.tables
            .read()
            .unwrap()
            .paths
            .get(path)
            .cloned()
            .unwrap_or(INVALID_TEMPLATE_ID)
    }
}
