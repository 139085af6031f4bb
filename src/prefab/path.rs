//! Turns the raw paths handed to the container into the relative paths templates are keyed by.

use std::path::{Path, PathBuf};

use inlinable_string::InlinableString;

use crate::errors::*;
use crate::utils::prelude::FastHashMap;

/// Resolves a raw, possibly absolute or aliased, path into a path relative to the project.
pub trait PathResolver: Send + Sync {
    fn generate_relative_path(&self, path: &str) -> PathBuf;
}

/// A `PathResolver` that expands shortcuts and strips the project root.
///
/// Shortcuts are path aliases like `prefabs:` that could be resolved into full path. They are
/// expanded recursively, so a shortcut could be defined in terms of another one.
#[derive(Debug, Default, Clone)]
pub struct ProjectPathResolver {
    root: PathBuf,
    shortcuts: FastHashMap<InlinableString, InlinableString>,
}

impl ProjectPathResolver {
    /// Creates a new resolver of paths under the project directory `root`.
    pub fn new<T: Into<PathBuf>>(root: T) -> Self {
        ProjectPathResolver {
            root: root.into(),
            shortcuts: FastHashMap::default(),
        }
    }

    /// Gets the project directory.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add or replace a shortcut definition.
    pub fn add<T1, T2>(&mut self, shortcut: T1, fullname: T2) -> Result<()>
    where
        T1: AsRef<str>,
        T2: AsRef<str>,
    {
        let shortcut = shortcut.as_ref();
        let fullname = fullname.as_ref();

        if !shortcut.ends_with(':') {
            bail!("Shortcut MUST ends with a colon (':').");
        }

        if shortcut.len() < 2 {
            bail!("Shortcut MUST be at least 2 chars to not be confused with DOS drive letters.");
        }

        if !fullname.ends_with(':') && !fullname.ends_with('/') {
            bail!("Fullname must end in a '/' (dir) or ':' (other shortcut).");
        }

        self.shortcuts.insert(shortcut.into(), fullname.into());
        Ok(())
    }

    /// Checks if a shortcut exists.
    #[inline]
    pub fn has<T: AsRef<str>>(&self, shortcut: T) -> bool {
        self.shortcuts.contains_key(shortcut.as_ref())
    }

    /// Resolve shortcuts in the provided string recursively and return None if any of them is
    /// undefined.
    pub fn resolve<T: AsRef<str>>(&self, src: T) -> Option<String> {
        let mut dst = src.as_ref().to_owned();
        // Every expansion consumes one definition, more passes than definitions means a cycle.
        for _ in 0..=self.shortcuts.len() {
            let index = match dst.find(':') {
                Some(index) => index,
                None => return Some(dst),
            };

            let fullname = self.shortcuts.get(&dst[0..=index])?.to_string();
            dst.replace_range(0..=index, &fullname);

            // Directories are final, drive letters like `C:` must not be resolved again.
            if !fullname.ends_with(':') {
                return Some(dst);
            }
        }

        warn!("[ProjectPathResolver] cyclic shortcut found in '{}'.", src.as_ref());
        None
    }
}

impl PathResolver for ProjectPathResolver {
    fn generate_relative_path(&self, path: &str) -> PathBuf {
        let resolved = self
            .resolve(path)
            .unwrap_or_else(|| path.to_owned())
            .replace('\\', "/");

        let resolved = PathBuf::from(resolved);
        match resolved.strip_prefix(&self.root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => resolved,
        }
    }
}
