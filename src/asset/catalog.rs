//! The catalog of all the assets known to the host, indexed by identity and by relative path.

use std::sync::RwLock;

use crate::utils::prelude::FastHashMap;

use super::{AssetId, AssetInfo};

/// The catalog of all the assets known to the host, indexed by identity and by relative path.
///
/// Registrations made by a caller are never dropped implicitly, it is the caller's
/// responsibility to unregister the identity once the asset is gone.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    tables: RwLock<CatalogTables>,
}

#[derive(Debug, Default)]
struct CatalogTables {
    infos: FastHashMap<AssetId, AssetInfo>,
    paths: FastHashMap<String, AssetId>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        AssetCatalog::default()
    }

    /// Adds or replaces the record of `id`.
    pub fn register_asset(&self, id: AssetId, mut info: AssetInfo) {
        info.id = id;
        let path = normalize(&info.relative_path);

        let mut tables = self.tables.write().unwrap();
        if let Some(prev) = tables.infos.insert(id, info) {
            let prev = normalize(&prev.relative_path);
            if prev != path && tables.paths.get(&prev) == Some(&id) {
                tables.paths.remove(&prev);
            }
        }

        tables.paths.insert(path, id);
    }

    /// Removes the record of `id`, and returns it if exists.
    pub fn unregister_asset(&self, id: AssetId) -> Option<AssetInfo> {
        let mut tables = self.tables.write().unwrap();
        let info = tables.infos.remove(&id)?;

        let path = normalize(&info.relative_path);
        if tables.paths.get(&path) == Some(&id) {
            tables.paths.remove(&path);
        }

        Some(info)
    }

    /// Checks if `id` has been registered in this catalog.
    #[inline]
    pub fn contains(&self, id: AssetId) -> bool {
        self.tables.read().unwrap().infos.contains_key(&id)
    }

    #[inline]
    pub fn asset_info(&self, id: AssetId) -> Option<AssetInfo> {
        self.tables.read().unwrap().infos.get(&id).cloned()
    }

    /// Returns the identity registered under relative path `path`.
    #[inline]
    pub fn asset_id_by_path<T: AsRef<str>>(&self, path: T) -> Option<AssetId> {
        let path = normalize(path.as_ref());
        self.tables.read().unwrap().paths.get(&path).cloned()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tables.read().unwrap().infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asset::AssetType;
    use uuid::Uuid;

    #[test]
    fn basic() {
        let catalog = AssetCatalog::new();
        let id = AssetId::new(Uuid::new_v4(), 1);

        catalog.register_asset(id, AssetInfo::new(id, AssetType::spawnable(), "Hero.spawnable"));
        assert!(catalog.contains(id));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.asset_id_by_path("hero.spawnable"), Some(id));
        assert_eq!(
            catalog.asset_info(id).map(|v| v.relative_path),
            Some("Hero.spawnable".to_owned())
        );

        assert!(catalog.unregister_asset(id).is_some());
        assert!(catalog.unregister_asset(id).is_none());
        assert!(catalog.is_empty());
        assert_eq!(catalog.asset_id_by_path("Hero.spawnable"), None);
    }

    #[test]
    fn reregister_moves_path() {
        let catalog = AssetCatalog::new();
        let id = AssetId::new(Uuid::new_v4(), 0);

        catalog.register_asset(id, AssetInfo::new(id, AssetType::nil(), "a\\b.asset"));
        assert_eq!(catalog.asset_id_by_path("a/b.asset"), Some(id));

        catalog.register_asset(id, AssetInfo::new(id, AssetType::nil(), "c.asset"));
        assert_eq!(catalog.asset_id_by_path("a/b.asset"), None);
        assert_eq!(catalog.asset_id_by_path("c.asset"), Some(id));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn path_shadowing() {
        let catalog = AssetCatalog::new();
        let id1 = AssetId::new(Uuid::new_v4(), 0);
        let id2 = AssetId::new(Uuid::new_v4(), 0);

        catalog.register_asset(id1, AssetInfo::new(id1, AssetType::nil(), "x.asset"));
        catalog.register_asset(id2, AssetInfo::new(id2, AssetType::nil(), "x.asset"));
        assert_eq!(catalog.asset_id_by_path("x.asset"), Some(id2));

        // Unregistering the shadowed identity keeps the newer path mapping.
        catalog.unregister_asset(id1);
        assert_eq!(catalog.asset_id_by_path("x.asset"), Some(id2));
    }
}
