//! Browser LocalStorage backend

use anyhow::anyhow;

use super::Storage;

/// Keys are namespaced so several games can share an origin
const KEY_PREFIX: &str = "tower_drop_";

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> anyhow::Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| anyhow!("no window"))?
            .local_storage()
            .map_err(|e| anyhow!("LocalStorage unavailable: {:?}", e))?
            .ok_or_else(|| anyhow!("LocalStorage disabled"))
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Self::storage()?
            .get_item(&format!("{KEY_PREFIX}{key}"))
            .map_err(|e| anyhow!("reading {}: {:?}", key, e))
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        Self::storage()?
            .set_item(&format!("{KEY_PREFIX}{key}"), value)
            .map_err(|e| anyhow!("writing {}: {:?}", key, e))
    }
}
