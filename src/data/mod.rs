mod attrs;
mod pois;
mod villages;

pub use attrs::{VillageAttrs, UNKNOWN_VILLAGE};
pub use pois::{PoiRecord, PoiTable};
pub use villages::VillageTable;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use log::debug;

/// Memoizing dataset loader. Loading the same shapefile path twice returns
/// the same shared table, so re-running the pipeline never re-reads inputs
/// mid-session. Changing the path naturally misses the cache.
#[derive(Debug, Default)]
pub struct Loader {
    villages: HashMap<PathBuf, Arc<VillageTable>>,
}

impl Loader {
    pub fn new() -> Self { Self::default() }

    /// Load (or re-use) the village table at `path`.
    pub fn load_villages(&mut self, path: &Path) -> Result<Arc<VillageTable>> {
        if let Some(table) = self.villages.get(path) {
            debug!("village table cache hit: {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(VillageTable::from_shapefile(path)?);
        self.villages.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }
}
