//! Website documents stored as JSON files, one per restaurant.
//!
//! Layout: `<root>/<restaurant-uuid>.json`, holding the block array in the
//! same camelCase shape the HTTP API uses.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bistro_types::{ContentBlock, RestaurantId, TransportError};
use tracing::debug;

use crate::remote::WebsiteRemote;

#[derive(Clone, Debug)]
pub struct FsWebsiteRemote {
    root: PathBuf,
}

impl FsWebsiteRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, restaurant: RestaurantId) -> PathBuf {
        self.root.join(format!("{restaurant}.json"))
    }
}

#[async_trait]
impl WebsiteRemote for FsWebsiteRemote {
    async fn fetch(&self, restaurant: RestaurantId) -> Result<Vec<ContentBlock>, TransportError> {
        let path = self.path_for(restaurant);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no stored website at {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(
        &self,
        restaurant: RestaurantId,
        blocks: &[ContentBlock],
    ) -> Result<(), TransportError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(restaurant);
        let json = serde_json::to_vec_pretty(blocks)?;

        // Write beside the target and rename, so readers never see a torn file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("wrote {} blocks to {}", blocks.len(), path.display());
        Ok(())
    }
}
