// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{
    modules::error::{code::ErrorCode, MailboxResult},
    raise_error,
};

pub mod parts;

/// Raw MIME objects keyed by message ID.
///
/// Objects are written once per key. `delete` of a missing key succeeds.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> MailboxResult<Vec<u8>>;

    async fn put(&self, key: &str, data: &[u8]) -> MailboxResult<()>;

    async fn delete(&self, key: &str) -> MailboxResult<()>;
}

/// Blob store on top of a cacache directory.
pub struct DiskBlobStore {
    dir: PathBuf,
}

impl DiskBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn dir_str(&self) -> MailboxResult<&str> {
        self.dir.to_str().ok_or_else(|| {
            raise_error!(
                "Failed to convert blob dir to str".into(),
                ErrorCode::InternalError
            )
        })
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn get(&self, key: &str) -> MailboxResult<Vec<u8>> {
        match cacache::read(self.dir_str()?, key).await {
            Ok(data) => Ok(data),
            Err(cacache::Error::EntryNotFound(_, _)) => Err(raise_error!(
                format!("object '{}' not found", key),
                ErrorCode::NotFound
            )),
            Err(e) => Err(raise_error!(format!("{:#?}", e), ErrorCode::InternalError)),
        }
    }

    async fn put(&self, key: &str, data: &[u8]) -> MailboxResult<()> {
        let mut writer = cacache::Writer::create(self.dir_str()?, key)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        writer
            .write_all(data)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        writer
            .commit()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        debug!("stored object '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> MailboxResult<()> {
        let dir = self.dir_str()?;
        let exists = cacache::metadata(dir, key)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
            .is_some();
        if !exists {
            return Ok(());
        }
        cacache::RemoveOpts::new()
            .remove_fully(true)
            .remove(dir, key)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
    }
}
