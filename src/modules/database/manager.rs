// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::table::StoredItem;
use crate::modules::error::{code::ErrorCode, MailboxError, MailboxResult};
use crate::raise_error;
use native_db::{Builder, Database, Models};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::info;

static META_MODELS: OnceLock<Models> = OnceLock::new();

fn meta_models() -> MailboxResult<&'static Models> {
    if let Some(models) = META_MODELS.get() {
        return Ok(models);
    }
    let mut models = Models::new();
    models
        .define::<StoredItem>()
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
    // another thread may have won the race; either definition is identical
    let _ = META_MODELS.set(models);
    META_MODELS.get().ok_or_else(|| {
        raise_error!(
            "metadata models are not initialised".into(),
            ErrorCode::InternalError
        )
    })
}

pub struct DatabaseManager;

impl DatabaseManager {
    /// Opens the metadata table file, creating it when absent.
    pub fn open(path: &Path, cache_size: usize) -> MailboxResult<Arc<Database<'static>>> {
        let mut database = Builder::new()
            .set_cache_size(cache_size.max(67108864))
            .create(meta_models()?, path)
            .map_err(Self::handle_database_error)?;
        database
            .compact()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        info!("[metadata] Opened table at {:?}", path);
        Ok(Arc::new(database))
    }

    pub fn open_in_memory() -> MailboxResult<Arc<Database<'static>>> {
        let database = Builder::new()
            .create_in_memory(meta_models()?)
            .map_err(Self::handle_database_error)?;
        info!("[metadata] Opened in-memory table");
        Ok(Arc::new(database))
    }

    fn handle_database_error(error: native_db::db_type::Error) -> MailboxError {
        match error {
            native_db::db_type::Error::RedbDatabaseError(database_error) => match database_error {
                redb::DatabaseError::DatabaseAlreadyOpen => {
                    raise_error!(
                        "Database is already open by another instance".into(),
                        ErrorCode::InternalError
                    )
                }
                other => {
                    raise_error!(
                        format!("Database error: {:?}", other),
                        ErrorCode::InternalError
                    )
                }
            },
            other => {
                raise_error!(
                    format!("Failed to create database: {:?}", other),
                    ErrorCode::InternalError
                )
            }
        }
    }
}
