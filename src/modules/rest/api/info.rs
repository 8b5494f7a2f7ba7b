// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::{payload::Json, Object, OpenApi};
use serde::{Deserialize, Serialize};

use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::rustmailbox_version;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct Info {
    pub version: String,
    pub commit: String,
    pub build: String,
}

pub struct InfoApi;

#[OpenApi(tag = "ApiTags::Info")]
impl InfoApi {
    /// Version, commit and build time of the running service.
    #[oai(path = "/info", method = "get", operation_id = "get_info")]
    async fn get_info(&self) -> ApiResult<Json<Info>> {
        Ok(Json(Info {
            version: rustmailbox_version!().to_string(),
            commit: env!("GIT_HASH").to_string(),
            build: env!("BUILD_TIME").to_string(),
        }))
    }
}
