//! Build information endpoint
//!
//! Identifies the running binary and the artifact format it can read, so a
//! deployment can be matched against the model file it ships with.

use axum::response::Json;
use serde::Serialize;

use crate::model::forest::FORMAT_TAG;

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub package: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    /// Model artifact format this build accepts
    pub artifact_format: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            package: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
            build_profile: env!("BUILD_PROFILE"),
            artifact_format: FORMAT_TAG,
        }
    }
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}
