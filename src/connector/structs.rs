use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::UpdateJob;

#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct LoginResponse {
    pub data: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ApiResponse {
    // An absent code means success.
    #[serde(default)]
    pub code: i64,
    pub message: Option<String>,
    pub data: Option<VersionEntity>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntity {
    pub id: i64,
    pub version: i64,
    pub desc: Option<String>,
    pub name: String,
    pub download_url: Option<String>,
    /// Comma-joined, e.g. "ios,android".
    pub platform: String,
    pub file_size: Option<i64>,
    pub ip: String,
    pub channel: Option<String>,
    /// 0 = hot-update bundle, 1 = full package.
    #[serde(rename = "type")]
    pub kind: i64,
    pub enable: i64,
    pub is_mandatory: i64,
    pub update_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub name: String,
    pub ver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mandatory: Option<u8>,
    pub platform: String,
    pub download_url: String,
}

impl CreateVersionRequest {
    pub fn from_job(job: &UpdateJob, download_url: &str) -> CreateVersionRequest {
        CreateVersionRequest {
            name: job.name.clone(),
            ver: job.version.clone(),
            desc: job.desc.clone(),
            channel: job.channel.clone(),
            is_mandatory: if job.is_mandatory { Some(1) } else { None },
            platform: job.platform_param(),
            download_url: download_url.to_string(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum UploadOutcome {
    Success(Option<VersionEntity>),
    Unauthorized,
    Failed { code: i64, message: String },
}

impl From<ApiResponse> for UploadOutcome {
    fn from(response: ApiResponse) -> UploadOutcome {
        match response.code {
            0 => UploadOutcome::Success(response.data),
            401 => UploadOutcome::Unauthorized,
            code => UploadOutcome::Failed {
                code,
                message: response
                    .message
                    .unwrap_or_else(|| "no message from server".to_string()),
            },
        }
    }
}
