use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use once_cell::sync::Lazy;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use tokio::io::AsyncReadExt;
use url::Url;

use crate::config::UpdateJob;
use crate::connector::structs::{ApiResponse, CreateVersionRequest, LoginRequest, LoginResponse};
use crate::errors::UpdaterError;

pub mod structs;

pub use structs::UploadOutcome;

static CLIENT: Lazy<Client> = Lazy::new(reqwest::Client::new);

mod paths {
    pub mod admin {
        pub const LOGIN: &str = "admin/login";
    }

    pub mod version {
        pub const UPLOAD: &str = "version/upload";
        pub const CREATE: &str = "version/create";
    }
}

pub async fn login(base: &Url, username: &str, password: &str) -> Result<String, UpdaterError> {
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(UpdaterError::Auth(format!(
            "unsupported URL scheme '{}'",
            base.scheme()
        )));
    }

    let url = endpoint(base, paths::admin::LOGIN)?;
    let request = LoginRequest { username, password };

    let response = CLIENT.post(url).json(&request).send().await?;

    debug!("Received login response: {:?}", response);

    let body = response.text().await?;

    extract_token(&body)
}

fn extract_token(body: &str) -> Result<String, UpdaterError> {
    let parsed: LoginResponse =
        serde_json::from_str(body).map_err(|e| UpdaterError::Auth(e.to_string()))?;

    match parsed.data {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(UpdaterError::Auth("token err".to_string())),
    }
}

pub async fn upload_file(
    job: &UpdateJob,
    token: &str,
    artifact: &Path,
) -> Result<UploadOutcome, UpdaterError> {
    if !artifact.exists() {
        return Err(UpdaterError::Packaging(format!("missing {:?}", artifact)));
    }

    let url = endpoint(&job.base_url, paths::version::UPLOAD)?;
    let form = metadata_form(job).part("file", file_part(artifact).await?);

    let response = CLIENT
        .post(url)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await;

    // The local artifact is removed no matter how the request went, so a
    // failed run never leaves a stale zip behind.
    if let Err(e) = tokio::fs::remove_file(artifact).await {
        warn!("Could not remove {:?}: {}", artifact, e);
    }

    let body = response?.text().await?;

    parse_outcome(&body)
}

pub async fn create_version(
    job: &UpdateJob,
    token: &str,
    download_url: &str,
) -> Result<UploadOutcome, UpdaterError> {
    let url = endpoint(&job.base_url, paths::version::CREATE)?;
    let request = CreateVersionRequest::from_job(job, download_url);

    let response = CLIENT
        .post(url)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&request)
        .send()
        .await?;

    debug!("Received version-create response: {:?}", response);

    let body = response.text().await?;

    parse_outcome(&body)
}

fn parse_outcome(body: &str) -> Result<UploadOutcome, UpdaterError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| UpdaterError::Upload(format!("unreadable server response: {}", e)))?;

    debug!("Parsed server response: {:?}", response);

    Ok(UploadOutcome::from(response))
}

fn metadata_form(job: &UpdateJob) -> Form {
    let mut form = Form::new()
        .text("name", job.name.clone())
        .text("ver", job.version.clone())
        .text("platform", job.platform_param());

    if let Some(desc) = &job.desc {
        form = form.text("desc", desc.clone());
    }
    if let Some(channel) = &job.channel {
        form = form.text("channel", channel.clone());
    }
    if job.is_mandatory {
        form = form.text("isMandatory", "1");
    }

    form
}

async fn file_part(path: &Path) -> Result<Part, UpdaterError> {
    let file = tokio::fs::File::open(path).await?;

    let stream = futures::stream::unfold(file, |mut file| async move {
        let mut buff = vec![0u8; 8192];

        match file.read(&mut buff).await {
            Ok(0) => None,
            Ok(n) => {
                buff.truncate(n);
                debug!("Streaming chunk of {} bytes", n);
                Some((Ok::<_, std::io::Error>(buff), file))
            }
            Err(e) => Some((Err(e), file)),
        }
    });

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app.zip")
        .to_string();

    Ok(Part::stream(Body::wrap_stream(stream)).file_name(file_name))
}

fn endpoint(base: &Url, path: &str) -> Result<reqwest::Url, UpdaterError> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);

    reqwest::Url::from_str(&joined)
        .map_err(|e| UpdaterError::Validation(format!("invalid request URL {}: {}", joined, e)))
}
