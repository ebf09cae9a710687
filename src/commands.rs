use std::env;
use std::io;
use std::path::Path;

use dialoguer::Input;
use log::{debug, info};
use url::Url;

use crate::cache;
use crate::config::Options;
use crate::config::UpdateJob;
use crate::connector;
use crate::connector::structs::VersionEntity;
use crate::connector::UploadOutcome;
use crate::errors::UpdaterError;
use crate::packager;

pub async fn update(
    config_file: &Path,
    name_override: Option<String>,
) -> Result<(), UpdaterError> {
    info!("Reading configuration from {:?}", config_file);

    let mut options = Options::load(config_file)?;

    if let Some(name) = name_override {
        options.name = Some(name);
    }

    let job = options.validate()?;

    debug!("Validated update job: {:?}", job);
    info!("{} {} ready to publish", job.name, job.version);

    let home = dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory not available"))?;
    let cache_file = cache::path_for(&home, &job.base_url);
    let credential = cache::load(&cache_file)?;

    match credential.usable_token() {
        // No cached token: log in and stop. The operator re-invokes the
        // command to proceed with the upload.
        None => authenticate(&job.base_url, &cache_file).await,
        Some(token) => {
            let token = token.to_string();
            run_upload(&job, &token, &cache_file).await
        }
    }
}

async fn authenticate(base_url: &Url, cache_file: &Path) -> Result<(), UpdaterError> {
    let username: String = Input::new()
        .with_prompt("Enter username")
        .allow_empty(true)
        .interact_text()?;

    if username.is_empty() {
        return Err(UpdaterError::Auth("username must not be empty".to_string()));
    }

    let password = rpassword::prompt_password_stdout("Enter password: ")?;

    if password.is_empty() {
        return Err(UpdaterError::Auth("password must not be empty".to_string()));
    }

    debug!("Logging in at {} as '{}'", base_url, username);

    let token = connector::login(base_url, &username, &password).await?;

    cache::save(cache_file, &token, &username, &password)?;

    info!("Login successful, run the update command again to upload");

    Ok(())
}

async fn run_upload(
    job: &UpdateJob,
    token: &str,
    cache_file: &Path,
) -> Result<(), UpdaterError> {
    let outcome = match &job.download_url {
        Some(download_url) => {
            info!("Registering pre-hosted version from {}", download_url);
            connector::create_version(job, token, download_url).await?
        }
        None => {
            let workdir = env::current_dir()?;
            let artifact = packager::prepare_artifact(job, &workdir)?;
            info!("Start uploading {:?}", artifact);
            connector::upload_file(job, token, &artifact).await?
        }
    };

    finish(outcome, cache_file, |entity| {
        match serde_json::to_string(&entity) {
            Ok(json) => info!("Upload succeeded: {}", json),
            Err(_) => info!("Upload succeeded"),
        }
    })
}

fn finish<F>(outcome: UploadOutcome, cache_file: &Path, on_success: F) -> Result<(), UpdaterError>
where
    F: FnOnce(VersionEntity),
{
    match outcome {
        UploadOutcome::Success(Some(entity)) => {
            on_success(entity);
            Ok(())
        }
        UploadOutcome::Success(None) => {
            info!("Upload succeeded");
            Ok(())
        }
        UploadOutcome::Unauthorized => {
            // The next invocation must re-prompt for credentials.
            cache::invalidate(cache_file)?;
            Err(UpdaterError::Unauthorized)
        }
        UploadOutcome::Failed { code, message } => Err(UpdaterError::Upload(format!(
            "server returned code {}: {}",
            code, message
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use assert_matches::assert_matches;
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::cache;

    fn entity() -> VersionEntity {
        VersionEntity {
            id: 1,
            version: 3,
            desc: None,
            name: "demo".to_string(),
            download_url: None,
            platform: "ios".to_string(),
            file_size: Some(1024),
            ip: "10.0.0.1".to_string(),
            channel: None,
            kind: 0,
            enable: 1,
            is_mandatory: 0,
            update_time: Utc::now(),
            create_time: Utc::now(),
        }
    }

    #[test]
    fn success_invokes_the_callback_exactly_once() {
        let dir = tempdir().unwrap();
        let cache_file = dir.path().join(".server");
        let calls = Cell::new(0);

        let result = finish(UploadOutcome::Success(Some(entity())), &cache_file, |e| {
            assert_eq!(e.name, "demo");
            calls.set(calls.get() + 1);
        });

        assert!(result.is_ok());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn success_without_payload_skips_the_callback() {
        let dir = tempdir().unwrap();
        let cache_file = dir.path().join(".server");
        let calls = Cell::new(0);

        let result = finish(UploadOutcome::Success(None), &cache_file, |_| {
            calls.set(calls.get() + 1);
        });

        assert!(result.is_ok());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn unauthorized_deletes_the_credential_cache() {
        let dir = tempdir().unwrap();
        let cache_file = dir.path().join(".server");
        cache::save(&cache_file, "tok", "u", "p").unwrap();

        let result = finish(UploadOutcome::Unauthorized, &cache_file, |_| {
            panic!("callback must not run on 401");
        });

        assert_matches!(result, Err(UpdaterError::Unauthorized));
        assert!(!cache_file.exists());
    }

    #[test]
    fn server_failure_keeps_the_credential_cache() {
        let dir = tempdir().unwrap();
        let cache_file = dir.path().join(".server");
        cache::save(&cache_file, "tok", "u", "p").unwrap();

        let outcome = UploadOutcome::Failed {
            code: 500,
            message: "boom".to_string(),
        };
        let result = finish(outcome, &cache_file, |_| {
            panic!("callback must not run on failure");
        });

        assert_matches!(result, Err(UpdaterError::Upload(_)));
        assert!(cache_file.exists());
    }
}
