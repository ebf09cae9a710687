use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use url::Url;

use crate::errors::UpdaterError;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CachedCredential {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CachedCredential {
    pub fn usable_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Cache files are keyed by the server: the file name is the base URL with
/// everything but alphabetic characters stripped.
pub fn path_for(home: &Path, base_url: &Url) -> PathBuf {
    let key: String = base_url
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();

    home.join(format!(".{}", key))
}

pub fn load(path: &Path) -> Result<CachedCredential, UpdaterError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(ref e) if e.kind() == ErrorKind::NotFound => {
            debug!("No credential cache at {:?}", path);
            return Ok(CachedCredential::default());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(parse(&content))
}

pub fn parse(content: &str) -> CachedCredential {
    let mut credential = CachedCredential::default();

    for line in content.lines() {
        // Presence check, not a position check: the key normally sits at
        // offset 0, where an index-as-truthiness test would miss it.
        if line.contains("token=") {
            credential.token = value_of(line);
        } else if line.contains("username=") {
            credential.username = value_of(line);
        } else if line.contains("password=") {
            credential.password = value_of(line);
        }
    }

    credential
}

fn value_of(line: &str) -> Option<String> {
    line.split('=').nth(1).map(|v| v.to_string())
}

pub fn save(path: &Path, token: &str, username: &str, password: &str) -> Result<(), UpdaterError> {
    let content = format!("token={}\nusername={}\npassword={}", token, username, password);
    let tmp = path.with_extension("tmp");

    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;

    debug!("Saved credentials to {:?}", path);

    Ok(())
}

pub fn invalidate(path: &Path) -> Result<(), UpdaterError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed credential cache {:?}", path);
            Ok(())
        }
        Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
