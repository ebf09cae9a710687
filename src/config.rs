use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::UpdaterError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Windows,
    Linux,
    Mac,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Mac => "mac",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub name: Option<String>,
    pub version: Option<String>,
    pub desc: Option<String>,
    pub platform: Vec<Platform>,
    pub channel: Option<String>,
    pub is_mandatory: Option<bool>,
    pub base_url: Option<String>,
    pub product_name: Option<String>,
    pub download_url: Option<String>,
}

impl Options {
    pub fn load(path: &Path) -> Result<Options, UpdaterError> {
        let content = fs::read_to_string(path)
            .map_err(|e| UpdaterError::Config(format!("could not read {:?}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| UpdaterError::Config(format!("could not parse {:?}: {}", path, e)))
    }

    pub fn validate(self) -> Result<UpdateJob, UpdaterError> {
        let name = require(self.name, "name")?;
        let version = require(self.version, "version")?;
        let base_url = require(self.base_url, "baseUrl")?;

        if self.platform.is_empty() {
            return Err(UpdaterError::Validation("missing parameter platform".to_string()));
        }

        let base_url = Url::parse(&base_url).map_err(|e| {
            UpdaterError::Validation(format!("baseUrl is not a valid URL: {}", e))
        })?;

        Ok(UpdateJob {
            name,
            version,
            desc: self.desc,
            platforms: self.platform,
            channel: self.channel,
            is_mandatory: self.is_mandatory.unwrap_or(false),
            base_url,
            product_name: self.product_name,
            download_url: self.download_url,
        })
    }
}

fn require(value: Option<String>, field: &str) -> Result<String, UpdaterError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(UpdaterError::Validation(format!("missing parameter {}", field))),
    }
}

#[derive(Clone, Debug)]
pub struct UpdateJob {
    pub name: String,
    pub version: String,
    pub desc: Option<String>,
    pub platforms: Vec<Platform>,
    pub channel: Option<String>,
    pub is_mandatory: bool,
    pub base_url: Url,
    pub product_name: Option<String>,
    pub download_url: Option<String>,
}

impl UpdateJob {
    pub fn targets(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    pub fn is_mobile(&self) -> bool {
        self.targets(Platform::Ios) || self.targets(Platform::Android)
    }

    pub fn platform_param(&self) -> String {
        self.platforms
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::errors::UpdaterError;

    fn full_options() -> Options {
        Options {
            name: Some("demo".to_string()),
            version: Some("1.2.3".to_string()),
            platform: vec![Platform::Ios, Platform::Android],
            base_url: Some("https://updates.example.com".to_string()),
            ..Options::default()
        }
    }

    #[test]
    fn validates_complete_options() {
        let job = full_options().validate().unwrap();

        assert_eq!(job.name, "demo");
        assert_eq!(job.version, "1.2.3");
        assert_eq!(job.base_url.as_str(), "https://updates.example.com/");
        assert!(job.is_mobile());
        assert!(!job.is_mandatory);
    }

    #[test]
    fn rejects_missing_name() {
        let mut options = full_options();
        options.name = None;

        assert_matches!(options.validate(), Err(UpdaterError::Validation(_)));
    }

    #[test]
    fn rejects_missing_base_url() {
        let mut options = full_options();
        options.base_url = None;

        assert_matches!(options.validate(), Err(UpdaterError::Validation(_)));
    }

    #[test]
    fn rejects_empty_version() {
        let mut options = full_options();
        options.version = Some(String::new());

        assert_matches!(options.validate(), Err(UpdaterError::Validation(_)));
    }

    #[test]
    fn rejects_empty_platform_set() {
        let mut options = full_options();
        options.platform.clear();

        assert_matches!(options.validate(), Err(UpdaterError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_base_url() {
        let mut options = full_options();
        options.base_url = Some("not a url".to_string());

        assert_matches!(options.validate(), Err(UpdaterError::Validation(_)));
    }

    #[test]
    fn deserializes_from_toml() {
        let options: Options = toml::from_str(
            r#"
            name = "demo"
            version = "2.0.0"
            platform = ["windows", "mac"]
            baseUrl = "https://updates.example.com"
            productName = "Demo"
            isMandatory = true
            "#,
        )
        .unwrap();

        let job = options.validate().unwrap();

        assert_eq!(job.platforms, vec![Platform::Windows, Platform::Mac]);
        assert_eq!(job.product_name.as_deref(), Some("Demo"));
        assert!(job.is_mandatory);
        assert!(!job.is_mobile());
        assert_eq!(job.platform_param(), "windows,mac");
    }
}
