use err_derive::Error;

#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error(display = "configuration error: {}", _0)]
    Config(String),
    #[error(display = "invalid configuration: {}", _0)]
    Validation(String),
    #[error(display = "authentication failed: {}", _0)]
    Auth(String),
    #[error(display = "packaging failed: {}", _0)]
    Packaging(String),
    #[error(display = "upload failed: {}", _0)]
    Upload(String),
    #[error(display = "unauthorized, cached credentials were discarded")]
    Unauthorized,
    #[error(display = "{}", _0)]
    Io(#[error(source, no_from)] std::io::Error),
    #[error(display = "{}", _0)]
    Http(#[error(source, no_from)] reqwest::Error),
}

impl UpdaterError {
    pub fn exit_code(&self) -> i32 {
        use UpdaterError::*;

        match self {
            Config(_) => 2,
            Validation(_) => 3,
            Auth(_) => 4,
            Packaging(_) => 5,
            Upload(_) => 6,
            Unauthorized => 7,
            Io(_) | Http(_) => 1,
        }
    }
}

impl From<std::io::Error> for UpdaterError {
    fn from(e: std::io::Error) -> Self {
        UpdaterError::Io(e)
    }
}

impl From<reqwest::Error> for UpdaterError {
    fn from(e: reqwest::Error) -> Self {
        UpdaterError::Http(e)
    }
}
