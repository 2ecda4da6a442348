#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid forum url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Could not write output to {path}: {reason}")]
    Output { path: String, reason: String },
}
