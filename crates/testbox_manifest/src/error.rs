use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while reading or parsing a manifest.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("cannot read manifest `{}`: {source}", path.display())]
    #[diagnostic(code(testbox::manifest_read), help("run `testbox init` to create a manifest"))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest: {0}")]
    #[diagnostic(code(testbox::manifest_parse))]
    Parse(#[from] toml::de::Error),

    #[error("manifest `{}` already exists", path.display())]
    #[diagnostic(code(testbox::manifest_exists), help("remove it or pick another directory"))]
    AlreadyExists { path: PathBuf },
}
