//! testbox version information.
//!
//! The CLI `--version` output and the `testbox.toml` written by `testbox init` both read this constant.

/// The testbox version string, taken from Cargo metadata at compile time.
pub const TESTBOX_VERSION: &str = env!("CARGO_PKG_VERSION");
