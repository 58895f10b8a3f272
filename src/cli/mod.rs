//! CLI module for testbox
//!
//! ## Commands
//!
//! - `configure` - Validate every declaration in the manifest
//! - `build` - Build all libraries and test executables
//! - `test` - Build, then run every registered test
//! - `list` - Show declared targets
//! - `clean` - Remove the build directory
//! - `init` - Scaffold a sample project
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use testbox_manifest::MANIFEST_FILE;

use crate::version::TESTBOX_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
///
/// Every error kind has its own code; `2` is left to clap for usage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// One or more tests failed
    pub const TESTS_FAILED: ExitCode = ExitCode(1);
    /// Invalid or unreadable manifest, or a rejected declaration
    pub const CONFIGURATION: ExitCode = ExitCode(3);
    /// A compile, archive or link step failed
    pub const BUILD: ExitCode = ExitCode(4);
    /// Any other filesystem or output failure
    pub const IO: ExitCode = ExitCode(5);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::CONFIGURATION)
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::BUILD)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::IO)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Build C/C++ libraries and run their unit-test executables
#[derive(Parser, Debug)]
#[command(name = "testbox")]
#[command(version = TESTBOX_VERSION)]
#[command(about = "Build C/C++ libraries and run their unit-test executables", long_about = None)]
pub struct Cli {
    /// Project manifest; its directory is the project root
    #[arg(long, global = true, value_name = "PATH", default_value = MANIFEST_FILE)]
    pub manifest: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the manifest's declarations
    Configure,

    /// Build every library and test executable
    Build {
        /// Print the build commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Build, then run every registered test
    Test {
        /// Only run tests whose name contains EXPR
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,
        /// Run the existing executables without rebuilding
        #[arg(long)]
        no_build: bool,
    },

    /// List declared targets and test dependencies
    List,

    /// Remove the build directory
    Clean,

    /// Create a sample library + googletest project
    Init {
        /// Directory to create the project in
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        /// Library name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let manifest = cli.manifest.as_path();
    match cli.command {
        Command::Configure => commands::configure_project(manifest),
        Command::Build { dry_run } => commands::build_project(manifest, dry_run),
        Command::Test {
            filter,
            verbose,
            format,
            no_build,
        } => test_runner::run_tests(
            manifest,
            &test_runner::TestOptions {
                filter,
                verbose,
                format,
                build: !no_build,
            },
        ),
        Command::List => commands::list_targets(manifest),
        Command::Clean => commands::clean_project(manifest),
        Command::Init { dir, name } => commands::init_project(&dir, name.as_deref()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_configure_default_manifest() {
        let cli = Cli::try_parse_from(["testbox", "configure"]).unwrap();
        assert!(matches!(cli.command, Command::Configure));
        assert_eq!(cli.manifest, PathBuf::from("testbox.toml"));
    }

    #[test]
    fn test_cli_parse_build_dry_run() {
        let cli = Cli::try_parse_from(["testbox", "build", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Command::Build { dry_run: true }));
    }

    #[test]
    fn test_cli_parse_global_manifest_after_subcommand() {
        let cli = Cli::try_parse_from(["testbox", "build", "--manifest", "proj/testbox.toml"]).unwrap();
        assert_eq!(cli.manifest, PathBuf::from("proj/testbox.toml"));
    }

    #[test]
    fn test_cli_parse_test() {
        let cli = Cli::try_parse_from(["testbox", "test", "-v", "-k", "person", "--format", "json", "--no-build"]).unwrap();
        if let Command::Test {
            filter,
            verbose,
            format,
            no_build,
        } = cli.command
        {
            assert!(verbose);
            assert!(no_build);
            assert_eq!(format, ReportFormat::Json);
            assert_eq!(filter.as_deref(), Some("person"));
        } else {
            panic!("Expected Test command");
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::try_parse_from(["testbox", "init", "demo", "--name", "gtestbox"]).unwrap();
        if let Command::Init { dir, name } = cli.command {
            assert_eq!(dir, PathBuf::from("demo"));
            assert_eq!(name.as_deref(), Some("gtestbox"));
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["testbox"]).is_err());
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            ExitCode::SUCCESS,
            ExitCode::TESTS_FAILED,
            ExitCode::CONFIGURATION,
            ExitCode::BUILD,
            ExitCode::IO,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
            // 2 belongs to clap usage errors
            assert_ne!(a.0, 2);
        }
    }
}
