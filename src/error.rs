//! Crate error type.

use std::path::PathBuf;

use crate::css::ParseError;

/// Errors that abort a migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("failed to parse {}: {source}", display_file(.file))]
    Parse {
        file: Option<PathBuf>,
        #[source]
        source: ParseError,
    },
    #[error("stylesheet {} is already registered", .0.display())]
    DuplicateFile(PathBuf),
    #[error("cannot migrate a stylesheet without a file path")]
    MissingFile,
    #[error("import cycle detected: {}", format_chain(.0))]
    ImportCycle(Vec<Option<PathBuf>>),
    #[error("unknown stylesheet")]
    UnknownStylesheet,
    #[error("transform `{name}` failed: {message}")]
    Transform { name: String, message: String },
}

pub type Result<T, E = MigrateError> = std::result::Result<T, E>;

fn display_file(file: &Option<PathBuf>) -> String {
    file.as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<anonymous>".to_string())
}

fn format_chain(chain: &[Option<PathBuf>]) -> String {
    chain.iter().map(display_file).collect::<Vec<_>>().join(" -> ")
}
