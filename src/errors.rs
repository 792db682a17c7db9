use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Unknown sidebar: {0}")]
    UnknownSidebar(String),

    #[error("Doc id '{id}' is produced by both {first} and {second}")]
    DuplicateDoc {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Watcher error: {0}")]
    Watch(String),

    #[error("Sidebar validation failed: {errors} error(s), {warnings} warning(s)")]
    Invalid { errors: usize, warnings: usize },
}

pub type SidebarResult<T> = Result<T, SidebarError>;
