use crate::domain::{Category, Entry, Sidebars};
use crate::errors::{SidebarError, SidebarResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Name of the sidebar in the built-in definition.
pub const DEFAULT_SIDEBAR: &str = "sidebar";

/// The built-in navigation tree of the documentation site.
pub fn builtin() -> Sidebars {
    let mut sidebars = Sidebars::new();
    sidebars.insert(
        DEFAULT_SIDEBAR,
        vec![
            Entry::leaf("decoding"),
            Entry::leaf("encoding"),
            Entry::Category(
                Category::new(
                    "Interop",
                    vec![
                        Entry::leaf("interop/akka-http"),
                        Entry::leaf("interop/http4s"),
                        Entry::leaf("interop/refined"),
                        Entry::leaf("interop/scalaz-7x"),
                    ],
                )
                .with_link("interop/index")
                .collapsed(true),
            ),
        ],
    );
    sidebars
}

pub fn from_yaml_str(source: &str) -> SidebarResult<Sidebars> {
    serde_yaml::from_str(source).map_err(|e| parse_error("<yaml>", e))
}

pub fn from_json_str(source: &str) -> SidebarResult<Sidebars> {
    serde_json::from_str(source).map_err(|e| parse_error("<json>", e))
}

/// Loads a sidebar file. `.json` files are read as JSON, anything else as YAML.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> SidebarResult<Sidebars> {
    let source = fs::read_to_string(path)?;
    let sidebars = if is_json(path) {
        serde_json::from_str(&source).map_err(|e| parse_error(path, e))?
    } else {
        serde_yaml::from_str(&source).map_err(|e| parse_error(path, e))?
    };
    debug!("Loaded sidebars from {}", path.display());
    Ok(sidebars)
}

/// Loads `path` when given, the built-in definition otherwise.
pub fn load_or_builtin(path: Option<&Path>) -> SidebarResult<Sidebars> {
    match path {
        Some(path) => load(path),
        None => {
            debug!("Using built-in sidebars");
            Ok(builtin())
        }
    }
}

pub fn to_yaml_string(sidebars: &Sidebars) -> SidebarResult<String> {
    serde_yaml::to_string(sidebars).map_err(|e| parse_error("<yaml>", e))
}

pub fn to_json_string(sidebars: &Sidebars) -> SidebarResult<String> {
    serde_json::to_string_pretty(sidebars).map_err(|e| parse_error("<json>", e))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse_error(path: impl Into<PathBuf>, e: impl std::fmt::Display) -> SidebarError {
    SidebarError::Parse {
        path: path.into(),
        reason: e.to_string(),
    }
}
