use std::path::{Path, PathBuf};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, instrument};
use crate::content::ContentSet;
use crate::errors::SidebarResult;
use crate::fs::write_output;
use crate::sidebar::{load_or_builtin, to_json_string, to_yaml_string, DEFAULT_SIDEBAR};
use crate::template::{init_tera, render_sidebar};
use crate::validate::{check_references, check_structure, ensure_valid};

pub mod content;
pub mod domain;
pub mod errors;
pub mod fs;
pub mod sidebar;
pub mod template;
pub mod validate;
pub mod watch;

pub use crate::domain::{Category, Entry, Sidebars};
pub use crate::sidebar::builtin;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load, validate and render documentation sidebars", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate sidebar structure, and doc references when a docs dir is given
    Check(CheckArgs),
    /// Write the sidebars as JSON or YAML
    Export(ExportArgs),
    /// Render one sidebar as an HTML navigation fragment
    Render(RenderArgs),
    /// Re-run `check` whenever the sidebar file or the docs change
    Watch(WatchArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Sidebar definition (YAML or JSON); the built-in one when omitted
    #[arg(short, long, env = "SIDEBARS_FILE")]
    pub sidebars: Option<PathBuf>,

    /// Directory holding the Markdown docs the sidebars reference
    #[arg(short, long, env = "SIDEBARS_DOCS_DIR")]
    pub docs: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Sidebar definition (YAML or JSON); the built-in one when omitted
    #[arg(short, long, env = "SIDEBARS_FILE")]
    pub sidebars: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Sidebar to render
    #[arg(short, long, default_value = DEFAULT_SIDEBAR)]
    pub name: String,

    /// Prefix for doc links
    #[arg(short, long, default_value = "/docs/")]
    pub base_url: String,

    /// Directory of `*.html` templates overriding the built-in ones
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub check: CheckArgs,
}

pub fn run(cli: Cli) -> SidebarResult<()> {
    match cli.command {
        Command::Check(args) => check(&args),
        Command::Export(args) => export(&args),
        Command::Render(args) => render(&args),
        Command::Watch(args) => watch_and_check(&args),
    }
}

/// Validates the sidebars and, when a docs directory is set, their references.
#[instrument(level = "debug")]
pub fn check(args: &CheckArgs) -> SidebarResult<()> {
    let sidebars = load_or_builtin(args.source.sidebars.as_deref())?;
    let mut issues = check_structure(&sidebars);
    if let Some(content) = scan_optional(args.source.docs.as_deref())? {
        issues.extend(check_references(&sidebars, &content));
    }
    ensure_valid(&issues, args.strict)?;
    info!(
        "{} sidebar(s), {} doc reference(s): ok",
        sidebars.len(),
        sidebars.doc_ids().len()
    );
    Ok(())
}

#[instrument(level = "debug")]
pub fn export(args: &ExportArgs) -> SidebarResult<()> {
    let sidebars = load_or_builtin(args.sidebars.as_deref())?;
    ensure_valid(&check_structure(&sidebars), false)?;
    let serialized = match args.format {
        Format::Json => to_json_string(&sidebars)?,
        Format::Yaml => to_yaml_string(&sidebars)?,
    };
    write_output(args.output.as_deref(), &serialized)?;
    Ok(())
}

#[instrument(level = "debug")]
pub fn render(args: &RenderArgs) -> SidebarResult<()> {
    let sidebars = load_or_builtin(args.source.sidebars.as_deref())?;
    let mut issues = check_structure(&sidebars);
    let content = scan_optional(args.source.docs.as_deref())?;
    if let Some(content) = &content {
        issues.extend(check_references(&sidebars, content));
    }
    ensure_valid(&issues, false)?;

    let tera = init_tera(args.templates.as_deref())?;
    let html = render_sidebar(
        &tera,
        &sidebars,
        &args.name,
        content.as_ref(),
        &args.base_url,
    )?;
    write_output(args.output.as_deref(), &html)?;
    Ok(())
}

fn watch_and_check(args: &WatchArgs) -> SidebarResult<()> {
    let mut paths: Vec<&Path> = Vec::new();
    if let Some(file) = &args.check.source.sidebars {
        paths.push(file);
    }
    if let Some(docs) = &args.check.source.docs {
        paths.push(docs);
    }
    if paths.is_empty() {
        info!("Nothing to watch, checking the built-in sidebars once");
        return check(&args.check);
    }
    watch::watch(&paths, || check(&args.check))
}

fn scan_optional(docs: Option<&Path>) -> SidebarResult<Option<ContentSet>> {
    docs.map(content::scan).transpose()
}
