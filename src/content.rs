use crate::domain::{Doc, Frontmatter};
use crate::errors::{SidebarError, SidebarResult};
use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, ComrakOptions};
use gray_matter::Matter;
use gray_matter::engine::YAML;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[-_.]\s*").expect("valid number prefix pattern"));

/// Documents of a content directory, keyed by doc id.
#[derive(Debug, Default, Clone)]
pub struct ContentSet {
    docs: BTreeMap<String, Doc>,
}

impl ContentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc: Doc) -> SidebarResult<()> {
        if let Some(existing) = self.docs.get(&doc.id) {
            return Err(SidebarError::DuplicateDoc {
                id: doc.id,
                first: existing.source.clone(),
                second: doc.source,
            });
        }
        self.docs.insert(doc.id.clone(), doc);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Doc> {
        self.docs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    pub fn title(&self, id: &str) -> Option<&str> {
        self.docs.get(id).map(|d| d.title.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.docs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Walks `dir` for `.md`/`.mdx` files and builds the content set.
#[instrument(level = "debug")]
pub fn scan(dir: &Path) -> SidebarResult<ContentSet> {
    if !dir.is_dir() {
        return Err(SidebarError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Content directory not found: {}", dir.display()),
        )));
    }

    let mut content = ContentSet::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_dir() || !is_markdown(path) {
            continue;
        }
        let relative = path.strip_prefix(dir).map_err(|_e| {
            SidebarError::Io(std::io::Error::other(format!(
                "Failed to compute relative path for {}",
                path.display()
            )))
        })?;
        let doc = read_doc(path, relative)?;
        debug!("Found doc '{}' in {}", doc.id, path.display());
        content.insert(doc)?;
    }

    info!("Scanned {} doc(s) in {}", content.len(), dir.display());
    Ok(content)
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("md") | Some("mdx")
    )
}

fn read_doc(path: &Path, relative: &Path) -> SidebarResult<Doc> {
    let source = fs::read_to_string(path)?;
    let matter = Matter::<YAML>::new();
    let result = matter.parse(&source);

    let frontmatter = match result.data {
        Some(data) => data
            .deserialize::<Frontmatter>()
            .map_err(|e| SidebarError::Parse {
                path: path.to_path_buf(),
                reason: format!("frontmatter: {e}"),
            })?,
        None => Frontmatter::default(),
    };

    let id = doc_id(relative, frontmatter.id.as_deref());
    let title = frontmatter
        .sidebar_label
        .or(frontmatter.title)
        .or_else(|| first_heading(&result.content))
        .unwrap_or_else(|| file_stem(relative));

    Ok(Doc {
        id,
        title,
        source: path.to_path_buf(),
    })
}

/// Derives a doc id from a path relative to the content root.
///
/// Segments lose their number prefix (`01-intro.md` becomes `intro`) and
/// `id_override` replaces the last segment.
pub fn doc_id(relative: &Path, id_override: Option<&str>) -> String {
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str())
        .map(strip_number_prefix)
        .collect();

    let last = match id_override {
        Some(id) => id.to_string(),
        None => strip_number_prefix(&file_stem(relative)),
    };
    segments.push(last);
    segments.join("/")
}

fn strip_number_prefix(segment: &str) -> String {
    let stripped = NUMBER_PREFIX.replace(segment, "");
    // A segment that is nothing but a prefix ("01-") keeps it.
    if stripped.is_empty() {
        segment.to_string()
    } else {
        stripped.into_owned()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

/// Plain text of the first heading in a Markdown body.
pub fn first_heading(markdown: &str) -> Option<String> {
    let arena = Arena::new();
    let root = comrak::parse_document(&arena, markdown, &ComrakOptions::default());
    let heading = root
        .descendants()
        .find(|node| matches!(node.data.borrow().value, NodeValue::Heading(_)))?;

    let mut text = String::new();
    collect_text(heading, &mut text);
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => {}
        }
        collect_text(child, out);
    }
}
