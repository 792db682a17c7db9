use crate::content::ContentSet;
use crate::domain::{Entry, Sidebars};
use crate::errors::{SidebarError, SidebarResult};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;
use walkdir::WalkDir;

const SIDEBAR_TEMPLATE: &str = "sidebar.html";

const EMBEDDED: [(&str, &str); 2] = [
    ("macros.html", include_str!("../templates/macros.html")),
    (SIDEBAR_TEMPLATE, include_str!("../templates/sidebar.html")),
];

/// A sidebar entry prepared for the template. Labels and hrefs are
/// already HTML-escaped.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub kind: &'static str,
    pub label: String,
    pub href: Option<String>,
    pub collapsed: bool,
    pub items: Vec<NavItem>,
}

/// Loads the embedded templates, then any `*.html` under `templates_dir`,
/// which replace embedded templates of the same name.
pub fn init_tera(templates_dir: Option<&Path>) -> SidebarResult<Tera> {
    let mut sources: Vec<(String, String)> = EMBEDDED
        .iter()
        .map(|(name, body)| (name.to_string(), body.to_string()))
        .collect();

    if let Some(dir) = templates_dir {
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("html") {
                continue;
            }
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let name = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("/");
            debug!("Template override {} from {}", name, path.display());
            sources.push((name, fs::read_to_string(path)?));
        }
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(sources)
        .map_err(|e| SidebarError::Template(format!("Failed to initialize templates: {e:?}")))?;
    Ok(tera)
}

/// Builds the template view of one sidebar. Leaf labels use the doc title
/// from `content` when known, the doc id otherwise.
pub fn nav_items(items: &[Entry], content: Option<&ContentSet>, base_url: &str) -> Vec<NavItem> {
    items
        .iter()
        .map(|entry| match entry {
            Entry::Leaf(id) => NavItem {
                kind: "doc",
                label: escape_attr(label_for(id, content)),
                href: Some(href(base_url, id)),
                collapsed: false,
                items: Vec::new(),
            },
            Entry::Category(category) => NavItem {
                kind: "category",
                label: escape_attr(&category.label),
                href: category.link.as_deref().map(|id| href(base_url, id)),
                collapsed: category.collapsed,
                items: nav_items(&category.items, content, base_url),
            },
        })
        .collect()
}

pub fn render_sidebar(
    tera: &Tera,
    sidebars: &Sidebars,
    name: &str,
    content: Option<&ContentSet>,
    base_url: &str,
) -> SidebarResult<String> {
    let items = sidebars
        .get(name)
        .ok_or_else(|| SidebarError::UnknownSidebar(name.to_string()))?;

    let mut context = Context::new();
    context.insert("name", &escape_attr(name));
    context.insert("items", &nav_items(items, content, base_url));

    tera.render(SIDEBAR_TEMPLATE, &context).map_err(|e| {
        SidebarError::Template(format!(
            "Template rendering failed for {SIDEBAR_TEMPLATE}: {e:?}"
        ))
    })
}

fn label_for<'a>(id: &'a str, content: Option<&'a ContentSet>) -> &'a str {
    content.and_then(|c| c.title(id)).unwrap_or(id)
}

fn href(base_url: &str, id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    escape_attr(&format!("{base}/{id}"))
}

/// Like `tera::escape_html` but keeps `/` readable in URLs.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
