use crate::content::ContentSet;
use crate::domain::{Category, Entry, Sidebars};
use crate::errors::{SidebarError, SidebarResult};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::{error, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    EmptyCategory { label: String },
    BlankLabel,
    MalformedId { id: String, reason: &'static str },
    DuplicateId { id: String, first: String },
    DanglingReference { id: String },
    UnlistedDoc { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub kind: IssueKind,
    /// Where in the tree the issue was found, e.g. `sidebar > Interop > [1]`.
    pub location: String,
}

impl Issue {
    fn error(kind: IssueKind, location: String) -> Self {
        Issue {
            severity: Severity::Error,
            kind,
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::EmptyCategory { label } => write!(f, "category '{label}' has no items"),
            IssueKind::BlankLabel => f.write_str("category label is blank"),
            IssueKind::MalformedId { id, reason } => write!(f, "doc id '{id}' {reason}"),
            IssueKind::DuplicateId { id, first } => {
                write!(f, "doc id '{id}' is already listed at {first}")
            }
            IssueKind::DanglingReference { id } => write!(f, "unknown doc id '{id}'"),
            IssueKind::UnlistedDoc { id } => write!(f, "doc '{id}' is not in any sidebar"),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}: {}", self.location, self.kind)
    }
}

/// Checks the shape of every sidebar: non-empty categories, well-formed
/// and unique doc ids, non-blank labels.
#[instrument(level = "debug", skip(sidebars))]
pub fn check_structure(sidebars: &Sidebars) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut seen: HashMap<&str, String> = HashMap::new();

    for (name, items) in sidebars.iter() {
        walk(items, &mut vec![name.to_string()], &mut |node, location| match node {
            Node::Category(category) => {
                if category.label.trim().is_empty() {
                    issues.push(Issue::error(IssueKind::BlankLabel, location.to_string()));
                }
                if category.items.is_empty() {
                    issues.push(Issue::error(
                        IssueKind::EmptyCategory {
                            label: category.label.clone(),
                        },
                        location.to_string(),
                    ));
                }
            }
            Node::Id(id) => check_id(id, location, &mut seen, &mut issues),
        });
    }
    issues
}

/// Checks every referenced doc id against `content`. Docs no sidebar lists
/// are reported as warnings.
#[instrument(level = "debug", skip_all)]
pub fn check_references(sidebars: &Sidebars, content: &ContentSet) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut listed = BTreeSet::new();

    for (name, items) in sidebars.iter() {
        walk(items, &mut vec![name.to_string()], &mut |node, location| {
            if let Node::Id(id) = node {
                listed.insert(id);
                if !content.contains(id) {
                    issues.push(Issue::error(
                        IssueKind::DanglingReference { id: id.to_string() },
                        location.to_string(),
                    ));
                }
            }
        });
    }

    for id in content.ids().filter(|id| !listed.contains(id)) {
        issues.push(Issue {
            severity: Severity::Warning,
            kind: IssueKind::UnlistedDoc { id: id.to_string() },
            location: content
                .get(id)
                .map(|d| d.source.display().to_string())
                .unwrap_or_default(),
        });
    }
    issues
}

/// Logs `issues` and fails when any is an error, or any at all when `strict`.
pub fn ensure_valid(issues: &[Issue], strict: bool) -> SidebarResult<()> {
    let errors = issues.iter().filter(|i| i.is_error()).count();
    let warnings = issues.len() - errors;

    for issue in issues {
        match issue.severity {
            Severity::Error => error!("{issue}"),
            Severity::Warning => warn!("{issue}"),
        }
    }

    if errors > 0 || (strict && warnings > 0) {
        return Err(SidebarError::Invalid { errors, warnings });
    }
    Ok(())
}

/// Why `id` is not a well-formed doc id, if it isn't.
pub fn malformed_reason(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("is empty")
    } else if id.trim() != id {
        Some("has leading or trailing whitespace")
    } else if id.starts_with('/') {
        Some("starts with '/'")
    } else if id.ends_with('/') {
        Some("ends with '/'")
    } else if id.split('/').any(str::is_empty) {
        Some("has an empty path segment")
    } else {
        None
    }
}

enum Node<'a> {
    Id(&'a str),
    Category(&'a Category),
}

/// Visits every category and doc id below `items` with its breadcrumb,
/// e.g. `sidebar > Interop > [2]`. A category's link shares the category's
/// breadcrumb and is visited right after it.
fn walk<'a>(items: &'a [Entry], trail: &mut Vec<String>, visit: &mut dyn FnMut(Node<'a>, &str)) {
    for (index, item) in items.iter().enumerate() {
        match item {
            Entry::Leaf(id) => {
                trail.push(format!("[{index}]"));
                visit(Node::Id(id), &trail.join(" > "));
                trail.pop();
            }
            Entry::Category(category) => {
                trail.push(if category.label.trim().is_empty() {
                    format!("[{index}]")
                } else {
                    category.label.clone()
                });
                let location = trail.join(" > ");
                visit(Node::Category(category), &location);
                if let Some(link) = &category.link {
                    visit(Node::Id(link), &location);
                }
                walk(&category.items, trail, visit);
                trail.pop();
            }
        }
    }
}

fn check_id<'a>(
    id: &'a str,
    location: &str,
    seen: &mut HashMap<&'a str, String>,
    issues: &mut Vec<Issue>,
) {
    if let Some(reason) = malformed_reason(id) {
        issues.push(Issue::error(
            IssueKind::MalformedId {
                id: id.to_string(),
                reason,
            },
            location.to_string(),
        ));
        return;
    }
    match seen.get(id) {
        Some(first) => issues.push(Issue::error(
            IssueKind::DuplicateId {
                id: id.to_string(),
                first: first.clone(),
            },
            location.to_string(),
        )),
        None => {
            seen.insert(id, location.to_string());
        }
    }
}
