use serde::de::value::MapAccessDeserializer;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// One node of a sidebar tree.
///
/// On the wire a leaf is a bare doc id string (or `{type: doc, id}`), a
/// category is an object tagged `type: category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "RawEntry")]
pub enum Entry {
    Leaf(String),
    Category(Category),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    /// Doc shown when the category label itself is clicked.
    pub link: Option<String>,
    pub collapsed: bool,
    pub items: Vec<Entry>,
}

impl Entry {
    pub fn leaf(id: impl Into<String>) -> Self {
        Entry::Leaf(id.into())
    }

    /// Every doc id this entry references, depth first and in order.
    /// A category's link comes before its items.
    pub fn doc_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            Entry::Leaf(id) => ids.push(id),
            Entry::Category(category) => {
                if let Some(link) = &category.link {
                    ids.push(link);
                }
                for item in &category.items {
                    item.collect_ids(ids);
                }
            }
        }
    }
}

impl Category {
    pub fn new(label: impl Into<String>, items: Vec<Entry>) -> Self {
        Category {
            label: label.into(),
            link: None,
            collapsed: true,
            items,
        }
    }

    pub fn with_link(mut self, id: impl Into<String>) -> Self {
        self.link = Some(id.into());
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum RawEntry {
    Id(String),
    Item(RawItem),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawItem {
    Doc { id: String },
    Category(RawCategory),
}

#[derive(Serialize, Deserialize)]
struct RawCategory {
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<DocLink>,
    #[serde(default = "collapsed_by_default")]
    collapsed: bool,
    #[serde(default)]
    items: Vec<Entry>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum DocLink {
    Doc { id: String },
}

fn collapsed_by_default() -> bool {
    true
}

impl From<RawItem> for Entry {
    fn from(raw: RawItem) -> Self {
        match raw {
            RawItem::Doc { id } => Entry::Leaf(id),
            RawItem::Category(c) => Entry::Category(Category {
                label: c.label,
                link: c.link.map(|DocLink::Doc { id }| id),
                collapsed: c.collapsed,
                items: c.items,
            }),
        }
    }
}

impl From<Entry> for RawEntry {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Leaf(id) => RawEntry::Id(id),
            Entry::Category(c) => RawEntry::Item(RawItem::Category(RawCategory {
                label: c.label,
                link: c.link.map(|id| DocLink::Doc { id }),
                collapsed: c.collapsed,
                items: c.items,
            })),
        }
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = Entry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a doc id or an object with a `type` field")
            }

            fn visit_str<E: de::Error>(self, id: &str) -> Result<Entry, E> {
                Ok(Entry::Leaf(id.to_string()))
            }

            fn visit_string<E: de::Error>(self, id: String) -> Result<Entry, E> {
                Ok(Entry::Leaf(id))
            }

            fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Entry, A::Error> {
                RawItem::deserialize(MapAccessDeserializer::new(access)).map(Entry::from)
            }
        }

        deserializer.deserialize_any(EntryVisitor)
    }
}

/// Named sidebars in the order they were declared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sidebars {
    entries: Vec<(String, Vec<Entry>)>,
}

impl Sidebars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sidebar, replacing any previous one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, items: Vec<Entry>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = items,
            None => self.entries.push((name, items)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Entry]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, items)| items.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Entry])> {
        self.entries
            .iter()
            .map(|(n, items)| (n.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All referenced doc ids across every sidebar, in declaration order.
    pub fn doc_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(|(_, items)| items.iter().flat_map(Entry::doc_ids))
            .collect()
    }
}

impl Serialize for Sidebars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, items) in &self.entries {
            map.serialize_entry(name, items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Sidebars {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SidebarsVisitor;

        impl<'de> Visitor<'de> for SidebarsVisitor {
            type Value = Sidebars;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from sidebar name to a list of entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Sidebars, A::Error> {
                let mut sidebars = Sidebars::new();
                while let Some((name, items)) = access.next_entry::<String, Vec<Entry>>()? {
                    if sidebars.get(&name).is_some() {
                        return Err(de::Error::custom(format!("duplicate sidebar '{name}'")));
                    }
                    sidebars.insert(name, items);
                }
                Ok(sidebars)
            }
        }

        deserializer.deserialize_map(SidebarsVisitor)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Frontmatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub sidebar_label: Option<String>,
}

/// A Markdown document found in the content directory.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Doc {
    pub id: String,
    pub title: String,
    pub source: PathBuf,
}
