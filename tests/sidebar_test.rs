use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use sidebars::errors::SidebarError;
use sidebars::sidebar::{self, builtin, DEFAULT_SIDEBAR};
use sidebars::validate::{check_structure, IssueKind};
use sidebars::{Category, Entry};

const INTEROP: [&str; 4] = [
    "interop/akka-http",
    "interop/http4s",
    "interop/refined",
    "interop/scalaz-7x",
];

#[test]
fn given_builtin_when_loaded_then_exposes_three_top_level_entries() {
    let sidebars = builtin();
    let items = sidebars.get(DEFAULT_SIDEBAR).expect("default sidebar");

    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Entry::leaf("decoding"));
    assert_eq!(items[1], Entry::leaf("encoding"));

    let Entry::Category(interop) = &items[2] else {
        panic!("third entry should be a category");
    };
    assert_eq!(interop.label, "Interop");
    assert!(interop.collapsed);
    assert_eq!(interop.link.as_deref(), Some("interop/index"));
    let children: Vec<Entry> = INTEROP.iter().map(|id| Entry::leaf(*id)).collect();
    assert_eq!(interop.items, children);
}

#[test]
fn given_builtin_when_loaded_twice_then_results_are_equal() {
    assert_eq!(builtin(), builtin());
}

#[test]
fn given_bundled_yaml_file_when_loaded_then_matches_builtin() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("sidebars.yaml");
    let loaded = sidebar::load(&path).expect("load sidebars.yaml");
    assert_eq!(loaded, builtin());
}

#[test]
fn given_builtin_when_serialized_to_json_then_shape_matches_literal() {
    let json = sidebar::to_json_string(&builtin()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "sidebar": [
                "decoding",
                "encoding",
                {
                    "type": "category",
                    "label": "Interop",
                    "link": {"type": "doc", "id": "interop/index"},
                    "collapsed": true,
                    "items": INTEROP,
                }
            ]
        })
    );
}

#[test]
fn given_serialized_tree_when_reloaded_then_order_is_preserved() {
    let json = sidebar::to_json_string(&builtin()).unwrap();
    assert_eq!(sidebar::from_json_str(&json).unwrap(), builtin());

    let yaml = sidebar::to_yaml_string(&builtin()).unwrap();
    let reloaded = sidebar::from_yaml_str(&yaml).unwrap();
    assert_eq!(reloaded.doc_ids(), builtin().doc_ids());
    assert_eq!(sidebar::to_yaml_string(&reloaded).unwrap(), yaml);
}

#[test]
fn given_json_file_when_loaded_then_json_parser_is_used() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sidebars.json");
    fs::write(
        &path,
        r#"{"guide": ["intro", {"type": "doc", "id": "setup"}], "api": ["reference"]}"#,
    )
    .unwrap();

    let loaded = sidebar::load(&path).unwrap();
    assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["guide", "api"]);
    assert_eq!(loaded.doc_ids(), vec!["intro", "setup", "reference"]);
}

#[test]
fn given_missing_file_when_loaded_then_io_error() {
    let dir = TempDir::new().unwrap();
    let err = sidebar::load(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, SidebarError::Io(_)));
}

#[test]
fn given_no_path_when_load_or_builtin_then_builtin() {
    assert_eq!(sidebar::load_or_builtin(None).unwrap(), builtin());
}

#[rstest]
#[case("")]
#[case("/decoding")]
#[case("decoding/")]
#[case("interop//http4s")]
#[case(" decoding")]
#[case("decoding\t")]
fn given_malformed_leaf_when_checked_then_reported(#[case] id: &str) {
    let mut sidebars = builtin();
    sidebars.insert(DEFAULT_SIDEBAR, vec![Entry::leaf(id)]);

    let issues = check_structure(&sidebars);
    assert_eq!(issues.len(), 1);
    assert!(matches!(&issues[0].kind, IssueKind::MalformedId { id: bad, .. } if bad == id));
}

#[rstest]
#[case("/interop/index")]
#[case("interop/index/")]
fn given_malformed_category_link_when_checked_then_reported(#[case] link: &str) {
    let mut sidebars = builtin();
    sidebars.insert(
        DEFAULT_SIDEBAR,
        vec![Entry::Category(
            Category::new("Interop", vec![Entry::leaf("interop/http4s")]).with_link(link),
        )],
    );

    let issues = check_structure(&sidebars);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].location, "sidebar > Interop");
}

#[test]
fn given_yaml_category_without_items_when_checked_then_empty_category() {
    let sidebars = sidebar::from_yaml_str(
        r#"
sidebar:
  - type: category
    label: Empty
"#,
    )
    .unwrap();

    let issues = check_structure(&sidebars);
    assert_eq!(
        issues.into_iter().map(|i| i.kind).collect::<Vec<_>>(),
        vec![IssueKind::EmptyCategory {
            label: "Empty".into()
        }]
    );
}

#[test]
fn given_misspelled_category_field_when_loaded_then_error_names_missing_field() {
    let err = sidebar::from_yaml_str(
        r#"
sidebar:
  - type: category
    lable: Interop
    items: [interop/http4s]
"#,
    )
    .unwrap_err();

    let SidebarError::Parse { reason, .. } = err else {
        panic!("expected a parse error");
    };
    assert!(reason.contains("missing field `label`"), "{reason}");
    assert!(!reason.contains("RawEntry"), "{reason}");
}

#[test]
fn given_repeated_sidebar_name_when_loaded_then_parse_error() {
    let err = sidebar::from_json_str(r#"{"sidebar": ["a"], "sidebar": ["b"]}"#).unwrap_err();
    assert!(matches!(err, SidebarError::Parse { reason, .. } if reason.contains("duplicate sidebar 'sidebar'")));
}
