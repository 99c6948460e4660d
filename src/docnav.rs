//! Doxygen sidebar navigation scripts (`namespaces_dup.js`).
//!
//! A navigation script assigns a JSON-compatible array literal to a global:
//!
//! ```text
//! var namespaces_dup =
//! [
//!     [ "action", "namespaceaction.html", "namespaceaction" ],
//!     [ "helper", "namespacehelper.html", [
//!       [ "Q_to_np_matrix", "namespacehelper.html#a2e88…", null ]
//!     ] ]
//! ];
//! ```
//!
//! Each record is `[name, url, children]` where `children` is a page name
//! (a namespace leaf), an array of member records, or `null` (a member).

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
};

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// A parsed navigation script.
#[derive(Debug, Clone, PartialEq)]
pub struct NavScript {
    /// Name of the assigned global, e.g. `namespaces_dup`
    pub variable: String,
    pub entries: Vec<NavEntry>,
}

/// One navigation record, kept as raw JSON so malformed records survive
/// parsing and can be reported by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    raw: Value,
}

/// The third field of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum NavChildren<'a> {
    /// Namespace leaf pointing at its own page
    Page(&'a str),
    /// Node listing member records
    Members(Vec<NavEntry>),
    /// Member leaf
    Leaf,
    /// Missing or of the wrong type
    Invalid,
}

impl NavEntry {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// A well-formed `[name, url, children]` record.
    pub fn record(name: &str, url: &str, children: Value) -> Self {
        Self::new(Value::Array(vec![name.into(), url.into(), children]))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    fn fields(&self) -> Option<&Vec<Value>> {
        self.raw.as_array()
    }

    pub fn name(&self) -> Option<&str> {
        self.fields()?.first()?.as_str()
    }

    pub fn url(&self) -> Option<&str> {
        self.fields()?.get(1)?.as_str()
    }

    pub fn children(&self) -> NavChildren<'_> {
        match self.fields().and_then(|f| f.get(2)) {
            Some(Value::String(page)) => NavChildren::Page(page),
            Some(Value::Array(members)) => {
                NavChildren::Members(members.iter().cloned().map(NavEntry::new).collect())
            }
            Some(Value::Null) => NavChildren::Leaf,
            _ => NavChildren::Invalid,
        }
    }

    fn children_raw(&self) -> Option<&Value> {
        self.fields()?.get(2)
    }
}

/// Parse the text of a navigation script.
///
/// # Errors
///
/// Returns [`Error::NavScript`] if the text is not a `var <ident> = [...];`
/// assignment or the literal is not valid JSON.
pub fn parse_nav_script(text: &str) -> Result<NavScript> {
    let malformed = |message: String| Error::NavScript { message };

    let rest = text
        .trim_start()
        .strip_prefix("var")
        .filter(|r| r.starts_with(char::is_whitespace))
        .ok_or_else(|| malformed("expected `var <name> = [...]`".to_string()))?;

    let (variable, literal) = rest
        .split_once('=')
        .ok_or_else(|| malformed("missing `=` after variable name".to_string()))?;
    let variable = variable.trim();
    let valid_ident = !variable.is_empty()
        && variable
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid_ident {
        return Err(malformed(format!("invalid variable name '{variable}'")));
    }

    let literal = literal.trim();
    let literal = literal.strip_suffix(';').unwrap_or(literal).trim_end();

    let value: Value = serde_json::from_str(literal)
        .map_err(|e| malformed(format!("array literal is not valid JSON: {e}")))?;
    let Value::Array(records) = value else {
        return Err(malformed("assigned value is not an array".to_string()));
    };

    Ok(NavScript {
        variable: variable.to_string(),
        entries: records.into_iter().map(NavEntry::new).collect(),
    })
}

/// Read and parse a navigation script from disk.
pub fn load_nav_script(path: &Path) -> Result<NavScript> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        operation: format!("read navigation script {}", path.display()),
        source,
    })?;
    parse_nav_script(&text)
}

/// A structural problem, located by index path (`[3][1]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for NavIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

struct Validator {
    issues: Vec<NavIssue>,
}

impl Validator {
    fn report(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(NavIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    /// Checks shared by namespaces and members. Returns `(name, url)` if the
    /// record is a 3-field array; either may be `None` if it is not a
    /// non-empty string.
    fn record<'a>(
        &mut self,
        path: &str,
        entry: &'a NavEntry,
    ) -> Option<(Option<&'a str>, Option<&'a str>)> {
        let Some(fields) = entry.fields() else {
            self.report(path, "record is not an array");
            return None;
        };
        if fields.len() != 3 {
            self.report(path, format!("record has {} fields, expected 3", fields.len()));
            return None;
        }

        let name = entry.name().filter(|n| !n.is_empty());
        if name.is_none() {
            self.report(path, "name must be a non-empty string");
        }
        let url = entry.url().filter(|u| !u.is_empty());
        if url.is_none() {
            self.report(path, "url must be a non-empty string");
        }
        Some((name, url))
    }

    fn unique_names(&mut self, parent: &str, entries: &[NavEntry]) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            let Some(name) = entry.name() else { continue };
            if let Some(first) = seen.get(name) {
                self.report(
                    &format!("{parent}[{i}]"),
                    format!("duplicate name '{name}' (first at {parent}[{first}])"),
                );
            } else {
                seen.insert(name, i);
            }
        }
    }

    fn namespace(&mut self, path: &str, entry: &NavEntry) {
        let Some((_, url)) = self.record(path, entry) else {
            return;
        };

        match entry.children() {
            NavChildren::Page(page) => {
                if page.is_empty() {
                    self.report(path, "page must be a non-empty string");
                } else if let Some(url) = url {
                    if page_of(url) != page {
                        self.report(path, format!("page '{page}' does not match url '{url}'"));
                    }
                }
            }
            NavChildren::Members(members) => {
                for (j, member) in members.iter().enumerate() {
                    self.member(&format!("{path}[{j}]"), member, url);
                }
                self.unique_names(path, &members);
            }
            NavChildren::Leaf => {}
            NavChildren::Invalid => {
                self.report(path, "third field must be a string, an array or null");
            }
        }
    }

    fn member(&mut self, path: &str, entry: &NavEntry, parent_url: Option<&str>) {
        let Some((_, url)) = self.record(path, entry) else {
            return;
        };

        if entry.children() != NavChildren::Leaf {
            self.report(path, "member must be a leaf (third field null)");
        }

        let (Some(url), Some(parent_url)) = (url, parent_url) else {
            return;
        };
        let parent_page = parent_url.split('#').next().unwrap_or(parent_url);
        match url.split_once('#') {
            Some((page, anchor)) if page == parent_page && !anchor.is_empty() => {}
            _ => self.report(
                path,
                format!("member url '{url}' is not an anchor on '{parent_page}'"),
            ),
        }
    }
}

/// Page name implied by a url: the path before any `#`, without `.html`.
fn page_of(url: &str) -> &str {
    let page = url.split('#').next().unwrap_or(url);
    page.strip_suffix(".html").unwrap_or(page)
}

/// Check every record and report all structural issues.
pub fn validate(entries: &[NavEntry]) -> Vec<NavIssue> {
    let mut validator = Validator { issues: Vec::new() };
    for (i, entry) in entries.iter().enumerate() {
        validator.namespace(&format!("[{i}]"), entry);
    }
    validator.unique_names("", entries);
    validator.issues
}

/// Differences between two snapshots, compared by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavDiff {
    /// Names only in the first snapshot
    pub removed: Vec<String>,
    /// Names only in the second snapshot
    pub added: Vec<String>,
    /// Names whose url or children differ
    pub changed: Vec<String>,
}

impl NavDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for NavDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "no differences");
        }
        for name in &self.removed {
            writeln!(f, "- {name}")?;
        }
        for name in &self.added {
            writeln!(f, "+ {name}")?;
        }
        for name in &self.changed {
            writeln!(f, "~ {name}")?;
        }
        Ok(())
    }
}

/// Compare two snapshots of the same navigation tree.
///
/// Records without a string name are ignored. A name repeated within one
/// snapshot is compared by its first record; [`validate`] reports the
/// repeat.
pub fn diff(a: &[NavEntry], b: &[NavEntry]) -> NavDiff {
    let index = |entries: &[NavEntry]| -> BTreeMap<String, NavEntry> {
        let mut index = BTreeMap::new();
        for entry in entries {
            if let Some(name) = entry.name() {
                index
                    .entry(name.to_string())
                    .or_insert_with(|| entry.clone());
            }
        }
        index
    };
    let left = index(a);
    let right = index(b);

    let mut result = NavDiff::default();
    for (name, entry) in &left {
        match right.get(name) {
            None => result.removed.push(name.clone()),
            Some(other) => {
                if entry.url() != other.url() || entry.children_raw() != other.children_raw() {
                    result.changed.push(name.clone());
                }
            }
        }
    }
    result.added = right
        .keys()
        .filter(|name| !left.contains_key(*name))
        .cloned()
        .collect();
    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SAMPLE: &str = r#"var namespaces_dup =
[
    [ "action", "namespaceaction.html", "namespaceaction" ],
    [ "helper", "namespacehelper.html", [
      [ "Q_to_np_matrix", "namespacehelper.html#a2e88ee3827a8bce85030dcbae23dd36d", null ],
      [ "state_dict_to_np_matrix", "namespacehelper.html#a66e9737bb3ec88cbef464d99836a6f4f", null ]
    ] ],
    [ "main", "namespacemain.html", [
      [ "main", "namespacemain.html#aa7a58ac748c5293faa4d77a82b94d161", null ]
    ] ]
];"#;

    #[test]
    fn test_parse_sample() {
        let script = parse_nav_script(SAMPLE).unwrap();
        assert_eq!(script.variable, "namespaces_dup");
        assert_eq!(script.entries.len(), 3);
        assert_eq!(script.entries[0].name(), Some("action"));
        assert_eq!(
            script.entries[0].children(),
            NavChildren::Page("namespaceaction")
        );
        match script.entries[1].children() {
            NavChildren::Members(members) => {
                assert_eq!(members.len(), 2);
                assert_eq!(members[0].children(), NavChildren::Leaf);
            }
            other => panic!("expected members, got {other:?}"),
        }
    }

    #[test]
    fn test_sample_is_valid() {
        let script = parse_nav_script(SAMPLE).unwrap();
        assert_eq!(validate(&script.entries), Vec::new());
    }

    #[test]
    fn test_parse_rejects_non_assignments() {
        assert!(parse_nav_script("[1, 2]").is_err());
        assert!(parse_nav_script("var x [1]").is_err());
        assert!(parse_nav_script("var x = {\"a\": 1};").is_err());
        assert!(parse_nav_script("var x = [1, ];").is_err());
        assert!(parse_nav_script("variable = [];").is_err());
    }

    #[test]
    fn test_two_field_record() {
        let entries = vec![NavEntry::new(json!(["action", "namespaceaction.html"]))];
        let issues = validate(&entries);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "[0]");
        assert!(issues[0].message.contains("2 fields"));
    }

    #[test]
    fn test_member_must_be_leaf() {
        let entries = vec![NavEntry::record(
            "helper",
            "namespacehelper.html",
            json!([["f", "namespacehelper.html#a1", "oops"]]),
        )];
        let issues = validate(&entries);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "[0][0]");
        assert!(issues[0].message.contains("leaf"));
    }

    #[test]
    fn test_member_anchor_on_parent_page() {
        let entries = vec![NavEntry::record(
            "helper",
            "namespacehelper.html",
            json!([
                ["f", "namespaceother.html#a1", null],
                ["g", "namespacehelper.html", null]
            ]),
        )];
        let issues = validate(&entries);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["[0][0]", "[0][1]"]);
    }

    #[test]
    fn test_duplicate_sibling_names() {
        let entries = vec![
            NavEntry::record("action", "namespaceaction.html", json!("namespaceaction")),
            NavEntry::record("state", "namespacestate.html", json!("namespacestate")),
            NavEntry::record("action", "namespaceaction.html", json!("namespaceaction")),
        ];
        let issues = validate(&entries);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "[2]");
        assert!(issues[0].message.contains("duplicate name 'action'"));
    }

    #[test]
    fn test_page_must_match_url() {
        let entries = vec![
            NavEntry::record("agent", "namespaceagent.html", json!("namespaceagent")),
            NavEntry::record("maze", "namespacemaze.html", json!("namespacestate")),
            NavEntry::record("policy", "namespacepolicy.html", json!("")),
        ];
        let issues = validate(&entries);
        let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "[1]: page 'namespacestate' does not match url 'namespacemaze.html'",
                "[2]: page must be a non-empty string",
            ]
        );
    }

    #[test]
    fn test_bad_field_types() {
        let entries = vec![
            NavEntry::new(json!(["", 3, "x"])),
            NavEntry::record("n", "n.html", json!(42)),
            NavEntry::new(json!("not a record")),
        ];
        let issues = validate(&entries);
        let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "[0]: name must be a non-empty string",
                "[0]: url must be a non-empty string",
                "[1]: third field must be a string, an array or null",
                "[2]: record is not an array",
            ]
        );
    }

    #[test]
    fn test_diff() {
        let a = vec![
            NavEntry::record("action", "namespaceaction.html", json!("namespaceaction")),
            NavEntry::record("gui", "namespacegui.html", json!("namespacegui")),
            NavEntry::record("main", "namespacemain.html", json!([])),
        ];
        let b = vec![
            NavEntry::record("action", "namespaceaction.html", json!("namespaceaction")),
            NavEntry::record(
                "main",
                "namespacemain.html",
                json!([["main", "namespacemain.html#a1", null]]),
            ),
            NavEntry::record("state", "namespacestate.html", json!("namespacestate")),
        ];
        let d = diff(&a, &b);
        assert_eq!(d.removed, vec!["gui"]);
        assert_eq!(d.added, vec!["state"]);
        assert_eq!(d.changed, vec!["main"]);
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn test_diff_compares_first_of_repeated_names() {
        let a = vec![
            NavEntry::record("x", "a.html", json!("a")),
            NavEntry::record("x", "b.html", json!("b")),
        ];
        let b = vec![NavEntry::record("x", "a.html", json!("a"))];
        assert!(diff(&a, &b).is_empty());
        assert!(diff(&b, &a).is_empty());

        let c = vec![NavEntry::record("x", "b.html", json!("b"))];
        assert_eq!(diff(&a, &c).changed, vec!["x"]);
    }
}
