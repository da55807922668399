use serde::{Deserialize, Deserializer, Serialize};

/// One commit as read from history, before it becomes a node in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRow {
    pub hash: String,
    #[serde(default, deserialize_with = "deserialize_parents")]
    pub parents: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl CommitRow {
    pub fn new(hash: &str, parents: &[&str]) -> Self {
        Self {
            hash: hash.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            author: String::new(),
            subject: String::new(),
            timestamp: 0,
        }
    }

    /// Builds a row from the `%P` field of `git log`: parents separated by
    /// single spaces, the empty string for the root commit.
    pub fn from_log_fields(
        hash: &str,
        parents: &str,
        author: &str,
        subject: &str,
        timestamp: i64,
    ) -> Self {
        Self {
            hash: hash.to_string(),
            parents: split_parents(parents),
            author: author.to_string(),
            subject: subject.to_string(),
            timestamp,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// A named pointer at a commit. Ids may carry a trailing `*` marking the
/// checked-out branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadRef {
    pub id: String,
    #[serde(alias = "target")]
    pub pointed_hash: String,
}

impl HeadRef {
    pub fn new(id: &str, pointed_hash: &str) -> Self {
        Self {
            id: id.to_string(),
            pointed_hash: pointed_hash.to_string(),
        }
    }

    /// The id used for coloring: everything before the last `*`.
    pub fn color_key(&self) -> &str {
        strip_checkout_marker(&self.id)
    }
}

/// Commits and heads as seen at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub commits: Vec<CommitRow>,
    #[serde(default)]
    pub heads: Vec<HeadRef>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.heads.is_empty()
    }
}

pub fn strip_checkout_marker(id: &str) -> &str {
    match id.rfind('*') {
        Some(idx) => &id[..idx],
        None => id,
    }
}

pub fn split_parents(raw: &str) -> Vec<String> {
    raw.split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParentsField {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_parents<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ParentsField::deserialize(deserializer)? {
        ParentsField::Joined(raw) => split_parents(&raw),
        ParentsField::List(list) => list.into_iter().filter(|p| !p.is_empty()).collect(),
    })
}
