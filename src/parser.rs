use crate::ir::{CommitRow, HeadRef, Snapshot};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^head\s+(\S+)\s+(\S+)$").unwrap());
static SHOW_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9a-fA-F]{4,64})\s+refs/heads/(\S+)$").unwrap());
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3,}$").unwrap());

/// Parses one or more snapshots.
///
/// JSON input (an object with `commits`/`heads`, an array of such objects, or
/// `{"snapshots": [...]}`) is read leniently through json5. Anything else is
/// read as text: one commit per line in `git log --pretty=format:%H|%P|%an|%s|%ct`
/// form, heads as `head <name> <hash>` or `git show-ref` lines, snapshots
/// separated by a line of dashes.
pub fn parse_snapshots(input: &str) -> Result<Vec<Snapshot>> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return parse_json_snapshots(trimmed);
    }
    parse_text_snapshots(input)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Sequence { snapshots: Vec<Snapshot> },
    Many(Vec<Snapshot>),
    One(Snapshot),
}

fn parse_json_snapshots(input: &str) -> Result<Vec<Snapshot>> {
    let parsed: SnapshotFile =
        json5::from_str(input).context("input is not a valid snapshot document")?;
    Ok(match parsed {
        SnapshotFile::Sequence { snapshots } => snapshots,
        SnapshotFile::Many(snapshots) => snapshots,
        SnapshotFile::One(snapshot) => vec![snapshot],
    })
}

fn parse_text_snapshots(input: &str) -> Result<Vec<Snapshot>> {
    let mut snapshots = Vec::new();
    let mut current = Snapshot::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if SEPARATOR_RE.is_match(line) {
            snapshots.push(std::mem::take(&mut current));
            continue;
        }
        if let Some(caps) = HEAD_RE.captures(line) {
            current.heads.push(HeadRef::new(&caps[1], &caps[2]));
            continue;
        }
        if let Some(caps) = SHOW_REF_RE.captures(line) {
            current.heads.push(HeadRef::new(&caps[2], &caps[1]));
            continue;
        }
        let row = parse_log_line(line)
            .with_context(|| format!("line {line_no}: cannot parse '{line}'"))?;
        current.commits.push(row);
    }

    if !current.is_empty() || snapshots.is_empty() {
        snapshots.push(current);
    }
    Ok(snapshots)
}

/// `hash|parents|author|subject|timestamp`. The subject may itself contain `|`.
pub fn parse_log_line(line: &str) -> Result<CommitRow> {
    let (rest, time) = line
        .rsplit_once('|')
        .ok_or_else(|| anyhow::anyhow!("expected 5 '|'-separated fields"))?;
    let mut fields = rest.splitn(4, '|');
    let hash = fields.next().unwrap_or_default().trim();
    let parents = fields
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing parent field"))?;
    let author = fields
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing author field"))?;
    let subject = fields
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing subject field"))?;
    if hash.is_empty() {
        anyhow::bail!("empty commit hash");
    }
    let time = time.trim();
    let timestamp = if time.is_empty() {
        0
    } else {
        time.parse::<i64>()
            .with_context(|| format!("invalid timestamp '{time}'"))?
    };
    Ok(CommitRow::from_log_fields(
        hash,
        parents.trim(),
        author,
        subject,
        timestamp,
    ))
}
