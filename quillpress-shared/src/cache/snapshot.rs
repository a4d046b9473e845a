/// Versioned article snapshots
///
/// Cached articles are stored as
///
/// ```json
/// {"v": 1, "article": { "id": 1, "tag": { ... }, "title": "...", ... }}
/// ```
///
/// Bump [`SNAPSHOT_VERSION`] whenever the serialized shape of
/// [`Article`] changes. Readers treat any other version as a miss, so old
/// entries are dropped instead of misread after a deploy.

use crate::models::article::Article;
use serde::{Deserialize, Serialize};

/// Schema version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot decode failures
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot version {found} does not match reader version {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Corrupt snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    v: u32,
    article: &'a Article,
}

#[derive(Deserialize)]
struct VersionProbe {
    v: u32,
}

#[derive(Deserialize)]
struct Snapshot {
    article: Article,
}

/// Serializes `article` at the current schema version
pub fn encode(article: &Article) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&SnapshotRef {
        v: SNAPSHOT_VERSION,
        article,
    })
}

/// Decodes a snapshot written at the current schema version
pub fn decode(bytes: &[u8]) -> Result<Article, SnapshotError> {
    decode_versioned(bytes, SNAPSHOT_VERSION)
}

fn decode_versioned(bytes: &[u8], expected: u32) -> Result<Article, SnapshotError> {
    let probe: VersionProbe = serde_json::from_slice(bytes)?;
    if probe.v != expected {
        return Err(SnapshotError::VersionMismatch {
            found: probe.v,
            expected,
        });
    }

    let snapshot: Snapshot = serde_json::from_slice(bytes)?;
    Ok(snapshot.article)
}
