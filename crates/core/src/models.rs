use serde::{Deserialize, Serialize};

/// One discovered file: the unit of work for the scheduler and the carrier
/// of its computed fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Assigned by a downstream store; never used by the engine.
    pub id: Option<i64>,
    /// Relative, forward-slash path; unique within one run and the key that
    /// correlates a scheduled task with its result.
    pub path: String,
    /// Byte length as observed at enumeration time. Authoritative for tactic
    /// selection; the engine never re-stats mid-run.
    pub size: i64,
    /// Unix seconds, informational only.
    pub modify_time: i64,
    /// Unix seconds, informational only.
    pub create_time: i64,
    /// Free-form, carried through for downstream consumers.
    #[serde(default)]
    pub suggested_tags: String,
    /// Empty until computed; set exactly once per run.
    #[serde(default)]
    pub fingerprint: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, size: i64, modify_time: i64, create_time: i64) -> Self {
        Self {
            id: None,
            path: path.into(),
            size,
            modify_time,
            create_time,
            suggested_tags: String::new(),
            fingerprint: String::new(),
        }
    }
}
