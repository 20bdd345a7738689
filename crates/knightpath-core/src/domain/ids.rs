//! Domain identifiers.
//!
//! # ULID ベースの JobId
//! - **時刻でソート可能**: timestamp が先頭にあるため、生成順序でソートできる
//! - **分散生成可能**: 調整なしで複数ノードで生成できる
//!
//! 外部（キューのメッセージ本文、結果取得のクエリ）には `job-<ULID>` の
//! 文字列として渡します。クライアントにとっては不透明な文字列です。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

const JOB_PREFIX: &str = "job-";

/// InvalidJobId は JobId 文字列のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed job id: {0:?}")]
pub struct InvalidJobId(pub String);

/// Identifier of a Job (submit/result unit, queue payload).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(Ulid);

impl JobId {
    /// ULID から JobId を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for JobId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", JOB_PREFIX, self.0)
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(JOB_PREFIX)
            .ok_or_else(|| InvalidJobId(s.to_string()))?;
        Ulid::from_string(raw)
            .map(JobId)
            .map_err(|_| InvalidJobId(s.to_string()))
    }
}

impl TryFrom<String> for JobId {
    type Error = InvalidJobId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.to_string()
    }
}
