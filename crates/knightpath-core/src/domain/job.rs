//! Job record and status management.
//!
//! # 状態遷移
//! ```text
//! Pending --(worker success)--> Completed
//! Pending --(worker error)----> Failed
//! ```
//! Completed / Failed は終端。経路は `Completed` の中にしか存在しないため、
//! 「Completed なのに経路がない」状態は表現できません。
//! 経路の端点は Job の source / target と一致していなければならず、
//! `complete` とデシリアライズの両方で検査します。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::JobId;
use super::path::KnightPath;
use super::square::Square;

/// Job status (closed tagged variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// 受付済み、ワーカー未処理
    Pending,

    /// 経路計算済み
    Completed { path: KnightPath },

    /// 計算または保存に失敗
    Failed { reason: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed { .. } => "completed",
            JobStatus::Failed { .. } => "failed",
        }
    }
}

/// TransitionError は不正な状態遷移
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job {job_id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub job_id: JobId,
    pub from: &'static str,
    pub to: &'static str,
}

/// JobError は Job の更新・復元時の不変条件違反
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("job {job_id} runs {start} -> {goal} but its path runs {path_start} -> {path_goal}")]
    PathMismatch {
        job_id: JobId,
        start: Square,
        goal: Square,
        path_start: Square,
        path_goal: Square,
    },
}

/// Job: 経路計算の単位と、その結果。
///
/// - id / source / target は作成後に変わらない
/// - status の変更はメソッド経由のみ（`complete` / `fail`）
/// - Completed の経路は source から target まで
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JobRecord")]
pub struct Job {
    id: JobId,
    source: Square,
    target: Square,
    #[serde(flatten)]
    status: JobStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    /// Pending の新しい Job
    pub fn new(id: JobId, source: Square, target: Square, now: DateTime<Utc>) -> Self {
        Self {
            id,
            source,
            target,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn source(&self) -> Square {
        self.source
    }

    pub fn target(&self) -> Square {
        self.target
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Completed の場合のみ経路を返す
    pub fn path(&self) -> Option<&KnightPath> {
        match &self.status {
            JobStatus::Completed { path } => Some(path),
            _ => None,
        }
    }

    /// Completed の場合のみ手数を返す
    pub fn move_count(&self) -> Option<usize> {
        self.path().map(KnightPath::move_count)
    }

    /// Pending -> Completed（経路の端点が一致しなければ何も変えない）
    pub fn complete(&mut self, path: KnightPath, now: DateTime<Utc>) -> Result<(), JobError> {
        self.ensure_pending("completed")?;
        self.ensure_endpoints(&path)?;
        self.status = JobStatus::Completed { path };
        self.updated_at = now;
        Ok(())
    }

    /// Pending -> Failed
    pub fn fail(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.ensure_pending("failed")?;
        self.status = JobStatus::Failed {
            reason: reason.into(),
        };
        self.updated_at = now;
        Ok(())
    }

    fn ensure_pending(&self, to: &'static str) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError {
                job_id: self.id,
                from: self.status.label(),
                to,
            });
        }
        Ok(())
    }

    fn ensure_endpoints(&self, path: &KnightPath) -> Result<(), JobError> {
        if path.source() != self.source || path.target() != self.target {
            return Err(JobError::PathMismatch {
                job_id: self.id,
                start: self.source,
                goal: self.target,
                path_start: path.source(),
                path_goal: path.target(),
            });
        }
        Ok(())
    }
}

/// 保存形式そのまま（検査前）の Job
#[derive(Deserialize)]
struct JobRecord {
    id: JobId,
    source: Square,
    target: Square,
    #[serde(flatten)]
    status: JobStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRecord> for Job {
    type Error = JobError;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        let job = Job {
            id: record.id,
            source: record.source,
            target: record.target,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        if let Some(path) = job.path() {
            job.ensure_endpoints(path)?;
        }
        Ok(job)
    }
}
