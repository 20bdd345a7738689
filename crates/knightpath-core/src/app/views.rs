//! Views - エントリポイントの入出力
//!
//! JSON のフィールド名は camelCase（`jobId`, `moveCount`）。

use serde::{Deserialize, Serialize};

use crate::domain::{Job, JobId, KnightPath, Square};

pub const SUBMIT_ACCEPTED_MESSAGE: &str = "Job created. Query the job id to get your result.";
pub const PROCESSING_MESSAGE: &str = "Calculation is still processing";

/// 投入リクエスト `{ source, target }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub source: String,
    pub target: String,
}

/// 投入レスポンス。拒否時は `jobId: null`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: Option<JobId>,
    pub message: String,
}

impl SubmitResponse {
    pub fn accepted(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            message: SUBMIT_ACCEPTED_MESSAGE.to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            job_id: None,
            message: message.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.job_id.is_some()
    }
}

/// 完了した Job の結果本体（キャッシュされる）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedResult {
    pub job_id: JobId,
    pub source: Square,
    pub target: Square,
    pub path: KnightPath,
    pub move_count: usize,
}

impl CompletedResult {
    /// Completed の Job からのみ作れる
    pub fn from_job(job: &Job) -> Option<Self> {
        let path = job.path()?.clone();
        Some(Self {
            job_id: job.id(),
            source: job.source(),
            target: job.target(),
            move_count: path.move_count(),
            path,
        })
    }
}

/// 結果取得のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultView {
    #[serde(rename_all = "camelCase")]
    Processing { job_id: JobId, message: String },

    Completed(CompletedResult),

    #[serde(rename_all = "camelCase")]
    Failed { job_id: JobId, reason: String },
}

impl ResultView {
    pub fn processing(job_id: JobId) -> Self {
        ResultView::Processing {
            job_id,
            message: PROCESSING_MESSAGE.to_string(),
        }
    }

    pub fn job_id(&self) -> JobId {
        match self {
            ResultView::Processing { job_id, .. } | ResultView::Failed { job_id, .. } => *job_id,
            ResultView::Completed(result) => result.job_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ResultView::Completed(_))
    }
}
