//! Errors - エラー型と分類
//!
//! 各 port のエラー（StoreError, QueueError）とドメインのエラー
//! （InvalidSquare, PathError, TransitionError, JobError）は `PipelineError` に集約されます。

use thiserror::Error;

use super::ids::InvalidJobId;
use super::job::{JobError, TransitionError};
use super::path::PathError;
use super::square::InvalidSquare;
use crate::ports::{QueueError, StoreError};

/// ErrorKind は実行エラーの分類
///
/// - Transient: 一時的なエラー（リトライ推奨）
/// - Permanent: 恒久的なエラー（リトライ無意味）
/// - Infrastructure: インフラエラー（ストア・キューの障害）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// PipelineError はパイプライン全体のエラー
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 不正な入力（同期的に拒否、リトライしない）
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 未知の job id
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("job queue unavailable: {0}")]
    QueueUnavailable(String),

    /// 起きてはならない状態（8x8 盤で経路が見つからない、id 衝突など）
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_)
            | PipelineError::NotFound(_)
            | PipelineError::InternalInvariantViolation(_) => ErrorKind::Permanent,
            PipelineError::StoreUnavailable(_) | PipelineError::QueueUnavailable(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// 呼び出し側（またはキューの再配送）でリトライする価値があるか
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient | ErrorKind::Infrastructure)
    }

    /// エントリポイントで返す HTTP 相当のステータスコード
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::InvalidInput(_) => 400,
            PipelineError::NotFound(_) => 404,
            PipelineError::StoreUnavailable(_) | PipelineError::QueueUnavailable(_) => 503,
            PipelineError::InternalInvariantViolation(_) => 500,
        }
    }
}

impl From<InvalidSquare> for PipelineError {
    fn from(err: InvalidSquare) -> Self {
        PipelineError::InvalidInput(err.to_string())
    }
}

impl From<InvalidJobId> for PipelineError {
    fn from(err: InvalidJobId) -> Self {
        // 形式が不正な id は存在し得ない id として扱う
        PipelineError::NotFound(err.0)
    }
}

impl From<PathError> for PipelineError {
    fn from(err: PathError) -> Self {
        PipelineError::InternalInvariantViolation(err.to_string())
    }
}

impl From<TransitionError> for PipelineError {
    fn from(err: TransitionError) -> Self {
        PipelineError::InternalInvariantViolation(err.to_string())
    }
}

impl From<JobError> for PipelineError {
    fn from(err: JobError) -> Self {
        PipelineError::InternalInvariantViolation(err.to_string())
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => PipelineError::NotFound(id.to_string()),
            StoreError::AlreadyExists(_) => PipelineError::InternalInvariantViolation(err.to_string()),
            StoreError::Unavailable(msg) => PipelineError::StoreUnavailable(msg),
        }
    }
}

impl From<QueueError> for PipelineError {
    fn from(err: QueueError) -> Self {
        PipelineError::QueueUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::JobId;
    use rstest::rstest;
    use ulid::Ulid;

    #[rstest]
    #[case::invalid(PipelineError::InvalidInput("x".into()), 400, false)]
    #[case::not_found(PipelineError::NotFound("x".into()), 404, false)]
    #[case::store(PipelineError::StoreUnavailable("x".into()), 503, true)]
    #[case::queue(PipelineError::QueueUnavailable("x".into()), 503, true)]
    #[case::invariant(PipelineError::InternalInvariantViolation("x".into()), 500, false)]
    fn classification(#[case] err: PipelineError, #[case] code: u16, #[case] retryable: bool) {
        assert_eq!(err.status_code(), code);
        assert_eq!(err.is_retryable(), retryable);
    }

    #[test]
    fn store_errors_map_to_pipeline_errors() {
        let id = JobId::from_ulid(Ulid::new());

        let err: PipelineError = StoreError::NotFound(id).into();
        assert!(matches!(err, PipelineError::NotFound(ref s) if *s == id.to_string()));

        let err: PipelineError = StoreError::AlreadyExists(id).into();
        assert!(matches!(err, PipelineError::InternalInvariantViolation(_)));

        let err: PipelineError = StoreError::Unavailable("timeout".into()).into();
        assert!(matches!(err, PipelineError::StoreUnavailable(ref s) if s == "timeout"));
    }

    #[test]
    fn invalid_square_is_invalid_input() {
        let err: PipelineError = "Z9".parse::<crate::domain::Square>().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Permanent);
        assert!(err.to_string().contains("Z9"));
    }
}
