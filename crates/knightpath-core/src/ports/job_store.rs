//! JobStore port - Job の正本（source of truth）
//!
//! JobStore は Job のレコード（入力・状態・結果）を id をキーに保持します。
//! 点読み・点書きのみで、範囲検索や二次インデックスは不要です。
//!
//! # 実装
//! - **InMemoryJobStore**: 開発・テスト用（`impls::inmem_store`）
//! - 本番ではキーバリューストアなど外部のストレージが実装する

use async_trait::async_trait;

use crate::domain::{Job, JobId};

/// StoreError は JobStore の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {0} already exists")]
    AlreadyExists(JobId),

    /// タイムアウトを含む一時的な障害
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// JobStore は Job の状態と結果の正本
///
/// # 整合性
/// - 同じ job id に対して `save` の後の `load` は保存した状態を観測する
/// - ロックは持たない（書き手は作成者とワーカーの 1 回ずつ）
#[async_trait]
pub trait JobStore: Send + Sync {
    /// 新規作成。同じ id が既にあれば `AlreadyExists`
    async fn create(&self, job: &Job) -> Result<(), StoreError>;

    /// 取得。なければ `NotFound`
    async fn load(&self, id: JobId) -> Result<Job, StoreError>;

    /// `job.id()` のレコードを丸ごと上書き
    async fn save(&self, job: &Job) -> Result<(), StoreError>;
}
