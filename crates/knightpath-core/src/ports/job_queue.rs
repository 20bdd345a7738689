//! JobQueue port - 配送キュー
//!
//! JobQueue は job id のみを流します（入力や状態は JobStore に保存）。
//!
//! # 配送保証
//! - at-least-once: 同じメッセージが複数回届くことはあるが、黙って消えることはない
//! - メッセージ間の順序は保証しない
//!
//! 受信したメッセージ（Delivery）は `ack` するまで in-flight で、
//! visibility timeout を過ぎるか `release` されると再び配送されます。

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::JobId;

/// QueueError は JobQueue の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue operation failed: {0}")]
    OperationFailed(String),

    #[error("unknown receipt: {0}")]
    UnknownReceipt(u64),
}

/// Delivery は 1 回分の受信
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub job_id: JobId,
    /// ack / release に使うハンドル（受信ごとに異なる）
    pub receipt: u64,
    /// このメッセージが配送された回数（初回は 1）
    pub attempt: u32,
}

/// JobQueue は job id を配送するためのキュー
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// job id を 1 メッセージとして送る
    async fn push(&self, job_id: JobId) -> Result<(), QueueError>;

    /// 最大 `wait` だけ待って 1 件受信する（なければ None）
    async fn pop(&self, wait: Duration) -> Result<Option<Delivery>, QueueError>;

    /// 処理完了。メッセージを削除する
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// 処理失敗。メッセージを即座に再配送可能にする
    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError>;
}
