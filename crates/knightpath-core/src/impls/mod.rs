//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryJobStore**: 開発用の正本
//! - **InMemoryJobQueue**: 開発用の配送キュー（at-least-once、visibility timeout 付き）
//!
//! 本番用の実装（外部ストレージ・マネージドキュー）は別クレートに置く想定です。

pub mod inmem_queue;
pub mod inmem_store;

// 主要な型を再エクスポート
pub use self::inmem_queue::{InMemoryJobQueue, QueueDepth};
pub use self::inmem_store::InMemoryJobStore;
