//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（ストレージ、キュー）へのインターフェースを
//! 提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - JobStore が source of truth（正本）
//! - JobQueue は配送キュー（job id のみ）

pub mod clock;
pub mod id_generator;
pub mod job_queue;
pub mod job_store;
pub mod solver;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::job_queue::{Delivery, JobQueue, QueueError};
pub use self::job_store::{JobStore, StoreError};
pub use self::solver::{BfsSolver, PathSolver};
