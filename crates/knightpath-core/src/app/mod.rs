//! App - アプリケーション層
//!
//! ports を組み合わせてパイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **AdmissionService**: 入力検証、Job 作成、キュー投入
//! - **ComputationWorker**: job id を受けて経路を計算し保存（冪等）
//! - **ResultService**: 結果取得と Completed のキャッシュ
//! - **WorkerLoop**: キューからの受信と ack / release
//! - **AppBuilder**: ワイヤリング

pub mod admission;
pub mod builder;
pub mod results;
pub mod views;
pub mod worker;
pub mod worker_loop;

// 主要な型を再エクスポート
pub use self::admission::AdmissionService;
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::results::{ResultCache, ResultService};
pub use self::views::{CompletedResult, ResultView, SubmitRequest, SubmitResponse};
pub use self::worker::{ComputationWorker, ProcessOutcome};
pub use self::worker_loop::{Disposition, WorkerLoop};
