//! knightpath-core
//!
//! ナイトの最短経路を非同期に計算するジョブパイプライン。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Square, KnightPath, Job, BFS, errors）
//! - **ports**: 抽象化レイヤー（JobStore, JobQueue, IdGenerator, Clock, PathSolver）
//! - **app**: アプリケーションロジック（admission, worker, results, worker_loop, builder）
//! - **impls**: 実装（InMemoryJobStore, InMemoryJobQueue）
//! - **config**: 実行時設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;
