//! Domain model (squares, paths, jobs, errors).
//!
//! - square: 盤面座標（パース・検証）
//! - path: 検証済みのナイト経路
//! - path_finder: BFS による最短経路探索
//! - ids / job: Job とその状態遷移
//! - errors: パイプライン共通のエラー

pub mod errors;
pub mod ids;
pub mod job;
pub mod path;
pub mod path_finder;
pub mod square;

pub use errors::{ErrorKind, PipelineError};
pub use ids::{InvalidJobId, JobId};
pub use job::{Job, JobError, JobStatus, TransitionError};
pub use path::{KnightPath, PathError};
pub use path_finder::{KNIGHT_OFFSETS, find_path};
pub use square::{InvalidSquare, Square, parse_square};
