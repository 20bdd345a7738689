//! PathSolver port - 経路計算の抽象化
//!
//! ワーカーは経路計算をこの trait 越しに呼びます。
//! 既定の実装は BFS（`BfsSolver`）。

use crate::domain::{KnightPath, PathError, Square, find_path};

pub trait PathSolver: Send + Sync {
    fn solve(&self, source: Square, target: Square) -> Result<KnightPath, PathError>;
}

/// 8x8 盤上の BFS
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsSolver;

impl PathSolver for BfsSolver {
    fn solve(&self, source: Square, target: Square) -> Result<KnightPath, PathError> {
        find_path(source, target)
    }
}
