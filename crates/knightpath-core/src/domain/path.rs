//! KnightPath - ナイトの移動経路
//!
//! 空でなく、隣り合うマスが必ずナイトの 1 手で結ばれている Square 列。
//! BFS の結果か、`TryFrom<Vec<Square>>` による検証付き復元でしか作れません。

use serde::{Deserialize, Serialize};

use super::square::Square;

/// PathError は経路の構築・探索に関するエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path must contain at least one square")]
    Empty,

    #[error("illegal knight move {from} -> {to} at step {step}")]
    IllegalMove { step: usize, from: Square, to: Square },

    // `source` はフィールド名に使えない（thiserror が Error::source と解釈する）
    #[error("no knight path from {start} to {goal}")]
    Unreachable { start: Square, goal: Square },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Square>", into = "Vec<Square>")]
pub struct KnightPath {
    squares: Vec<Square>,
}

impl KnightPath {
    /// 0 手の経路（source == target）
    pub fn stay(square: Square) -> Self {
        Self {
            squares: vec![square],
        }
    }

    /// 検証済みの列から作る（path finder 専用）
    pub(crate) fn from_trusted(squares: Vec<Square>) -> Self {
        debug_assert!(Self::validate(&squares).is_ok());
        Self { squares }
    }

    fn validate(squares: &[Square]) -> Result<(), PathError> {
        if squares.is_empty() {
            return Err(PathError::Empty);
        }
        for (step, pair) in squares.windows(2).enumerate() {
            if !pair[0].is_knight_move_to(&pair[1]) {
                return Err(PathError::IllegalMove {
                    step: step + 1,
                    from: pair[0],
                    to: pair[1],
                });
            }
        }
        Ok(())
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    pub fn source(&self) -> Square {
        self.squares[0]
    }

    pub fn target(&self) -> Square {
        self.squares[self.squares.len() - 1]
    }

    /// 手数（= マス数 - 1）
    pub fn move_count(&self) -> usize {
        self.squares.len() - 1
    }
}

impl TryFrom<Vec<Square>> for KnightPath {
    type Error = PathError;

    fn try_from(squares: Vec<Square>) -> Result<Self, Self::Error> {
        Self::validate(&squares)?;
        Ok(Self { squares })
    }
}

impl From<KnightPath> for Vec<Square> {
    fn from(path: KnightPath) -> Self {
        path.squares
    }
}
