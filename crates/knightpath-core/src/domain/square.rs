//! Square - 8x8 盤面上の座標
//!
//! `"A1"` 〜 `"H8"` の 2 文字ラベルを値オブジェクトとして扱います。
//! 不正な入力はパース時点で拒否されるため、`Square` は常に有効です。
//!
//! # 大文字・小文字
//! file は大文字に正規化します（`"a1"` は `"A1"` として受理）。
//! 前後の空白はトリムしません。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 盤面の一辺のマス数
pub const BOARD_SIZE: u8 = 8;

/// InvalidSquare は座標ラベルのパースエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid square {input:?}: expected a file A-H followed by a rank 1-8 (e.g. \"A1\", \"H8\")")]
pub struct InvalidSquare {
    pub input: String,
}

/// Square は盤面上の 1 マス
///
/// 内部表現は 0 始まりの (file, rank)。`A1` が `(0, 0)`、`H8` が `(7, 7)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// 0 始まりの file/rank から Square を作成（盤外なら None）
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < BOARD_SIZE && rank < BOARD_SIZE).then_some(Self { file, rank })
    }

    /// 0 始まりの file（A = 0）
    pub fn file(&self) -> u8 {
        self.file
    }

    /// 0 始まりの rank（1 = 0）
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// (rank, file) 方向にずらした Square（盤外なら None）
    pub fn offset(&self, d_rank: i8, d_file: i8) -> Option<Self> {
        let rank = i16::from(self.rank) + i16::from(d_rank);
        let file = i16::from(self.file) + i16::from(d_file);
        let rank = u8::try_from(rank).ok()?;
        let file = u8::try_from(file).ok()?;
        Self::new(file, rank)
    }

    /// 盤面上の 64 マスを A1, B1, ..., H8 の順で列挙
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Square { file, rank }))
    }

    /// 0..64 のインデックス（BFS の visited 配列用）
    pub(crate) fn index(&self) -> usize {
        usize::from(self.rank) * usize::from(BOARD_SIZE) + usize::from(self.file)
    }

    /// 2 マスがナイトの 1 手で移動できる関係か
    pub fn is_knight_move_to(&self, other: &Square) -> bool {
        let df = self.file.abs_diff(other.file);
        let dr = self.rank.abs_diff(other.rank);
        matches!((df, dr), (1, 2) | (2, 1))
    }
}

/// ラベルをパースして Square を返す
pub fn parse_square(text: &str) -> Result<Square, InvalidSquare> {
    let invalid = || InvalidSquare {
        input: text.to_string(),
    };

    let mut chars = text.chars();
    let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(invalid());
    };

    let file = file.to_ascii_uppercase();
    if !('A'..='H').contains(&file) || !('1'..='8').contains(&rank) {
        return Err(invalid());
    }

    Ok(Square {
        file: file as u8 - b'A',
        rank: rank as u8 - b'1',
    })
}

impl FromStr for Square {
    type Err = InvalidSquare;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_square(s)
    }
}

impl TryFrom<String> for Square {
    type Error = InvalidSquare;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_square(&value)
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.file) as char, (b'1' + self.rank) as char)
    }
}
