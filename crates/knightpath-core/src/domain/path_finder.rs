//! Path finder - ナイトの最短経路を BFS で求める
//!
//! ノードは 64 マス、辺はナイトの 8 方向の移動。重みなしグラフなので
//! BFS で最初に到達した経路が最短になります。
//!
//! # 決定性
//! 方向は `KNIGHT_OFFSETS` の固定順で展開するため、最短経路が複数ある場合も
//! 同じ入力には常に同じ経路を返します。
//!
//! # visited
//! enqueue した時点で visited にする（dequeue 時ではない）。
//! 同じマスが別の親から二重に enqueue されることはありません。

use std::collections::VecDeque;

use super::path::{KnightPath, PathError};
use super::square::Square;

/// ナイトの移動方向 (d_rank, d_file)。展開順はこの並びで固定。
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const CELLS: usize = 64;

/// source から target への最短ナイト経路を返す
///
/// - `source == target` なら 1 マス・0 手の経路
/// - フロンティアが尽きた場合は `PathError::Unreachable`
///   （8x8 盤では起こらない。呼び出し側は不変条件違反として扱う）
pub fn find_path(source: Square, target: Square) -> Result<KnightPath, PathError> {
    find_path_avoiding(source, target, |_| false)
}

/// `blocked` が true を返すマスを通らずに最短経路を探す
///
/// 盤上に障害物があるケースの検証や、到達不能時の挙動の確認に使う。
pub(crate) fn find_path_avoiding(
    source: Square,
    target: Square,
    blocked: impl Fn(Square) -> bool,
) -> Result<KnightPath, PathError> {
    if source == target {
        return Ok(KnightPath::stay(source));
    }

    let mut parent: [Option<Square>; CELLS] = [None; CELLS];
    let mut visited = [false; CELLS];
    let mut frontier = VecDeque::with_capacity(CELLS);

    visited[source.index()] = true;
    frontier.push_back(source);

    while let Some(current) = frontier.pop_front() {
        for (d_rank, d_file) in KNIGHT_OFFSETS {
            let Some(next) = current.offset(d_rank, d_file) else {
                continue;
            };
            if visited[next.index()] || blocked(next) {
                continue;
            }
            visited[next.index()] = true;
            parent[next.index()] = Some(current);

            if next == target {
                return Ok(reconstruct(&parent, source, target));
            }
            frontier.push_back(next);
        }
    }

    Err(PathError::Unreachable {
        start: source,
        goal: target,
    })
}

fn reconstruct(parent: &[Option<Square>; CELLS], source: Square, target: Square) -> KnightPath {
    let mut squares = vec![target];
    let mut cursor = target;
    while cursor != source {
        match parent[cursor.index()] {
            Some(prev) => {
                squares.push(prev);
                cursor = prev;
            }
            None => break,
        }
    }
    squares.reverse();
    KnightPath::from_trusted(squares)
}
