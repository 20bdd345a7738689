//! ComputationWorker - job id を受け取り経路を計算して保存する
//!
//! キューは at-least-once なので、同じ job id が何度届いても
//! 結果が変わらないこと（冪等性）がこのモジュールの中心的な性質です。
//! 冪等性は分散ロックではなく、Job の状態によるガードで実現します。
//!
//! # フロー
//! 1. JobStore::load
//!    - NotFound: ログを出して処理済み扱い（再配送しても意味がない）
//!    - Unavailable: エラーを返す（キューの再配送に任せる）
//! 2. 終端状態（Completed / Failed）なら何もしない
//! 3. Pending なら経路を計算し Completed として save
//!    - 計算に失敗したら Failed として save
//!    - 経路の端点が Job と一致しなければ Failed として save
//!    - Completed の save に失敗したら Failed の save を試みる。
//!      それも失敗したらエラーを返す

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::{Job, JobId, JobStatus, PipelineError};
use crate::ports::{Clock, JobStore, PathSolver, StoreError};

/// process の結果（いずれもメッセージは処理済みとして ack してよい）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// 経路を計算して Completed にした
    Completed { moves: usize },
    /// Failed にした
    Failed,
    /// 既に終端状態だった（再配送）
    AlreadyTerminal,
    /// Job が存在しない
    Missing,
}

pub struct ComputationWorker {
    store: Arc<dyn JobStore>,
    solver: Arc<dyn PathSolver>,
    clock: Arc<dyn Clock>,
}

impl ComputationWorker {
    pub fn new(store: Arc<dyn JobStore>, solver: Arc<dyn PathSolver>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            solver,
            clock,
        }
    }

    pub async fn process(&self, job_id: JobId) -> Result<ProcessOutcome, PipelineError> {
        let mut job = match self.store.load(job_id).await {
            Ok(job) => job,
            Err(StoreError::NotFound(_)) => {
                warn!(%job_id, "no job found for delivered id; dropping message");
                return Ok(ProcessOutcome::Missing);
            }
            Err(e) => return Err(e.into()),
        };

        if job.status().is_terminal() {
            debug!(%job_id, status = job.status().label(), "job already terminal; skipping redelivery");
            return Ok(ProcessOutcome::AlreadyTerminal);
        }

        let now = self.clock.now();
        let solved = self
            .solver
            .solve(job.source(), job.target())
            .map_err(PipelineError::from)
            .and_then(|path| {
                let moves = path.move_count();
                job.complete(path, now)?;
                Ok(moves)
            });

        match solved {
            Ok(moves) => match self.store.save(&job).await {
                Ok(()) => {
                    info!(%job_id, source = %job.source(), target = %job.target(), moves, "path calculation completed");
                    Ok(ProcessOutcome::Completed { moves })
                }
                Err(e) => {
                    error!(%job_id, error = %e, "saving completed job failed");
                    self.mark_failed(job_id, format!("saving result failed: {e}"))
                        .await
                }
            },
            Err(err) => {
                // 到達不能や端点の合わない経路は誤った結果として返さず Failed にする
                error!(%job_id, error = %err, "path calculation failed");
                job.fail(err.to_string(), now)?;
                self.store.save(&job).await?;
                Ok(ProcessOutcome::Failed)
            }
        }
    }

    /// Completed の save に失敗した後、保存済みの Pending を Failed にする
    async fn mark_failed(&self, job_id: JobId, reason: String) -> Result<ProcessOutcome, PipelineError> {
        let mut job: Job = self.store.load(job_id).await?;
        if !matches!(job.status(), JobStatus::Pending) {
            return Ok(ProcessOutcome::AlreadyTerminal);
        }
        job.fail(reason, self.clock.now())?;
        self.store.save(&job).await?;
        warn!(%job_id, "job marked failed");
        Ok(ProcessOutcome::Failed)
    }

    /// 1 回の配送でまとめて届いた job id を順に処理する
    ///
    /// 1 件の失敗が他の id の処理を妨げないよう、結果は id ごとに返す。
    pub async fn process_batch(
        &self,
        job_ids: &[JobId],
    ) -> Vec<(JobId, Result<ProcessOutcome, PipelineError>)> {
        let mut results = Vec::with_capacity(job_ids.len());
        for &job_id in job_ids {
            results.push((job_id, self.process(job_id).await));
        }
        results
    }
}
