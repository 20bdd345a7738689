//! AdmissionService - 入力検証、Job 作成、キュー投入
//!
//! # フロー
//! 1. source / target をパース（不正なら即座に拒否。Job もメッセージも作らない）
//! 2. 新しい JobId で Pending の Job を作成し JobStore::create
//! 3. JobQueue::push で job id を送る
//! 4. 2 と 3 の両方が成功したときだけ job id を返す
//!
//! 3 が失敗した場合、作成済みの Pending Job は孤児になります。
//! エラーは呼び出し側に伝播し、孤児の掃除は外部の reconciliation に任せます。

use std::sync::Arc;

use tracing::{error, info};

use super::views::{SubmitRequest, SubmitResponse};
use crate::domain::{Job, JobId, PipelineError, parse_square};
use crate::ports::{Clock, IdGenerator, JobQueue, JobStore};

pub struct AdmissionService {
    store: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl AdmissionService {
    pub fn new(
        store: Arc<dyn JobStore>,
        queue: Arc<dyn JobQueue>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            queue,
            ids,
            clock,
        }
    }

    pub async fn submit(&self, source: &str, target: &str) -> Result<JobId, PipelineError> {
        let source = parse_square(source)?;
        let target = parse_square(target)?;

        let job = Job::new(self.ids.generate_job_id(), source, target, self.clock.now());
        let job_id = job.id();

        self.store.create(&job).await?;

        if let Err(e) = self.queue.push(job_id).await {
            error!(%job_id, error = %e, "enqueue failed; pending job left without a queue message");
            return Err(e.into());
        }

        info!(%job_id, %source, %target, "job accepted");
        Ok(job_id)
    }

    /// エントリポイント用。不正な座標は `jobId: null` のレスポンスに変換し、
    /// インフラ障害はそのまま伝播する。
    pub async fn handle(&self, request: &SubmitRequest) -> Result<SubmitResponse, PipelineError> {
        match self.submit(&request.source, &request.target).await {
            Ok(job_id) => Ok(SubmitResponse::accepted(job_id)),
            Err(PipelineError::InvalidInput(message)) => {
                info!(source = %request.source, target = %request.target, "submission rejected");
                Ok(SubmitResponse::rejected(message))
            }
            Err(e) => Err(e),
        }
    }
}
