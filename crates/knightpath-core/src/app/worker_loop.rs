//! WorkerLoop - キューと ComputationWorker をつなぐ接着剤
//!
//! # フロー
//! 1. JobQueue::pop() で最大 batch_size 件を受信
//! 2. worker_concurrency 件ずつ並行に ComputationWorker::process()
//! 3. 結果でメッセージを処理
//!    - Ok: ack（Missing / AlreadyTerminal も処理済み）
//!    - リトライ可能なエラー: release（再配送に任せる）
//!    - リトライ不能なエラー: ack（再配送しても結果は変わらない）

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::worker::{ComputationWorker, ProcessOutcome};
use crate::config::PipelineConfig;
use crate::domain::PipelineError;
use crate::ports::{Delivery, JobQueue};

/// 1 件の配送の最終的な扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Acked(ProcessOutcome),
    Released,
    Dropped,
}

pub struct WorkerLoop {
    queue: Arc<dyn JobQueue>,
    worker: Arc<ComputationWorker>,
    config: PipelineConfig,
}

impl WorkerLoop {
    pub fn new(queue: Arc<dyn JobQueue>, worker: Arc<ComputationWorker>, config: PipelineConfig) -> Self {
        Self {
            queue,
            worker,
            config,
        }
    }

    /// 1 バッチ分を受信して処理する。受信がなければ空の Vec
    pub async fn run_once(&self) -> Result<Vec<Disposition>, PipelineError> {
        let deliveries = self.receive_batch().await?;
        Ok(self.dispatch(deliveries).await)
    }

    /// shutdown が true になるまで run_once を繰り返す
    ///
    /// 受信待ちの間だけ shutdown を監視し、受信済みのバッチは処理し切ってから止まる。
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            concurrency = self.config.worker_concurrency,
            batch_size = self.config.batch_size,
            "worker loop started"
        );
        while !*shutdown.borrow() {
            let received = tokio::select! {
                _ = shutdown.changed() => break,
                received = self.receive_batch() => received,
            };

            match received {
                Ok(deliveries) => {
                    self.dispatch(deliveries).await;
                }
                Err(e) => {
                    warn!(error = %e, "receiving from queue failed; backing off");
                    tokio::time::sleep(self.config.queue_wait).await;
                }
            }
        }
        info!("worker loop stopped");
    }

    async fn receive_batch(&self) -> Result<Vec<Delivery>, PipelineError> {
        let mut batch = Vec::new();
        let Some(first) = self.queue.pop(self.config.queue_wait).await? else {
            return Ok(batch);
        };
        batch.push(first);

        // 2 件目以降は待たない
        while batch.len() < self.config.batch_size {
            match self.queue.pop(std::time::Duration::ZERO).await? {
                Some(delivery) => batch.push(delivery),
                None => break,
            }
        }
        Ok(batch)
    }

    async fn dispatch(&self, deliveries: Vec<Delivery>) -> Vec<Disposition> {
        let mut dispositions = Vec::with_capacity(deliveries.len());
        let mut pending = deliveries.into_iter();

        loop {
            let mut tasks = JoinSet::new();
            for delivery in pending.by_ref().take(self.config.worker_concurrency) {
                let queue = Arc::clone(&self.queue);
                let worker = Arc::clone(&self.worker);
                tasks.spawn(async move { handle_delivery(queue.as_ref(), &worker, delivery).await });
            }
            if tasks.is_empty() {
                break;
            }
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(disposition) => dispositions.push(disposition),
                    Err(e) => error!(error = %e, "worker task panicked; message will be redelivered"),
                }
            }
        }
        dispositions
    }
}

async fn handle_delivery(
    queue: &dyn JobQueue,
    worker: &ComputationWorker,
    delivery: Delivery,
) -> Disposition {
    let job_id = delivery.job_id;
    debug!(%job_id, attempt = delivery.attempt, "delivery received");

    match worker.process(job_id).await {
        Ok(outcome) => {
            if let Err(e) = queue.ack(&delivery).await {
                // ack できなくても再配送は冪等に処理される
                warn!(%job_id, error = %e, "ack failed");
            }
            Disposition::Acked(outcome)
        }
        Err(e) if e.is_retryable() => {
            warn!(%job_id, attempt = delivery.attempt, error = %e, "processing failed; releasing for redelivery");
            if let Err(e) = queue.release(&delivery).await {
                warn!(%job_id, error = %e, "release failed; waiting for visibility timeout");
            }
            Disposition::Released
        }
        Err(e) => {
            error!(%job_id, error = %e, "processing failed permanently; dropping message");
            if let Err(e) = queue.ack(&delivery).await {
                warn!(%job_id, error = %e, "ack failed");
            }
            Disposition::Dropped
        }
    }
}
