//! InMemoryJobQueue - 開発用の配送キュー
//!
//! - tokio の Mutex + Notify による待機付き pop
//! - 受信したメッセージは in-flight に移り、visibility timeout を過ぎると再配送
//! - ack で削除、release で即座に再配送可能

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::domain::JobId;
use crate::ports::{Delivery, JobQueue, QueueError};

#[derive(Debug, Clone, Copy)]
struct Message {
    job_id: JobId,
    /// これまでに配送された回数
    deliveries: u32,
}

#[derive(Debug)]
struct InFlight {
    message: Message,
    visible_at: Instant,
}

#[derive(Debug, Default)]
struct QueueState {
    visible: VecDeque<Message>,
    in_flight: HashMap<u64, InFlight>,
    next_receipt: u64,
}

impl QueueState {
    /// visibility timeout を過ぎた in-flight を visible に戻す
    fn requeue_expired(&mut self, now: Instant) {
        let expired: Vec<u64> = self
            .in_flight
            .iter()
            .filter(|(_, f)| f.visible_at <= now)
            .map(|(receipt, _)| *receipt)
            .collect();
        for receipt in expired {
            if let Some(flight) = self.in_flight.remove(&receipt) {
                self.visible.push_back(flight.message);
            }
        }
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.in_flight.values().map(|f| f.visible_at).min()
    }

    fn deliver(&mut self, now: Instant, visibility_timeout: Duration) -> Option<Delivery> {
        let mut message = self.visible.pop_front()?;
        message.deliveries += 1;

        self.next_receipt += 1;
        let receipt = self.next_receipt;
        self.in_flight.insert(
            receipt,
            InFlight {
                message,
                visible_at: now + visibility_timeout,
            },
        );

        Some(Delivery {
            job_id: message.job_id,
            receipt,
            attempt: message.deliveries,
        })
    }
}

/// キューの滞留状況
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueDepth {
    pub visible: usize,
    pub in_flight: usize,
}

pub struct InMemoryJobQueue {
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
    visibility_timeout: Duration,
}

impl InMemoryJobQueue {
    pub fn new(visibility_timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            notify: Arc::new(Notify::new()),
            visibility_timeout,
        }
    }

    pub async fn depth(&self) -> QueueDepth {
        let state = self.state.lock().await;
        QueueDepth {
            visible: state.visible.len(),
            in_flight: state.in_flight.len(),
        }
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn push(&self, job_id: JobId) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.visible.push_back(Message {
            job_id,
            deliveries: 0,
        });
        drop(state);

        // 待機中の pop に通知
        self.notify.notify_one();
        Ok(())
    }

    async fn pop(&self, wait: Duration) -> Result<Option<Delivery>, QueueError> {
        let deadline = Instant::now() + wait;
        loop {
            let next_wake = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                state.requeue_expired(now);

                if let Some(delivery) = state.deliver(now, self.visibility_timeout) {
                    return Ok(Some(delivery));
                }
                if now >= deadline {
                    return Ok(None);
                }

                // 次に in-flight が戻ってくる時刻と deadline の早い方まで待つ
                state
                    .next_expiry()
                    .map_or(deadline, |expiry| expiry.min(deadline))
            };

            tokio::select! {
                _ = self.notify.notified() => {},
                _ = tokio::time::sleep_until(next_wake) => {},
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state
            .in_flight
            .remove(&delivery.receipt)
            .map(|_| ())
            .ok_or(QueueError::UnknownReceipt(delivery.receipt))
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        let flight = state
            .in_flight
            .remove(&delivery.receipt)
            .ok_or(QueueError::UnknownReceipt(delivery.receipt))?;
        state.visible.push_back(flight.message);
        drop(state);

        self.notify.notify_one();
        Ok(())
    }
}
