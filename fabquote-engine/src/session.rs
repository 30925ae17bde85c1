use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fabquote_core::measurement::Measurement;
use tracing::{debug, info};

use crate::pricing::{self, Quote, RateTable, Selection};

/// 一次文件选择对应的凭据；只有最新一代的结果会被接受。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTicket {
    generation: u64,
    file_tag: String,
}

impl QuoteTicket {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn file_tag(&self) -> &str {
        &self.file_tag
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Accepted,
    Stale { latest: u64 },
}

#[derive(Debug, Clone)]
struct Accepted {
    file_tag: String,
    measurement: Measurement,
}

/// 防止较早文件的测量覆盖较新文件的测量。可跨线程共享。
#[derive(Debug, Default)]
pub struct QuoteSession {
    generation: AtomicU64,
    current: Mutex<Option<Accepted>>,
}

impl QuoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始处理新文件，旧文件的测量随即失效。
    pub fn begin(&self, file_tag: impl Into<String>) -> QuoteTicket {
        let mut current = self.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *current = None;
        let ticket = QuoteTicket {
            generation,
            file_tag: file_tag.into(),
        };
        debug!(generation, file = %ticket.file_tag, "开始新的报价会话");
        ticket
    }

    pub fn complete(&self, ticket: &QuoteTicket, measurement: Measurement) -> Completion {
        let mut current = self.lock();
        let latest = self.generation.load(Ordering::SeqCst);
        if ticket.generation != latest {
            info!(
                stale = ticket.generation,
                latest,
                file = %ticket.file_tag,
                "丢弃过期的测量结果"
            );
            return Completion::Stale { latest };
        }
        *current = Some(Accepted {
            file_tag: ticket.file_tag.clone(),
            measurement,
        });
        Completion::Accepted
    }

    #[inline]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<(String, Measurement)> {
        self.lock()
            .as_ref()
            .map(|accepted| (accepted.file_tag.clone(), accepted.measurement))
    }

    pub fn quote(&self, rates: Option<&RateTable>, selection: &Selection) -> Quote {
        let measurement = self.lock().as_ref().map(|accepted| accepted.measurement);
        pricing::price(measurement.as_ref(), rates, selection)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Accepted>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
