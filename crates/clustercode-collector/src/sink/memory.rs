use std::sync::Mutex;

use clustercode_common::{ChartDefinition, ChartHandle};

use super::{ChartSink, SampleBatch};
use crate::error::SinkError;

/// Host call as observed by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Create(String),
    Begin(String),
    Set(String, u64),
    End,
}

/// In-process sink that records every call, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    created: usize,
    events: Vec<SinkEvent>,
    batches: Vec<SampleBatch>,
    fail_create: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_chart` fail.
    pub fn fail_create(&self, fail: bool) {
        self.lock().fail_create = fail;
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().events.clone()
    }

    pub fn batches(&self) -> Vec<SampleBatch> {
        self.lock().batches.clone()
    }

    pub fn create_count(&self) -> usize {
        self.lock().created
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the recorded calls.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChartSink for MemorySink {
    fn create_chart(&self, definition: &ChartDefinition) -> Result<ChartHandle, SinkError> {
        let mut inner = self.lock();
        if inner.fail_create {
            return Err(SinkError::Rejected {
                id: definition.id.clone(),
                reason: "create disabled".to_string(),
            });
        }
        inner.created += 1;
        inner.events.push(SinkEvent::Create(definition.id.clone()));
        Ok(ChartHandle {
            id: definition.id.clone(),
            update_every: definition.update_every,
        })
    }

    fn commit(&self, batch: &SampleBatch) -> Result<(), SinkError> {
        let mut inner = self.lock();
        for update in &batch.updates {
            inner.events.push(SinkEvent::Begin(update.chart.id.clone()));
            for sample in &update.samples {
                inner
                    .events
                    .push(SinkEvent::Set(sample.dimension.clone(), sample.value));
            }
            inner.events.push(SinkEvent::End);
        }
        inner.batches.push(batch.clone());
        Ok(())
    }
}
