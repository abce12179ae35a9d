//! In-process broker for tests: topic admin, publisher and source in one.

use async_trait::async_trait;
use logpipe_core::{PipelineEvent, Topic};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{BusError, EventPublisher, InboundMessage, MessageSource, Result, TopicAdmin, TopicSpec};

pub struct MemoryBus {
    topics: Mutex<HashMap<String, TopicSpec>>,
    log: Mutex<VecDeque<InboundMessage>>,
    next_offset: Mutex<HashMap<String, i64>>,
    available: AtomicBool,
    create_calls: AtomicUsize,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            log: Mutex::new(VecDeque::new()),
            next_offset: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            create_calls: AtomicUsize::new(0),
        }
    }
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topics(names: &[&str]) -> Self {
        let bus = Self::new();
        {
            let mut topics = bus.topics.lock();
            for name in names {
                topics.insert(name.to_string(), TopicSpec::default());
            }
        }
        bus
    }

    /// Simulate the broker going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn topic_names(&self) -> Vec<String> {
        self.topics.lock().keys().cloned().collect()
    }

    pub fn topic_spec(&self, topic: Topic) -> Option<TopicSpec> {
        self.topics.lock().get(topic.name()).copied()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Undelivered messages, oldest first
    pub fn pending(&self) -> Vec<InboundMessage> {
        self.log.lock().iter().cloned().collect()
    }

    /// Append a raw payload, bypassing event encoding
    pub fn inject(&self, topic: &str, payload: Option<&[u8]>) {
        let offset = self.advance_offset(topic);
        self.log.lock().push_back(InboundMessage {
            topic: topic.to_string(),
            partition: 0,
            offset,
            payload: payload.map(|p| p.to_vec()),
        });
    }

    fn advance_offset(&self, topic: &str) -> i64 {
        let mut offsets = self.next_offset.lock();
        let next = offsets.entry(topic.to_string()).or_insert(0);
        let offset = *next;
        *next += 1;
        offset
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BusError::Unavailable("broker unreachable".to_string()))
        }
    }
}

#[async_trait]
impl TopicAdmin for MemoryBus {
    async fn list_topics(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self.topic_names())
    }

    async fn create_topic(&self, topic: Topic, spec: TopicSpec) -> Result<()> {
        self.check_available()?;
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.topics.lock().entry(topic.name().to_string()).or_insert(spec);
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for MemoryBus {
    async fn publish(&self, event: &PipelineEvent) -> Result<()> {
        self.check_available()?;
        let payload = event.encode()?;
        self.inject(event.topic().name(), Some(&payload));
        Ok(())
    }
}

#[async_trait]
impl MessageSource for MemoryBus {
    /// Drains published messages; `None` when nothing is left
    async fn next_message(&self) -> Option<Result<InboundMessage>> {
        self.log.lock().pop_front().map(Ok)
    }
}
