// Poll loop inputs set by the external UI
use crate::application::axis_scaler::ScaleMode;
use crate::application::series_fetcher::FetchRequest;
use crate::domain::dashboard::SLOT_COUNT;
use crate::domain::topic::{Catalog, SlotSelection};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Controls {
    /// Selected wire ids per slot; empty string means nothing selected
    pub topics: Vec<String>,
    pub limit: NonZeroUsize,
    pub stopped: bool,
    pub align_axes: bool,
}

/// Partial update as sent by the UI. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlsUpdate {
    pub topics: Option<Vec<String>>,
    pub limit: Option<usize>,
    pub stopped: Option<bool>,
    pub align_axes: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlsError {
    #[error("limit must be a positive integer")]
    ZeroLimit,

    #[error("at most 3 topics can be selected, got {0}")]
    TooManyTopics(usize),
}

/// Resolved selection for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSelection {
    pub request: FetchRequest,
    pub slots: [Option<SlotSelection>; SLOT_COUNT],
    pub mode: ScaleMode,
    pub limit: NonZeroUsize,
}

impl Controls {
    pub fn new(topics: Vec<String>, limit: NonZeroUsize) -> Result<Self, ControlsError> {
        check_topics(&topics)?;
        Ok(Self {
            topics,
            limit,
            stopped: false,
            align_axes: false,
        })
    }

    pub fn merged(&self, update: ControlsUpdate) -> Result<Self, ControlsError> {
        let mut next = self.clone();
        if let Some(topics) = update.topics {
            check_topics(&topics)?;
            next.topics = topics;
        }
        if let Some(limit) = update.limit {
            next.limit = NonZeroUsize::new(limit).ok_or(ControlsError::ZeroLimit)?;
        }
        if let Some(stopped) = update.stopped {
            next.stopped = stopped;
        }
        if let Some(align_axes) = update.align_axes {
            next.align_axes = align_axes;
        }
        Ok(next)
    }

    /// Resolve the selection against the catalog.
    ///
    /// The first composite topic, if any, owns every slot and is fetched from
    /// the legacy endpoint. Otherwise each slot shows one generic field.
    /// Unknown ids leave their slot inactive.
    pub fn plan(&self, catalog: &Catalog) -> TickSelection {
        let resolved: Vec<_> = self
            .topics
            .iter()
            .filter(|value| !value.is_empty())
            .filter_map(|value| {
                let topic = catalog.resolve(value);
                if topic.is_none() {
                    tracing::debug!(topic = %value, "Unknown topic selected, slot left inactive");
                }
                topic
            })
            .collect();

        let mut slots: [Option<SlotSelection>; SLOT_COUNT] = Default::default();
        let mode = ScaleMode::from_aligned(self.align_axes);

        if let Some(topic) = resolved.iter().find(|t| t.kind().is_composite()) {
            let kind = topic.kind();
            for (slot, channel) in slots.iter_mut().zip(kind.channels(&topic.label)) {
                *slot = Some(SlotSelection {
                    kind: kind.clone(),
                    channel,
                });
            }
            return TickSelection {
                request: FetchRequest::Topic {
                    topic: topic.value.clone(),
                    limit: self.limit,
                },
                slots,
                mode,
                limit: self.limit,
            };
        }

        let mut fields: Vec<String> = Vec::new();
        for (index, value) in self.topics.iter().enumerate().take(SLOT_COUNT) {
            let Some(topic) = catalog.resolve(value) else {
                continue;
            };
            let kind = topic.kind();
            if let Some(channel) = kind.channels(&topic.label).into_iter().next() {
                if !fields.contains(&channel.key) {
                    fields.push(channel.key.clone());
                }
                slots[index] = Some(SlotSelection { kind, channel });
            }
        }

        TickSelection {
            request: FetchRequest::Fields {
                fields,
                limit: self.limit,
            },
            slots,
            mode,
            limit: self.limit,
        }
    }
}

fn check_topics(topics: &[String]) -> Result<(), ControlsError> {
    if topics.len() > SLOT_COUNT {
        return Err(ControlsError::TooManyTopics(topics.len()));
    }
    Ok(())
}
