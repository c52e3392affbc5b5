//! Notifications published by the registry after each successful mutation
//!
//! The registry hands every notification to a [`NotificationSink`] and moves
//! on. Sinks cannot fail the operation that produced the notification and the
//! registry never reads anything back.
//!
//! Two sinks ship with the crate:
//! - [`NotificationLog`]: in-process append-only log with a Blake3 hash chain
//! - [`TracingSink`]: emits each notification as a `tracing` event

use crate::types::{CandidateId, Identity};
use crate::{Result, internal_error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Structured record of a completed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// The owner registered a new candidate
    CandidateAdded { id: CandidateId, name: String },

    /// A vote was counted
    VoteReceived { id: CandidateId, new_count: u64 },

    /// The owner zeroed every counter
    VoteReset { caller: Identity, count: u64 },
}

impl Notification {
    /// Event name as observers see it
    pub fn name(&self) -> &'static str {
        match self {
            Notification::CandidateAdded { .. } => "CandidateAdded",
            Notification::VoteReceived { .. } => "VoteReceived",
            Notification::VoteReset { .. } => "VoteReset",
        }
    }
}

/// One-way destination for registry notifications
pub trait NotificationSink: Send + Sync {
    /// Append a notification. Must not block on observers.
    fn publish(&self, notification: Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn publish(&self, notification: Notification) {
        (**self).publish(notification)
    }
}

/// Sink that forwards notifications to `tracing` and keeps nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, notification: Notification) {
        match notification {
            Notification::CandidateAdded { id, name } => {
                tracing::info!(target: "ballot::notification", event = "CandidateAdded", id, %name);
            }
            Notification::VoteReceived { id, new_count } => {
                tracing::info!(target: "ballot::notification", event = "VoteReceived", id, new_count);
            }
            Notification::VoteReset { caller, count } => {
                tracing::info!(target: "ballot::notification", event = "VoteReset", caller = %caller, count);
            }
        }
    }
}

/// A notification as stored in the log, chained to its predecessor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Unique record identifier
    pub record_id: Uuid,

    /// Position in the log, starting at 1
    pub sequence: u64,

    /// When the record was appended
    pub recorded_at: DateTime<Utc>,

    /// Label of the registry that produced the notification
    pub source: String,

    /// Hash of the previous record (`None` for the first)
    pub previous_hash: Option<[u8; 32]>,

    /// Hash of `(notification, source)`
    pub content_hash: [u8; 32],

    /// The notification itself
    pub notification: Notification,
}

impl NotificationRecord {
    fn new(
        sequence: u64,
        previous_hash: Option<[u8; 32]>,
        source: String,
        notification: Notification,
    ) -> Result<Self> {
        let content_hash = Self::content_hash_of(&notification, &source)?;

        Ok(Self {
            record_id: Uuid::new_v4(),
            sequence,
            recorded_at: Utc::now(),
            source,
            previous_hash,
            content_hash,
            notification,
        })
    }

    fn content_hash_of(notification: &Notification, source: &str) -> Result<[u8; 32]> {
        let content = serde_json::to_vec(&(notification, source))?;
        Ok(blake3::hash(&content).into())
    }

    /// Hash of the whole record, used as the next record's `previous_hash`
    pub fn record_hash(&self) -> Result<[u8; 32]> {
        let content = serde_json::to_vec(self)?;
        Ok(blake3::hash(&content).into())
    }

    /// Whether the stored content hash still matches the notification
    pub fn verify_content(&self) -> Result<bool> {
        let expected = Self::content_hash_of(&self.notification, &self.source)?;
        use subtle::ConstantTimeEq;
        Ok(self.content_hash.ct_eq(&expected).into())
    }

    /// Flattened, hex-encoded form for export
    pub fn to_exported(&self) -> ExportedRecord {
        ExportedRecord {
            record_id: self.record_id.to_string(),
            sequence: self.sequence,
            recorded_at: self.recorded_at.to_rfc3339(),
            source: self.source.clone(),
            event: self.notification.name().to_string(),
            notification: self.notification.clone(),
            content_hash: hex::encode(self.content_hash),
            previous_hash: self.previous_hash.map(hex::encode),
        }
    }
}

/// Export format of a [`NotificationRecord`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedRecord {
    pub record_id: String,
    pub sequence: u64,
    pub recorded_at: String,
    pub source: String,
    pub event: String,
    pub notification: Notification,
    pub content_hash: String,
    pub previous_hash: Option<String>,
}

/// Kind of damage found while re-walking the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityViolationKind {
    ContentHashMismatch,
    HashChainBroken,
    SequenceGap,
}

/// A single integrity problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityViolation {
    pub sequence: u64,
    pub kind: IntegrityViolationKind,
}

/// Result of [`NotificationLog::verify_integrity`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub records_checked: usize,
    pub violations: Vec<IntegrityViolation>,
    pub chain_valid: bool,
}

#[derive(Debug, Default)]
struct LogState {
    records: Vec<NotificationRecord>,
    next_sequence: u64,
    last_hash: Option<[u8; 32]>,
}

/// Append-only in-memory notification log
///
/// Records are never removed or rewritten. Each record carries the hash of the
/// record before it, so any later modification shows up in
/// [`verify_integrity`](Self::verify_integrity).
#[derive(Debug)]
pub struct NotificationLog {
    source: String,
    state: RwLock<LogState>,
}

impl NotificationLog {
    /// Create an empty log labelled with `source`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            state: RwLock::new(LogState {
                next_sequence: 1,
                ..LogState::default()
            }),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &crate::config::NotificationConfig) -> Self {
        Self::new(config.source.clone())
    }

    /// Source label stamped on every record
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Append a notification and return the stored record
    pub fn append(&self, notification: Notification) -> Result<NotificationRecord> {
        let mut state = self
            .state
            .write()
            .map_err(|_| internal_error!("Notification log write error"))?;

        let record = NotificationRecord::new(
            state.next_sequence,
            state.last_hash,
            self.source.clone(),
            notification,
        )?;
        let record_hash = record.record_hash()?;

        state.records.push(record.clone());
        state.next_sequence += 1;
        state.last_hash = Some(record_hash);

        tracing::debug!(
            "📝 Notification appended: seq={}, event={}",
            record.sequence,
            record.notification.name()
        );

        Ok(record)
    }

    /// Snapshot of every record in append order
    pub fn records(&self) -> Result<Vec<NotificationRecord>> {
        let state = self
            .state
            .read()
            .map_err(|_| internal_error!("Notification log read error"))?;
        Ok(state.records.clone())
    }

    /// Notifications only, in append order
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        let state = self
            .state
            .read()
            .map_err(|_| internal_error!("Notification log read error"))?;
        Ok(state
            .records
            .iter()
            .map(|record| record.notification.clone())
            .collect())
    }

    /// Most recent record
    pub fn last(&self) -> Result<Option<NotificationRecord>> {
        let state = self
            .state
            .read()
            .map_err(|_| internal_error!("Notification log read error"))?;
        Ok(state.records.last().cloned())
    }

    /// Number of records
    pub fn len(&self) -> Result<usize> {
        let state = self
            .state
            .read()
            .map_err(|_| internal_error!("Notification log read error"))?;
        Ok(state.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Re-walk the chain and report content or link damage
    pub fn verify_integrity(&self) -> Result<IntegrityReport> {
        let state = self
            .state
            .read()
            .map_err(|_| internal_error!("Notification log read error"))?;

        let mut report = IntegrityReport {
            records_checked: 0,
            violations: Vec::new(),
            chain_valid: true,
        };

        let mut previous_hash: Option<[u8; 32]> = None;

        for (index, record) in state.records.iter().enumerate() {
            report.records_checked += 1;

            if record.sequence != index as u64 + 1 {
                report.violations.push(IntegrityViolation {
                    sequence: record.sequence,
                    kind: IntegrityViolationKind::SequenceGap,
                });
            }

            if !record.verify_content()? {
                report.violations.push(IntegrityViolation {
                    sequence: record.sequence,
                    kind: IntegrityViolationKind::ContentHashMismatch,
                });
            }

            if record.previous_hash != previous_hash {
                report.violations.push(IntegrityViolation {
                    sequence: record.sequence,
                    kind: IntegrityViolationKind::HashChainBroken,
                });
            }

            previous_hash = Some(record.record_hash()?);
        }

        report.chain_valid = report.violations.is_empty();

        if !report.chain_valid {
            tracing::warn!(
                "🚨 Notification log integrity violations: {}",
                report.violations.len()
            );
        }

        Ok(report)
    }

    /// Render the whole log as a JSON array of [`ExportedRecord`]s
    pub fn export_json(&self) -> Result<String> {
        let exported: Vec<ExportedRecord> = self
            .records()?
            .iter()
            .map(NotificationRecord::to_exported)
            .collect();
        Ok(serde_json::to_string_pretty(&exported)?)
    }
}

impl NotificationSink for NotificationLog {
    fn publish(&self, notification: Notification) {
        if let Err(e) = self.append(notification) {
            tracing::warn!("⚠️  Dropped notification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn sample_notifications() -> Vec<Notification> {
        vec![
            Notification::CandidateAdded {
                id: 3,
                name: "Carol".to_string(),
            },
            Notification::VoteReceived { id: 3, new_count: 1 },
            Notification::VoteReset {
                caller: Identity::from_label("owner"),
                count: 3,
            },
        ]
    }

    #[test]
    fn test_append_assigns_sequence_and_chain() {
        let log = NotificationLog::new("test-registry");
        assert!(log.is_empty().unwrap());

        let mut appended = Vec::new();
        for notification in sample_notifications() {
            appended.push(log.append(notification).unwrap());
        }

        assert_eq!(log.len().unwrap(), 3);
        assert_eq!(appended[0].sequence, 1);
        assert_eq!(appended[1].sequence, 2);
        assert_eq!(appended[2].sequence, 3);

        assert_eq!(appended[0].previous_hash, None);
        assert_eq!(
            appended[1].previous_hash,
            Some(appended[0].record_hash().unwrap())
        );
        assert_eq!(
            appended[2].previous_hash,
            Some(appended[1].record_hash().unwrap())
        );

        assert!(appended.iter().all(|r| r.source == "test-registry"));
        assert_eq!(log.last().unwrap().unwrap().sequence, 3);
    }

    #[test]
    fn test_publish_is_append() {
        let log = NotificationLog::new("test-registry");
        for notification in sample_notifications() {
            log.publish(notification);
        }

        assert_eq!(log.notifications().unwrap(), sample_notifications());
        assert!(log.verify_integrity().unwrap().chain_valid);
    }

    #[test]
    fn test_integrity_detects_tampering() {
        let log = NotificationLog::new("test-registry");
        for notification in sample_notifications() {
            log.append(notification).unwrap();
        }

        {
            let mut state = log.state.write().unwrap();
            state.records[1].notification = Notification::VoteReceived {
                id: 3,
                new_count: 100,
            };
        }

        let report = log.verify_integrity().unwrap();
        assert!(!report.chain_valid);
        assert_eq!(report.records_checked, 3);

        // Content of record 2 no longer matches, and record 3 links to the old record 2
        assert!(report.violations.iter().any(|v| v.sequence == 2
            && v.kind == IntegrityViolationKind::ContentHashMismatch));
        assert!(report.violations.iter().any(|v| v.sequence == 3
            && v.kind == IntegrityViolationKind::HashChainBroken));
    }

    #[test]
    fn test_export_json() {
        let log = NotificationLog::new("export-test");
        for notification in sample_notifications() {
            log.append(notification).unwrap();
        }

        let json = log.export_json().unwrap();
        let exported: Vec<ExportedRecord> = serde_json::from_str(&json).unwrap();

        assert_eq!(exported.len(), 3);
        assert_eq!(exported[0].event, "CandidateAdded");
        assert_eq!(exported[0].previous_hash, None);
        assert_eq!(exported[2].event, "VoteReset");
        assert_eq!(exported[2].content_hash.len(), 64);
        assert!(exported.iter().all(|r| r.source == "export-test"));
    }

    #[test]
    fn test_tracing_sink_accepts_everything() {
        let sink = TracingSink;
        for notification in sample_notifications() {
            sink.publish(notification);
        }
    }

    #[test]
    fn test_poisoned_log_swallows_publish() {
        let log = NotificationLog::new("poison-test");
        log.append(sample_notifications().remove(0)).unwrap();

        let poisoned = catch_unwind(AssertUnwindSafe(|| {
            let _guard = log.state.write().unwrap();
            panic!("writer died holding the log");
        }));
        assert!(poisoned.is_err());

        // Publishing must return normally; the failure only reaches the log output
        for notification in sample_notifications() {
            log.publish(notification);
        }

        assert!(matches!(
            log.append(sample_notifications().remove(1)),
            Err(Error::Internal { .. })
        ));
        assert!(matches!(log.len(), Err(Error::Internal { .. })));
        assert!(matches!(log.is_empty(), Err(Error::Internal { .. })));
        assert!(matches!(log.records(), Err(Error::Internal { .. })));
    }
}
