//! Pipeline and report events, and observers that log them.
//!
//! Both [`crate::cleaning::CleaningPipeline`] and [`crate::report::ReportAssembler`] accept an
//! optional [`PipelineObserver`]. Observers are notified synchronously, in stage order.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::DataType;

/// Ordered stages of the cleaning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleaningStage {
    NormalizeColumns,
    CanonicalizeNulls,
    PruneEmpty,
    CoerceTypes,
    Deduplicate,
    ResolveNulls,
}

impl fmt::Display for CleaningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NormalizeColumns => "normalize_columns",
            Self::CanonicalizeNulls => "canonicalize_nulls",
            Self::PruneEmpty => "prune_empty",
            Self::CoerceTypes => "coerce_types",
            Self::Deduplicate => "deduplicate",
            Self::ResolveNulls => "resolve_nulls",
        };
        f.write_str(s)
    }
}

/// Events emitted while cleaning a dataset or assembling reports.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageFinished {
        stage: CleaningStage,
        rows_in: usize,
        rows_out: usize,
        elapsed: Duration,
    },
    ColumnCoerced {
        column: String,
        parsed: usize,
        failed: usize,
        data_type: DataType,
    },
    ReportProduced {
        name: String,
        rows: usize,
    },
    /// A report's guard columns are absent; it was emitted empty.
    ReportSkipped {
        name: String,
        missing: Vec<String>,
    },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StageFinished {
                stage,
                rows_in,
                rows_out,
                elapsed,
            } => write!(
                f,
                "stage={stage} rows_in={rows_in} rows_out={rows_out} elapsed={elapsed:?}"
            ),
            Self::ColumnCoerced {
                column,
                parsed,
                failed,
                data_type,
            } => write!(
                f,
                "coerce column={column} parsed={parsed} failed={failed} type={}",
                data_type.name()
            ),
            Self::ReportProduced { name, rows } => write!(f, "report={name} rows={rows}"),
            Self::ReportSkipped { name, missing } => {
                write!(f, "report={name} skipped missing={missing:?}")
            }
        }
    }
}

/// Observer hook for pipeline events.
///
/// Implementors can record metrics, write logs, or collect events for tests.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &PipelineEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Logs events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ReportSkipped { .. } => eprintln!("[reports][skip] {event}"),
            PipelineEvent::ReportProduced { .. } => eprintln!("[reports][ok] {event}"),
            _ => eprintln!("[clean] {event}"),
        }
    }
}

/// Forwards events to `tracing` (stage/report events at info, per-column events at debug).
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ColumnCoerced { .. } => tracing::debug!(%event, "column coerced"),
            PipelineEvent::ReportSkipped { name, .. } => {
                tracing::info!(report = %name, %event, "report emitted empty")
            }
            _ => tracing::info!(%event),
        }
    }
}

/// Appends events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_event(&self, event: &PipelineEvent) {
        self.append_line(&format!("{} {event}", unix_ts()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Test helper that records every event it sees.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    /// Snapshot of the recorded events, in arrival order.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{
        CleaningStage, CompositeObserver, FileObserver, PipelineEvent, PipelineObserver,
        RecordingObserver,
    };

    #[test]
    fn composite_fans_out_to_every_observer() {
        let a = Arc::new(RecordingObserver::default());
        let b = Arc::new(RecordingObserver::default());
        let composite = CompositeObserver::new(vec![a.clone(), b.clone()]);

        composite.on_event(&PipelineEvent::ReportProduced {
            name: "kpi_summary".to_string(),
            rows: 3,
        });

        assert_eq!(a.events().len(), 1);
        assert_eq!(b.events(), a.events());
    }

    #[test]
    fn file_observer_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let obs = FileObserver::new(&path);

        obs.on_event(&PipelineEvent::StageFinished {
            stage: CleaningStage::Deduplicate,
            rows_in: 3,
            rows_out: 2,
            elapsed: Duration::from_millis(1),
        });
        obs.on_event(&PipelineEvent::ReportSkipped {
            name: "top_reasons".to_string(),
            missing: vec!["reason".to_string()],
        });

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("stage=deduplicate rows_in=3 rows_out=2"));
        assert!(lines[1].contains("report=top_reasons skipped"));
    }
}
