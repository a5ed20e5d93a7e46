/*
[INPUT]:  Ordered TaskExecution records and a status classifier
[OUTPUT]: HistoryView with per-record status, icon and duration
[POS]:    Projection layer - execution history view model
[UPDATE]: When changing status rules or the history entry shape
*/

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use taskrunner_adapter::TaskExecution;

/// Markers that flag a run as failed when found in its output
pub const DEFAULT_FAILURE_MARKERS: [&str; 2] = ["Error", "Failed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure,
}

impl ExecutionStatus {
    pub fn icon_class(self) -> &'static str {
        match self {
            ExecutionStatus::Success => "check-circle",
            ExecutionStatus::Failure => "close-circle",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ExecutionStatus::Success => "green",
            ExecutionStatus::Failure => "red",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success => f.write_str("SUCCESS"),
            ExecutionStatus::Failure => f.write_str("FAILURE"),
        }
    }
}

/// Decides the status of a run from its captured output
pub trait StatusClassifier: Send + Sync {
    fn classify(&self, output: &str) -> ExecutionStatus;
}

impl<F> StatusClassifier for F
where
    F: Fn(&str) -> ExecutionStatus + Send + Sync,
{
    fn classify(&self, output: &str) -> ExecutionStatus {
        self(output)
    }
}

/// Case-sensitive substring classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClassifier {
    markers: Vec<String>,
}

impl MarkerClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|marker: &String| !marker.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_MARKERS)
    }
}

impl StatusClassifier for MarkerClassifier {
    fn classify(&self, output: &str) -> ExecutionStatus {
        if self.markers.iter().any(|marker| output.contains(marker.as_str())) {
            ExecutionStatus::Failure
        } else {
            ExecutionStatus::Success
        }
    }
}

/// One row of the history timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub status: ExecutionStatus,
    pub icon_class: &'static str,
    pub color: &'static str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
    pub output: String,
}

impl HistoryEntry {
    pub fn duration_label(&self) -> String {
        format!("{}ms", self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    /// The task has never run
    Empty,
    /// Entries in server order (chronological)
    Entries(Vec<HistoryEntry>),
}

impl HistoryView {
    pub fn len(&self) -> usize {
        match self {
            HistoryView::Empty => 0,
            HistoryView::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, HistoryView::Empty)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        match self {
            HistoryView::Empty => &[],
            HistoryView::Entries(entries) => entries,
        }
    }
}

/// Projects execution records into a status-annotated view
#[derive(Clone)]
pub struct HistoryProjector {
    classifier: Arc<dyn StatusClassifier>,
}

impl HistoryProjector {
    pub fn new(classifier: Arc<dyn StatusClassifier>) -> Self {
        Self { classifier }
    }

    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Arc::new(MarkerClassifier::new(markers)))
    }

    pub fn classify(&self, execution: &TaskExecution) -> ExecutionStatus {
        self.classifier.classify(&execution.output)
    }

    /// Input order is preserved; records are never re-sorted
    pub fn project(&self, executions: &[TaskExecution]) -> HistoryView {
        if executions.is_empty() {
            return HistoryView::Empty;
        }

        let entries = executions
            .iter()
            .map(|execution| {
                let status = self.classify(execution);
                HistoryEntry {
                    status,
                    icon_class: status.icon_class(),
                    color: status.color(),
                    start_time: execution.start_time,
                    end_time: execution.end_time,
                    duration_ms: execution.duration_ms(),
                    output: execution.output.clone(),
                }
            })
            .collect();
        HistoryView::Entries(entries)
    }
}

impl Default for HistoryProjector {
    fn default() -> Self {
        Self::new(Arc::new(MarkerClassifier::default()))
    }
}

impl fmt::Debug for HistoryProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryProjector").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution(start: &str, end: &str, output: &str) -> TaskExecution {
        TaskExecution {
            start_time: start.parse().expect("start"),
            end_time: end.parse().expect("end"),
            output: output.to_string(),
        }
    }

    #[test]
    fn test_default_markers_flag_failures() {
        let classifier = MarkerClassifier::default();
        assert_eq!(classifier.classify("Error: exit 1"), ExecutionStatus::Failure);
        assert_eq!(classifier.classify("PodPhase: Failed\n"), ExecutionStatus::Failure);
        assert_eq!(classifier.classify("Hello World\n"), ExecutionStatus::Success);
        // Markers are case-sensitive
        assert_eq!(classifier.classify("no error here"), ExecutionStatus::Success);
    }

    #[test]
    fn test_duration_from_timestamps() {
        let projector = HistoryProjector::default();
        let view = projector.project(&[execution(
            "2024-01-01T00:00:00.000Z",
            "2024-01-01T00:00:01.500Z",
            "Hello World\n",
        )]);

        let entry = &view.entries()[0];
        assert_eq!(entry.duration_ms, 1500);
        assert_eq!(entry.duration_label(), "1500ms");
        assert_eq!(entry.status, ExecutionStatus::Success);
        assert_eq!(entry.icon_class, "check-circle");
        assert_eq!(entry.color, "green");
    }

    #[test]
    fn test_empty_input_is_explicit_empty_view() {
        let view = HistoryProjector::default().project(&[]);
        assert_eq!(view, HistoryView::Empty);
        assert!(view.is_empty());
        assert!(view.entries().is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        // Deliberately out of time order: the server's order wins
        let executions = vec![
            execution("2024-01-02T00:00:00Z", "2024-01-02T00:00:01Z", "second"),
            execution("2024-01-01T00:00:00Z", "2024-01-01T00:00:01Z", "Error: first"),
            execution("2024-01-03T00:00:00Z", "2024-01-03T00:00:03Z", "third"),
        ];

        let view = HistoryProjector::default().project(&executions);
        let outputs: Vec<&str> = view.entries().iter().map(|e| e.output.as_str()).collect();
        assert_eq!(outputs, ["second", "Error: first", "third"]);
        assert_eq!(view.len(), 3);
        assert_eq!(view.entries()[1].status, ExecutionStatus::Failure);
        assert_eq!(view.entries()[1].icon_class, "close-circle");
    }

    #[test]
    fn test_custom_markers_replace_defaults() {
        let projector = HistoryProjector::with_markers(["exit code", ""]);
        let view = projector.project(&[
            execution("2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z", "exit code 2"),
            execution("2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z", "Error"),
        ]);

        let statuses: Vec<ExecutionStatus> = view.entries().iter().map(|e| e.status).collect();
        assert_eq!(statuses, [ExecutionStatus::Failure, ExecutionStatus::Success]);
    }

    #[test]
    fn test_closure_classifier() {
        let projector = HistoryProjector::new(Arc::new(|output: &str| {
            if output.trim_end().ends_with("exit 0") {
                ExecutionStatus::Success
            } else {
                ExecutionStatus::Failure
            }
        }));
        let view = projector.project(&[execution(
            "2024-01-01T00:00:00Z",
            "2024-01-01T00:00:00Z",
            "done, exit 0\n",
        )]);
        assert_eq!(view.entries()[0].status, ExecutionStatus::Success);
    }
}
