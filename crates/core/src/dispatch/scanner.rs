//! Row scanner: picks the rows a cycle should claim.

use tracing::{debug, info};

use crate::source::{ColumnMap, Row, RowState, SharedSheet, SourceError};

/// Which already-touched rows a cycle may pick up again.
///
/// `NotStarted` rows are always eligible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Also take rows left `InProgress` (recovery after a crash).
    pub restart_in_progress: bool,
    /// Also take `Errored` rows.
    pub restart_errors: bool,
    /// Take every ready row, whatever its state.
    pub restart_all: bool,
}

impl RestartPolicy {
    /// The policy for every cycle after the first: one-shot restarts are
    /// dropped, `restart_errors` stays.
    pub fn narrowed(self) -> Self {
        Self {
            restart_in_progress: false,
            restart_all: false,
            ..self
        }
    }

    /// Whether a row in `state` (`None` = unrecognised cell) is eligible.
    pub fn admits(&self, state: Option<RowState>) -> bool {
        if self.restart_all {
            return true;
        }
        match state {
            Some(RowState::NotStarted) => true,
            Some(RowState::InProgress) => self.restart_in_progress,
            Some(RowState::Errored) => self.restart_errors,
            Some(RowState::Complete) | None => false,
        }
    }
}

/// Whether `row` should be claimed under `policy`.
pub fn is_eligible(row: &Row, columns: &ColumnMap, policy: &RestartPolicy) -> bool {
    row.is_ready(columns) && policy.admits(row.state(columns))
}

/// Reads every row and returns the eligible ones in sheet order.
pub async fn scan(
    sheet: &SharedSheet,
    columns: &ColumnMap,
    policy: &RestartPolicy,
) -> Result<Vec<Row>, SourceError> {
    info!("Checking for new jobs");
    let rows = sheet.read_all_rows().await?;
    let total = rows.len();

    let eligible: Vec<Row> = rows
        .into_iter()
        .filter(|row| is_eligible(row, columns, policy))
        .collect();

    debug!("{} of {} rows eligible", eligible.len(), total);
    Ok(eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySource;

    fn row(id: u32, ready: &str, state: &str) -> Row {
        let columns = ColumnMap::default();
        Row::new(
            id,
            [
                (columns.ready.clone(), ready.to_string()),
                (columns.state.clone(), state.to_string()),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_default_policy() {
        let columns = ColumnMap::default();
        let policy = RestartPolicy::default();

        assert!(is_eligible(&row(1, "Ready", ""), &columns, &policy));
        assert!(is_eligible(&row(1, "Ready", "Not Yet"), &columns, &policy));
        assert!(!is_eligible(&row(1, "Ready", "In Progress"), &columns, &policy));
        assert!(!is_eligible(&row(1, "Ready", "Errored"), &columns, &policy));
        assert!(!is_eligible(&row(1, "Ready", "Complete"), &columns, &policy));
        assert!(!is_eligible(&row(1, "Ready", "???"), &columns, &policy));
    }

    #[test]
    fn test_not_ready_is_never_eligible() {
        let columns = ColumnMap::default();
        let everything = RestartPolicy {
            restart_in_progress: true,
            restart_errors: true,
            restart_all: true,
        };
        for state in ["", "In Progress", "Errored", "Complete"] {
            assert!(!is_eligible(&row(1, "Not Ready", state), &columns, &everything));
            assert!(!is_eligible(&row(1, "", state), &columns, &everything));
        }
    }

    #[test]
    fn test_restart_flags() {
        let columns = ColumnMap::default();
        let in_progress = RestartPolicy {
            restart_in_progress: true,
            ..Default::default()
        };
        assert!(is_eligible(&row(1, "Ready", "In Progress"), &columns, &in_progress));
        assert!(!is_eligible(&row(1, "Ready", "Errored"), &columns, &in_progress));

        let errors = RestartPolicy {
            restart_errors: true,
            ..Default::default()
        };
        assert!(is_eligible(&row(1, "Ready", "Errored"), &columns, &errors));
        assert!(!is_eligible(&row(1, "Ready", "In Progress"), &columns, &errors));

        let all = RestartPolicy {
            restart_all: true,
            ..Default::default()
        };
        assert!(is_eligible(&row(1, "Ready", "Complete"), &columns, &all));
        assert!(is_eligible(&row(1, "Ready", "???"), &columns, &all));
    }

    #[test]
    fn test_narrowed_keeps_restart_errors() {
        let policy = RestartPolicy {
            restart_in_progress: true,
            restart_errors: true,
            restart_all: true,
        };
        assert_eq!(
            policy.narrowed(),
            RestartPolicy {
                restart_in_progress: false,
                restart_errors: true,
                restart_all: false,
            }
        );
    }

    #[tokio::test]
    async fn test_scan_filters_in_order() {
        let columns = ColumnMap::default();
        let source = MemorySource::new(vec![
            row(1, "Ready", ""),
            row(2, "Ready", "Complete"),
            row(3, "", ""),
            row(4, "Ready", "Not Yet"),
        ]);
        let sheet = source.shared_sheet();

        let rows = scan(&sheet, &columns, &RestartPolicy::default()).await.unwrap();
        let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_scan_propagates_read_failure() {
        let source = MemorySource::new(vec![row(1, "Ready", "")]);
        source.fail_reads(1);
        let sheet = source.shared_sheet();

        let err = scan(&sheet, &ColumnMap::default(), &RestartPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
