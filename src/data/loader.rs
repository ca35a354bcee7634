//! Loading the record collections from JSON files.
//!
//! All five files must be present and well-formed; a single bad file fails
//! the whole load so the server never starts on a partial snapshot.

use super::Dataset;
use crate::analysis::calendar::parse_timestamp;
use crate::analysis::YearMonth;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ACCOUNTS_FILE: &str = "accounts.json";
pub const REPS_FILE: &str = "reps.json";
pub const DEALS_FILE: &str = "deals.json";
pub const ACTIVITIES_FILE: &str = "activities.json";
pub const TARGETS_FILE: &str = "targets.json";

/// Failure while loading the dataset.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data directory not found: {}", .0.display())]
    MissingDir(PathBuf),

    #[error("data file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record in {file}: {message}")]
    Invalid { file: &'static str, message: String },
}

/// Read one JSON array file.
fn read_collection<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, DataError> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(DataError::MissingFile(path));
    }

    let content = fs::read_to_string(&path).map_err(|source| DataError::Read {
        path: path.clone(),
        source,
    })?;

    let records: Vec<T> =
        serde_json::from_str(&content).map_err(|source| DataError::Malformed {
            path: path.clone(),
            source,
        })?;

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn check_timestamp(file: &'static str, id: &str, field: &str, raw: &str) -> Result<(), DataError> {
    match parse_timestamp(raw) {
        Some(_) => Ok(()),
        None => Err(DataError::Invalid {
            file,
            message: format!("{} '{}' on {} is not an ISO-8601 date", field, raw, id),
        }),
    }
}

/// Reject records the aggregations could not interpret.
fn validate(data: &Dataset) -> Result<(), DataError> {
    for deal in &data.deals {
        check_timestamp(DEALS_FILE, &deal.deal_id, "created_at", &deal.created_at)?;
        if let Some(ref closed_at) = deal.closed_at {
            check_timestamp(DEALS_FILE, &deal.deal_id, "closed_at", closed_at)?;
            if deal.stage.is_open() {
                warn!(
                    "Deal {} is {} but has closed_at {}; ignoring it",
                    deal.deal_id, deal.stage, closed_at
                );
            }
        }
    }

    for activity in &data.activities {
        check_timestamp(
            ACTIVITIES_FILE,
            &activity.activity_id,
            "timestamp",
            &activity.timestamp,
        )?;
    }

    for target in &data.targets {
        target
            .month
            .parse::<YearMonth>()
            .map_err(|e| DataError::Invalid {
                file: TARGETS_FILE,
                message: e.to_string(),
            })?;
    }

    Ok(())
}

impl Dataset {
    /// Load and validate all five collections from `dir`.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        if !dir.is_dir() {
            return Err(DataError::MissingDir(dir.to_path_buf()));
        }

        info!("Loading dataset from {}", dir.display());

        let data = Dataset {
            accounts: read_collection(dir, ACCOUNTS_FILE)?,
            reps: read_collection(dir, REPS_FILE)?,
            deals: read_collection(dir, DEALS_FILE)?,
            activities: read_collection(dir, ACTIVITIES_FILE)?,
            targets: read_collection(dir, TARGETS_FILE)?,
        };

        validate(&data)?;

        if data.is_empty() {
            warn!("Dataset has no deals; every view will be empty");
        }
        info!("Dataset loaded: {}", data.describe());

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_files(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    fn valid_files() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                ACCOUNTS_FILE,
                r#"[{"account_id":"A1","name":"Acme","segment":"Enterprise"},{"account_id":"A2"}]"#,
            ),
            (REPS_FILE, r#"[{"rep_id":"R1","name":"Dana Reyes"}]"#),
            (
                DEALS_FILE,
                r#"[
                    {"deal_id":"D1","account_id":"A1","rep_id":"R1","amount":12000,"stage":"Closed Won","created_at":"2025-10-01","closed_at":"2025-11-15T10:00:00Z"},
                    {"deal_id":"D2","account_id":"A2","rep_id":"R1","amount":null,"stage":"Prospecting","created_at":"2025-12-01","closed_at":null}
                ]"#,
            ),
            (
                ACTIVITIES_FILE,
                r#"[{"activity_id":"X1","deal_id":"D2","timestamp":"2026-01-30T09:00:00Z","type":"call"}]"#,
            ),
            (TARGETS_FILE, r#"[{"month":"2025-01","target":200000}]"#),
        ]
    }

    #[test]
    fn test_load_valid_dataset() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &valid_files());

        let data = Dataset::load(dir.path()).unwrap();
        assert_eq!(data.accounts.len(), 2);
        assert_eq!(data.accounts[1].segment, None);
        assert_eq!(data.deals.len(), 2);
        assert_eq!(data.deals[0].amount, Some(12_000.0));
        assert_eq!(data.deals[1].amount_or_zero(), 0.0);
        assert_eq!(data.targets[0].target, 200_000.0);
        assert_eq!(
            data.describe(),
            "2 accounts, 1 reps, 2 deals, 1 activities, 1 targets"
        );
    }

    #[test]
    fn test_missing_file_fails_whole_load() {
        let dir = TempDir::new().unwrap();
        let files: Vec<_> = valid_files()
            .into_iter()
            .filter(|(name, _)| *name != ACTIVITIES_FILE)
            .collect();
        write_files(dir.path(), &files);

        let err = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::MissingFile(ref p) if p.ends_with(ACTIVITIES_FILE)));
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = Dataset::load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DataError::MissingDir(_)));
    }

    #[test]
    fn test_malformed_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &valid_files());
        write_files(dir.path(), &[(REPS_FILE, "[{\"rep_id\": \"R1\"")]);

        let err = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
        assert!(err.to_string().contains(REPS_FILE));
    }

    #[test]
    fn test_unknown_stage_is_malformed() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &valid_files());
        write_files(
            dir.path(),
            &[(
                DEALS_FILE,
                r#"[{"deal_id":"D1","account_id":"A1","rep_id":"R1","stage":"Won","created_at":"2025-10-01"}]"#,
            )],
        );

        let err = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
    }

    #[test]
    fn test_bad_timestamp_is_invalid() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &valid_files());
        write_files(
            dir.path(),
            &[(
                ACTIVITIES_FILE,
                r#"[{"activity_id":"X1","deal_id":"D2","timestamp":"last tuesday"}]"#,
            )],
        );

        let err = Dataset::load(dir.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(ACTIVITIES_FILE));
        assert!(message.contains("last tuesday"));
    }

    #[test]
    fn test_bad_target_month_is_invalid() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &valid_files());
        write_files(
            dir.path(),
            &[(TARGETS_FILE, r#"[{"month":"January","target":1}]"#)],
        );

        let err = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            DataError::Invalid {
                file: TARGETS_FILE,
                ..
            }
        ));
    }
}
