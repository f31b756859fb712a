//! Versioned schema migrations for SQL backends

use crate::{StorageError, StorageResult};

/// One schema step
#[derive(Debug, Clone, Copy)]
pub struct SchemaVersion {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// Every schema step, oldest first; versions are contiguous from 1
pub const MIGRATIONS: &[SchemaVersion] = &[
    SchemaVersion {
        version: 1,
        description: "nodes and edges tables",
        sql: r#"
            CREATE TABLE IF NOT EXISTS nodes (
                node_id TEXT PRIMARY KEY,
                node_code TEXT NOT NULL UNIQUE,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS edges (
                edge_id TEXT PRIMARY KEY,
                from_node_id TEXT NOT NULL,
                to_node_id TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                data TEXT NOT NULL
            );
        "#,
    },
    SchemaVersion {
        version: 2,
        description: "edge endpoint and activity indexes",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_edges_from ON edges(from_node_id);
            CREATE INDEX IF NOT EXISTS idx_edges_to ON edges(to_node_id);
            CREATE INDEX IF NOT EXISTS idx_edges_active ON edges(is_active);
        "#,
    },
];

/// Latest schema version
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Backend that records its schema version and can apply a step
pub trait Migratable {
    fn get_schema_version(&self) -> StorageResult<u32>;

    fn set_schema_version(&self, version: u32) -> StorageResult<()>;

    fn apply(&self, migration: &SchemaVersion) -> StorageResult<()>;

    /// Apply every step above the stored version, recording each one
    fn migrate_to_latest(&self) -> StorageResult<()> {
        let current = self.get_schema_version()?;

        if current > CURRENT_VERSION {
            return Err(StorageError::Migration(format!(
                "schema version {} is newer than supported version {}",
                current, CURRENT_VERSION
            )));
        }
        if current == CURRENT_VERSION {
            tracing::debug!("Schema already at version {}", current);
            return Ok(());
        }

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            tracing::info!(
                "Applying schema v{}: {}",
                migration.version,
                migration.description
            );
            self.apply(migration)?;
            self.set_schema_version(migration.version)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recorder {
        version: RefCell<u32>,
        ran: RefCell<Vec<u32>>,
    }

    impl Recorder {
        fn at(version: u32) -> Self {
            Self {
                version: RefCell::new(version),
                ran: RefCell::new(Vec::new()),
            }
        }
    }

    impl Migratable for Recorder {
        fn get_schema_version(&self) -> StorageResult<u32> {
            Ok(*self.version.borrow())
        }

        fn set_schema_version(&self, version: u32) -> StorageResult<()> {
            *self.version.borrow_mut() = version;
            Ok(())
        }

        fn apply(&self, migration: &SchemaVersion) -> StorageResult<()> {
            self.ran.borrow_mut().push(migration.version);
            Ok(())
        }
    }

    #[test]
    fn test_versions_are_contiguous() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i as u32 + 1);
        }
    }

    #[test]
    fn test_migrate_runs_each_step_once() {
        let recorder = Recorder::at(0);

        recorder.migrate_to_latest().unwrap();
        recorder.migrate_to_latest().unwrap();

        assert_eq!(*recorder.ran.borrow(), vec![1, 2]);
        assert_eq!(recorder.get_schema_version().unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_resumes_from_stored_version() {
        let recorder = Recorder::at(1);
        recorder.migrate_to_latest().unwrap();
        assert_eq!(*recorder.ran.borrow(), vec![2]);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let recorder = Recorder::at(CURRENT_VERSION + 1);
        assert!(matches!(
            recorder.migrate_to_latest(),
            Err(StorageError::Migration(_))
        ));
    }
}
