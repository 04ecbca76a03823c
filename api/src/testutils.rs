use crate::db::{Connection, Database, DbError};
use crate::envelope::Payload;
use async_trait::async_trait;
use projects::{Project, ProjectRegistry};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// kubernetes/Kubernetes -> db1, legacy (disabled) -> db2
pub fn test_registry() -> ProjectRegistry {
    ProjectRegistry::build(vec![
        Project::new("kubernetes", "Kubernetes", "db1"),
        Project::new("legacy", "Legacy", "db2").disabled(),
    ])
}

pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be an object, got {other}"),
    }
}

/// In-memory stand-in for the relational store. Keeps track of how many
/// connections were opened and how many are still open.
#[derive(Default)]
pub struct FakeDatabase {
    rows: HashMap<String, Vec<i64>>,
    fail_connect: bool,
    fail_query: bool,
    fail_scan: bool,
    open: Arc<AtomicUsize>,
    total: AtomicUsize,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(self, database: &str, events: i64) -> Self {
        self.with_rows(database, vec![events])
    }

    pub fn with_rows(mut self, database: &str, rows: Vec<i64>) -> Self {
        self.rows.insert(database.to_string(), rows);
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    pub fn failing_scan(mut self) -> Self {
        self.fail_scan = true;
        self
    }

    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn total_connections(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn connect(&self, database: &str) -> Result<Box<dyn Connection>, DbError> {
        let rows = match self.rows.get(database) {
            Some(rows) if !self.fail_connect => rows.clone(),
            _ => {
                return Err(DbError::Connect {
                    database: database.to_string(),
                    message: format!("database \"{database}\" does not exist"),
                });
            }
        };

        self.total.fetch_add(1, Ordering::SeqCst);
        self.open.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FakeConnection {
            rows,
            fail_query: self.fail_query,
            fail_scan: self.fail_scan,
            open: self.open.clone(),
        }))
    }
}

struct FakeConnection {
    rows: Vec<i64>,
    fail_query: bool,
    fail_scan: bool,
    open: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn query_i64(&mut self, sql: &str) -> Result<Vec<i64>, DbError> {
        if self.fail_query {
            return Err(DbError::Query(format!("syntax error in \"{sql}\"")));
        }
        if self.fail_scan {
            return Err(DbError::Scan("invalid column type".into()));
        }
        Ok(self.rows.clone())
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
