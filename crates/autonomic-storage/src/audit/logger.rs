use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use autonomic_core::errors::AutonomicResult;
use autonomic_core::PatternId;

use crate::to_storage_err;

/// Kind of write recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    Created,
    Reinforced,
    Accepted,
    Rejected,
    Superseded,
    Proposed,
}

impl AuditOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditOperation::Created => "created",
            AuditOperation::Reinforced => "reinforced",
            AuditOperation::Accepted => "accepted",
            AuditOperation::Rejected => "rejected",
            AuditOperation::Superseded => "superseded",
            AuditOperation::Proposed => "proposed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(AuditOperation::Created),
            "reinforced" => Some(AuditOperation::Reinforced),
            "accepted" => Some(AuditOperation::Accepted),
            "rejected" => Some(AuditOperation::Rejected),
            "superseded" => Some(AuditOperation::Superseded),
            "proposed" => Some(AuditOperation::Proposed),
            _ => None,
        }
    }
}

/// One row of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub pattern_id: PatternId,
    pub operation: AuditOperation,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Writes audit rows on the caller's connection, so they commit or roll back
/// with the record change they describe.
pub struct AuditLogger;

impl AuditLogger {
    pub fn log(
        conn: &Connection,
        pattern_id: &PatternId,
        operation: AuditOperation,
        details: serde_json::Value,
    ) -> AutonomicResult<()> {
        conn.execute(
            "INSERT INTO pattern_audit_log (pattern_id, operation, details, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                pattern_id.as_str(),
                operation.as_str(),
                details.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(())
    }

    /// Audit rows for one pattern, oldest first.
    pub fn trail(conn: &Connection, pattern_id: &PatternId) -> AutonomicResult<Vec<AuditEntry>> {
        let mut stmt = conn
            .prepare(
                "SELECT operation, details, timestamp FROM pattern_audit_log
                 WHERE pattern_id = ?1 ORDER BY id ASC",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(params![pattern_id.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| to_storage_err(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (op, details, ts) = row.map_err(|e| to_storage_err(e.to_string()))?;
            let operation = AuditOperation::parse(&op)
                .ok_or_else(|| to_storage_err(format!("unknown audit operation '{op}'")))?;
            let details = serde_json::from_str(&details).unwrap_or(serde_json::Value::Null);
            let timestamp = DateTime::parse_from_rfc3339(&ts)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| to_storage_err(format!("bad audit timestamp: {e}")))?;
            entries.push(AuditEntry {
                pattern_id: pattern_id.clone(),
                operation,
                details,
                timestamp,
            });
        }
        Ok(entries)
    }
}
