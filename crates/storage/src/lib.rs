use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use madadgar_core::{CaseRecord, Language, Service, Tier, Urgency};
use parking_lot::RwLock;
use sqlx::{Row, SqlitePool};

pub trait CaseRepository: Send + Sync {
    async fn record_case(&self, case: &CaseRecord) -> Result<()>;
    async fn recent_cases(&self, limit: usize) -> Result<Vec<CaseRecord>>;
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    cases: Arc<RwLock<Vec<CaseRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseRepository for MemoryStore {
    async fn record_case(&self, case: &CaseRecord) -> Result<()> {
        self.cases.write().push(case.clone());
        Ok(())
    }

    async fn recent_cases(&self, limit: usize) -> Result<Vec<CaseRecord>> {
        let cases = self.cases.read();
        Ok(cases.iter().rev().take(limit).cloned().collect())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0_u64;
        self.cases.write().retain(|case| {
            let keep = case.created_at >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cases (
              case_id TEXT PRIMARY KEY,
              created_at TEXT NOT NULL,
              text TEXT NOT NULL,
              language TEXT NOT NULL,
              service TEXT NOT NULL,
              subservice TEXT NOT NULL,
              urgency INTEGER NOT NULL,
              facility_name TEXT,
              facility_tier TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl CaseRepository for SqliteStore {
    async fn record_case(&self, case: &CaseRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cases
              (case_id, created_at, text, language, service, subservice, urgency, facility_name, facility_tier)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(case_id) DO NOTHING
            "#,
        )
        .bind(&case.case_id)
        .bind(case.created_at.to_rfc3339())
        .bind(&case.text)
        .bind(case.language.as_code())
        .bind(case.service.as_code())
        .bind(&case.subservice)
        .bind(i64::from(case.urgency.level()))
        .bind(&case.facility_name)
        .bind(case.facility_tier.map(Tier::as_code))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_cases(&self, limit: usize) -> Result<Vec<CaseRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT case_id, created_at, text, language, service, subservice, urgency, facility_name, facility_tier
            FROM cases
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let cases = rows.into_iter().map(|row| row_to_case(&row)).collect();
        Ok(cases)
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cases WHERE created_at < ?1")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn row_to_case(row: &sqlx::sqlite::SqliteRow) -> CaseRecord {
    let language = match row.get::<String, _>("language").as_str() {
        "urdu" => Language::Urdu,
        "roman_urdu" => Language::RomanUrdu,
        "mixed" => Language::Mixed,
        _ => Language::English,
    };
    let service =
        Service::parse(&row.get::<String, _>("service")).unwrap_or(Service::General);
    let urgency =
        Urgency::from_level(row.get::<i64, _>("urgency") as u8).unwrap_or(Urgency::Routine);
    let facility_tier = match row.get::<Option<String>, _>("facility_tier").as_deref() {
        Some("live") => Some(Tier::Live),
        Some("local") => Some(Tier::Local),
        Some("static") => Some(Tier::Static),
        _ => None,
    };

    CaseRecord {
        case_id: row.get("case_id"),
        created_at: row
            .get::<String, _>("created_at")
            .parse()
            .unwrap_or_else(|_| Utc::now()),
        text: row.get("text"),
        language,
        service,
        subservice: row.get("subservice"),
        urgency,
        facility_name: row.get("facility_name"),
        facility_tier,
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }
}

impl CaseRepository for Store {
    async fn record_case(&self, case: &CaseRecord) -> Result<()> {
        match self {
            Store::Memory(store) => store.record_case(case).await,
            Store::Sqlite(store) => store.record_case(case).await,
        }
    }

    async fn recent_cases(&self, limit: usize) -> Result<Vec<CaseRecord>> {
        match self {
            Store::Memory(store) => store.recent_cases(limit).await,
            Store::Sqlite(store) => store.recent_cases(limit).await,
        }
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        match self {
            Store::Memory(store) => store.purge_older_than(cutoff).await,
            Store::Sqlite(store) => store.purge_older_than(cutoff).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn case(case_id: &str, created_at: DateTime<Utc>) -> CaseRecord {
        CaseRecord {
            case_id: case_id.to_string(),
            created_at,
            text: "ambulance chahiye".to_string(),
            language: Language::RomanUrdu,
            service: Service::Medical,
            subservice: "ambulance".to_string(),
            urgency: Urgency::Critical,
            facility_name: Some("Karachi General Hospital".to_string()),
            facility_tier: Some(Tier::Static),
        }
    }

    #[tokio::test]
    async fn memory_store_records_and_lists() {
        let store = MemoryStore::new();
        store.record_case(&case("a", Utc::now())).await.unwrap();
        store.record_case(&case("b", Utc::now())).await.unwrap();

        let recent = store.recent_cases(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].case_id, "b");
    }

    #[tokio::test]
    async fn purge_removes_only_stale_cases() {
        let store = MemoryStore::new();
        store
            .record_case(&case("old", Utc::now() - Duration::days(60)))
            .await
            .unwrap();
        store.record_case(&case("fresh", Utc::now())).await.unwrap();

        let removed = store
            .purge_older_than(Utc::now() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.recent_cases(10).await.unwrap().len(), 1);
    }
}
