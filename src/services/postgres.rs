use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use thiserror::Error;

use crate::core::error::{DataAccessError, PersistenceError};
use crate::core::orchestrator::{CandidateScope, DataLoader, ResultSink};
use crate::models::{MatchingOutcome, MatchingResult, RawExternalProfile, RawRequester, RawUser};

/// Errors raised while setting up the PostgreSQL connection
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

const USER_COLUMNS: &str = r#"
    id, grade, location, company, expertise_areas, skills, languages,
    industries, availability, meeting_formats, communication_styles
"#;

/// PostgreSQL adapter serving as both data loader and result sink
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check database connectivity
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }
}

/// JSONB column, NULL read as `Value::Null`
fn json(row: &PgRow, column: &str) -> Result<Value, sqlx::Error> {
    Ok(row.try_get::<Option<Value>, _>(column)?.unwrap_or(Value::Null))
}

/// JSONB column holding a list of records
fn json_list(row: &PgRow, column: &str) -> Result<Vec<Value>, sqlx::Error> {
    Ok(match json(row, column)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}

fn raw_user(row: &PgRow) -> Result<RawUser, sqlx::Error> {
    Ok(RawUser {
        id: row.try_get("id")?,
        grade: json(row, "grade")?,
        location: json(row, "location")?,
        company: json(row, "company")?,
        expertise_areas: json(row, "expertise_areas")?,
        skills: json(row, "skills")?,
        languages: json(row, "languages")?,
        industries: json(row, "industries")?,
        availability: json(row, "availability")?,
        meeting_formats: json(row, "meeting_formats")?,
        communication_styles: json(row, "communication_styles")?,
    })
}

impl DataLoader for PostgresClient {
    async fn get_all_candidates(
        &self,
        scope: &CandidateScope,
    ) -> Result<Vec<RawUser>, DataAccessError> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id <> $1 AND is_active
            ORDER BY id
            LIMIT $2
            "#
        );

        let rows = sqlx::query(&query)
            .bind(&scope.requester_id)
            .bind(scope.limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let users = rows.iter().map(raw_user).collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            requester_id = %scope.requester_id,
            candidates = users.len(),
            "Loaded candidate pool"
        );
        Ok(users)
    }

    async fn get_requester(
        &self,
        requester_id: &str,
        intent_id: &str,
    ) -> Result<RawRequester, DataAccessError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user_row = sqlx::query(&query)
            .bind(requester_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DataAccessError::RequesterNotFound(requester_id.to_string()))?;

        let intent_row = sqlx::query(
            r#"
            SELECT id, intent_type, content
            FROM intents
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(intent_id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DataAccessError::IntentNotFound {
            requester_id: requester_id.to_string(),
            intent_id: intent_id.to_string(),
        })?;

        let content = match json(&intent_row, "content")? {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(DataAccessError::Malformed(format!(
                    "intent {} content is not an object: {}",
                    intent_id, other
                )))
            }
        };

        Ok(RawRequester {
            user: raw_user(&user_row)?,
            intent_id: intent_row.try_get("id")?,
            intent_type: json(&intent_row, "intent_type")?,
            content,
        })
    }

    async fn get_external_profiles(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, RawExternalProfile>, DataAccessError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT user_id, follower_count, headline, summary, skills, location,
                   work_history, education
            FROM external_profiles
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut profiles = HashMap::with_capacity(rows.len());
        for row in &rows {
            let user_id: String = row.try_get("user_id")?;
            let profile = RawExternalProfile {
                follower_count: json(row, "follower_count")?,
                headline: json(row, "headline")?,
                summary: json(row, "summary")?,
                skills: json(row, "skills")?,
                location: json(row, "location")?,
                work_history: json_list(row, "work_history")?,
                education: json_list(row, "education")?,
            };
            profiles.insert(user_id, profile);
        }

        tracing::debug!(
            requested = user_ids.len(),
            found = profiles.len(),
            "Loaded external profiles"
        );
        Ok(profiles)
    }
}

impl ResultSink for PostgresClient {
    async fn save(&self, result: &MatchingResult) -> Result<(), PersistenceError> {
        let (status, candidate_ids, error_code, error_details) = match &result.outcome {
            MatchingOutcome::Ranked { candidate_ids } => {
                ("ranked", serde_json::to_value(candidate_ids)?, None, None)
            }
            MatchingOutcome::Failed { code, details } => {
                ("failed", Value::Array(Vec::new()), Some(code.as_str()), Some(details.as_str()))
            }
        };

        sqlx::query(
            r#"
            INSERT INTO matching_results
                (id, requester_id, intent_id, preset, status, candidate_ids,
                 error_code, error_details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(result.id)
        .bind(&result.requester_id)
        .bind(&result.intent_id)
        .bind(&result.preset)
        .bind(status)
        .bind(candidate_ids)
        .bind(error_code)
        .bind(error_details)
        .bind(result.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            result_id = %result.id,
            requester_id = %result.requester_id,
            status,
            "Persisted matching result"
        );
        Ok(())
    }
}
