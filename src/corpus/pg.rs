//! Postgres + pgvector corpus backend

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;
use tracing::debug;
use tracing::info;

use super::check_dimension;
use super::CorpusStore;
use crate::errors::Result;
use crate::models::CaseRecord;
use crate::models::CorpusFilter;
use crate::models::VectorMatch;

/// Corpus store backed by a `counseling_cases` table with a pgvector column
///
/// Similarity metric is cosine (`<=>`), fixed for the corpus lifetime;
/// re-embedding with a different metric invalidates stored vectors.
#[derive(Debug, Clone)]
pub struct PgCorpusStore {
    pool: PgPool,
    dimension: usize,
}

impl PgCorpusStore {
    #[must_use]
    pub const fn new(pool: PgPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    /// Create a new store from configuration
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections())
            .min_connections(config.min_connections())
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout()));

        let pool = pool_options.connect(config.database_url()).await?;

        info!(
            "Corpus pool configured: max_connections={}, min_connections={}",
            config.max_connections(),
            config.min_connections()
        );

        Ok(Self::new(pool, config.embedding_dimension()))
    }

    /// Create the pgvector extension, the cases table, and its index
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        let create_table = format!(
            r"
            CREATE TABLE IF NOT EXISTS counseling_cases (
                id TEXT PRIMARY KEY,
                input TEXT NOT NULL,
                output TEXT NOT NULL,
                embedding vector({}) NOT NULL,
                keywords TEXT[] NOT NULL DEFAULT '{{}}',
                emotions TEXT[] NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
            self.dimension
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS counseling_cases_embedding_idx
            ON counseling_cases USING ivfflat (embedding vector_cosine_ops)
            WITH (lists = 100)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS counseling_cases_emotions_idx ON counseling_cases USING gin (emotions)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS counseling_cases_keywords_idx ON counseling_cases USING gin (keywords)",
        )
        .execute(&self.pool)
        .await?;

        info!("Corpus schema initialized (dimension {})", self.dimension);
        Ok(())
    }

    /// Get a reference to the underlying pool for raw queries
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CorpusStore for PgCorpusStore {
    async fn upsert(&self, records: &[CaseRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        for record in records {
            check_dimension(self.dimension, &record.embedding, &record.id)?;
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(
                r"
                INSERT INTO counseling_cases (id, input, output, embedding, keywords, emotions)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id)
                DO UPDATE SET
                    input = EXCLUDED.input,
                    output = EXCLUDED.output,
                    embedding = EXCLUDED.embedding,
                    keywords = EXCLUDED.keywords,
                    emotions = EXCLUDED.emotions
                ",
            )
            .bind(&record.id)
            .bind(&record.input)
            .bind(&record.output)
            .bind(Vector::from(record.embedding.clone()))
            .bind(&record.keywords)
            .bind(&record.emotions)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Upserted {} case records", records.len());
        Ok(())
    }

    async fn vector_query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&CorpusFilter>,
    ) -> Result<Vec<VectorMatch>> {
        check_dimension(self.dimension, embedding, "query")?;
        if k == 0 {
            return Ok(Vec::new());
        }

        #[derive(sqlx::FromRow)]
        struct RawResult {
            id: String,
            input: String,
            output: String,
            embedding: Vector,
            keywords: Vec<String>,
            emotions: Vec<String>,
            similarity: f64,
        }

        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx = 3;

        let emotion_filter = filter.and_then(|f| f.emotions.as_ref());
        let keyword_filter = filter.and_then(|f| f.keywords.as_ref());

        if emotion_filter.is_some() {
            conditions.push(format!("emotions && ${param_idx}"));
            param_idx += 1;
        }
        if keyword_filter.is_some() {
            conditions.push(format!("keywords && ${param_idx}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r"
            SELECT
                id,
                input,
                output,
                embedding,
                keywords,
                emotions,
                1 - (embedding <=> $1::vector) as similarity
            FROM counseling_cases
            {where_clause}
            ORDER BY embedding <=> $1::vector
            LIMIT $2
            "
        );

        let mut query = sqlx::query_as::<_, RawResult>(&sql)
            .bind(Vector::from(embedding.to_vec()))
            .bind(k as i64);
        if let Some(emotions) = emotion_filter {
            query = query.bind(emotions);
        }
        if let Some(keywords) = keyword_filter {
            query = query.bind(keywords);
        }

        let raw_results = query.fetch_all(&self.pool).await?;

        let matches = raw_results
            .into_iter()
            .map(|r| VectorMatch {
                id: r.id.clone(),
                score: r.similarity as f32,
                record: CaseRecord {
                    id: r.id,
                    input: r.input,
                    output: r.output,
                    embedding: r.embedding.to_vec(),
                    keywords: r.keywords,
                    emotions: r.emotions,
                },
            })
            .collect();

        Ok(matches)
    }

    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM counseling_cases")
            .execute(&self.pool)
            .await?;
        info!("Corpus reset: all case records deleted");
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM counseling_cases")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
