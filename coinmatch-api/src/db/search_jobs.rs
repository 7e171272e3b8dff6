//! Search job queries (side-effect log of search invocations)

use coinmatch_common::db::models::SearchJob;
use coinmatch_common::Result;
use sqlx::SqliteConnection;

/// Insert a search job row
pub async fn insert_job(conn: &mut SqliteConnection, job: &SearchJob) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO search_jobs (
            id, job_type, museum_coin_id, query_text, obverse_key, reverse_key,
            status, created_by, created_at, completed_at, result_summary
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&job.id)
    .bind(&job.job_type)
    .bind(&job.museum_coin_id)
    .bind(&job.query_text)
    .bind(&job.obverse_key)
    .bind(&job.reverse_key)
    .bind(&job.status)
    .bind(job.created_by)
    .bind(&job.created_at)
    .bind(&job.completed_at)
    .bind(&job.result_summary)
    .execute(conn)
    .await?;
    Ok(())
}

/// Load a search job by id
pub async fn get_job(conn: &mut SqliteConnection, job_id: &str) -> Result<Option<SearchJob>> {
    let job = sqlx::query_as::<_, SearchJob>("SELECT * FROM search_jobs WHERE id = ?")
        .bind(job_id)
        .fetch_optional(conn)
        .await?;
    Ok(job)
}
