/*
 * Responsibility
 * - scratch テーブル (alive_scratch) 向け SQLx 操作
 * - PgPool を受け取り drop/create/insert/fetch を提供
 * - DB エラーは RepoError に変換しやすい形で返す
 *
 * The table is throwaway by design: every database probe drops and
 * recreates it, so nothing here migrates or versions anything.
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct ScratchRow {
    pub id: i64,
    pub random_value: String,
}

const DROP_TABLE: &str = r#"DROP TABLE IF EXISTS alive_scratch"#;

const CREATE_TABLE: &str = r#"
    CREATE TABLE alive_scratch (
        id BIGSERIAL PRIMARY KEY,
        random_value TEXT NOT NULL
    )
"#;

/// Drop the scratch table if present, then create it fresh.
pub async fn recreate(db: &PgPool) -> Result<(), RepoError> {
    sqlx::query(DROP_TABLE).execute(db).await?;
    sqlx::query(CREATE_TABLE).execute(db).await?;

    Ok(())
}

pub async fn insert(db: &PgPool, random_value: &str) -> Result<Option<i64>, RepoError> {
    let row = sqlx::query_as::<_, ScratchRow>(
        r#"
        INSERT INTO alive_scratch (random_value)
        VALUES ($1)
        RETURNING id, random_value
        "#,
    )
    .bind(random_value)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|r| r.id))
}

pub async fn fetch(db: &PgPool, id: i64) -> Result<Option<String>, RepoError> {
    let row = sqlx::query_as::<_, ScratchRow>(
        r#"
        SELECT id, random_value
        FROM alive_scratch
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|r| r.random_value))
}

pub async fn drop_table(db: &PgPool) -> Result<(), RepoError> {
    sqlx::query(DROP_TABLE).execute(db).await?;

    Ok(())
}
