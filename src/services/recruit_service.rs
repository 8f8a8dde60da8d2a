use crate::error::{Error, Result};
use crate::models::recruit::Recruit;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct RecruitService {
    pool: PgPool,
}

impl RecruitService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        stage_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<Recruit> {
        let recruit = sqlx::query_as::<_, Recruit>(
            r#"
            INSERT INTO recruits (owner_id, first_name, last_name, phone, stage_id, notes, notes_updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 IS NULL THEN NULL ELSE NOW() END)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(stage_id)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(recruit)
    }

    /// Unscoped batch lookup for the delivery loop, which runs under
    /// the service credential.
    pub async fn get_many(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Recruit>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let recruits = sqlx::query_as::<_, Recruit>("SELECT * FROM recruits WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(recruits.into_iter().map(|r| (r.id, r)).collect())
    }

    /// Owner-scoped lookup for request handlers: rows the caller does
    /// not own are indistinguishable from absent ones.
    pub async fn get_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Recruit> {
        let recruit =
            sqlx::query_as::<_, Recruit>("SELECT * FROM recruits WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
        recruit.ok_or_else(|| Error::NotFound("Recruit not found".to_string()))
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Recruit>> {
        let recruits = sqlx::query_as::<_, Recruit>(
            "SELECT * FROM recruits WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(recruits)
    }

    pub async fn update_notes(&self, id: Uuid, owner_id: Uuid, notes: &str) -> Result<Recruit> {
        let recruit = sqlx::query_as::<_, Recruit>(
            r#"
            UPDATE recruits
            SET notes = $1, notes_updated_at = NOW()
            WHERE id = $2 AND owner_id = $3
            RETURNING *
            "#,
        )
        .bind(notes)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        recruit.ok_or_else(|| Error::NotFound("Recruit not found".to_string()))
    }

    /// Messages, follow-ups and read cursors go with the recruit via
    /// FK cascade. Admin callers may delete across owners.
    pub async fn delete(&self, id: Uuid, owner_id: Uuid, admin: bool) -> Result<()> {
        let result = if admin {
            sqlx::query("DELETE FROM recruits WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("DELETE FROM recruits WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .execute(&self.pool)
                .await?
        };
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Recruit not found".to_string()));
        }
        Ok(())
    }
}
