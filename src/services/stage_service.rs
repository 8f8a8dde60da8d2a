use crate::error::{Error, Result};
use crate::models::sequence::{StageSequence, KIND_ABSOLUTE, KIND_RELATIVE};
use crate::models::stage::{Stage, INTAKE_STAGE_NAME};
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct StageService {
    pool: PgPool,
}

impl StageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists the owner's pipeline, seeding the locked Intake stage the
    /// first time an owner shows up.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Stage>> {
        self.ensure_intake(owner_id).await?;
        let stages = sqlx::query_as::<_, Stage>(
            "SELECT * FROM stages WHERE owner_id = $1 ORDER BY position, created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stages)
    }

    async fn ensure_intake(&self, owner_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stages (owner_id, name, position, is_locked)
            SELECT $1, $2, 0, TRUE
            WHERE NOT EXISTS (SELECT 1 FROM stages WHERE owner_id = $1 AND is_locked)
            "#,
        )
        .bind(owner_id)
        .bind(INTAKE_STAGE_NAME)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Stage>> {
        let stage = sqlx::query_as::<_, Stage>("SELECT * FROM stages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stage)
    }

    pub async fn get_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Stage> {
        let stage =
            sqlx::query_as::<_, Stage>("SELECT * FROM stages WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
        stage.ok_or_else(|| Error::NotFound("Stage not found".to_string()))
    }

    pub async fn create(&self, owner_id: Uuid, name: &str, position: Option<i32>) -> Result<Stage> {
        let stage = sqlx::query_as::<_, Stage>(
            r#"
            INSERT INTO stages (owner_id, name, position)
            VALUES ($1, $2, COALESCE($3, (SELECT COALESCE(MAX(position), 0) + 1 FROM stages WHERE owner_id = $1)))
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;
        Ok(stage)
    }

    pub async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        name: Option<&str>,
        position: Option<i32>,
    ) -> Result<Stage> {
        let existing = self.get_owned(id, owner_id).await?;
        if existing.is_locked && name.is_some() {
            return Err(Error::BadRequest(
                "The Intake stage cannot be renamed".to_string(),
            ));
        }
        let stage = sqlx::query_as::<_, Stage>(
            r#"
            UPDATE stages
            SET name = COALESCE($1, name), position = COALESCE($2, position)
            WHERE id = $3 AND owner_id = $4
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(position)
        .bind(id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stage)
    }

    /// Recruits in a deleted stage fall back to no stage via FK
    /// `ON DELETE SET NULL`; sequences cascade away.
    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let existing = self.get_owned(id, owner_id).await?;
        if existing.is_locked {
            return Err(Error::BadRequest(
                "The Intake stage cannot be deleted".to_string(),
            ));
        }
        sqlx::query("DELETE FROM stages WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Sequence rules for one stage in creation order, which fixes the
    /// delivery order among rules scheduled for the same instant.
    pub async fn list_sequences(&self, stage_id: Uuid, owner_id: Uuid) -> Result<Vec<StageSequence>> {
        let rules = sqlx::query_as::<_, StageSequence>(
            "SELECT * FROM stage_sequences WHERE stage_id = $1 AND owner_id = $2 ORDER BY created_at",
        )
        .bind(stage_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rules)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_sequence(
        &self,
        owner_id: Uuid,
        stage_id: Uuid,
        template_id: Uuid,
        kind: &str,
        offset_minutes: Option<i32>,
        send_date: Option<NaiveDate>,
        send_time: Option<NaiveTime>,
        timezone: Option<&str>,
    ) -> Result<StageSequence> {
        match kind {
            KIND_RELATIVE => {
                if offset_minutes.is_none() {
                    return Err(Error::BadRequest(
                        "Relative rules require offset_minutes".to_string(),
                    ));
                }
                if send_date.is_some() || send_time.is_some() || timezone.is_some() {
                    return Err(Error::BadRequest(
                        "Relative rules must not carry a date, time or timezone".to_string(),
                    ));
                }
            }
            KIND_ABSOLUTE => {
                if send_date.is_none() || send_time.is_none() || timezone.is_none() {
                    return Err(Error::BadRequest(
                        "Absolute rules require send_date, send_time and timezone".to_string(),
                    ));
                }
                if offset_minutes.is_some() {
                    return Err(Error::BadRequest(
                        "Absolute rules must not carry offset_minutes".to_string(),
                    ));
                }
                let tz = timezone.unwrap_or_default();
                if tz.parse::<chrono_tz::Tz>().is_err() {
                    return Err(Error::BadRequest(format!("Unknown timezone: {}", tz)));
                }
            }
            other => {
                return Err(Error::BadRequest(format!("Unknown rule kind: {}", other)));
            }
        }

        let rule = sqlx::query_as::<_, StageSequence>(
            r#"
            INSERT INTO stage_sequences
                (owner_id, stage_id, template_id, kind, offset_minutes, send_date, send_time, timezone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(stage_id)
        .bind(template_id)
        .bind(kind)
        .bind(offset_minutes)
        .bind(send_date)
        .bind(send_time)
        .bind(timezone)
        .fetch_one(&self.pool)
        .await?;
        Ok(rule)
    }

    pub async fn delete_sequence(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM stage_sequences WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Sequence rule not found".to_string()));
        }
        Ok(())
    }
}
