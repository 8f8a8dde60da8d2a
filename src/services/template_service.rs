use crate::error::{Error, Result};
use crate::models::template::MessageTemplate;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct TemplateService {
    pool: PgPool,
}

impl TemplateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unscoped batch lookup for the delivery loop, which runs under
    /// the service credential.
    pub async fn get_many(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, MessageTemplate>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let templates = sqlx::query_as::<_, MessageTemplate>(
            "SELECT * FROM message_templates WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(templates.into_iter().map(|t| (t.id, t)).collect())
    }

    pub async fn get_owned(&self, id: Uuid, owner_id: Uuid) -> Result<MessageTemplate> {
        let template = sqlx::query_as::<_, MessageTemplate>(
            "SELECT * FROM message_templates WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        template.ok_or_else(|| Error::NotFound("Template not found".to_string()))
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<MessageTemplate>> {
        let templates = sqlx::query_as::<_, MessageTemplate>(
            "SELECT * FROM message_templates WHERE owner_id = $1 ORDER BY position, created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        body: &str,
        position: Option<i32>,
    ) -> Result<MessageTemplate> {
        let template = sqlx::query_as::<_, MessageTemplate>(
            r#"
            INSERT INTO message_templates (owner_id, title, body, position)
            VALUES ($1, $2, $3, COALESCE($4, (SELECT COALESCE(MAX(position), 0) + 1 FROM message_templates WHERE owner_id = $1)))
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(body)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;
        Ok(template)
    }

    pub async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
        position: Option<i32>,
    ) -> Result<MessageTemplate> {
        let template = sqlx::query_as::<_, MessageTemplate>(
            r#"
            UPDATE message_templates
            SET title = COALESCE($1, title),
                body = COALESCE($2, body),
                position = COALESCE($3, position)
            WHERE id = $4 AND owner_id = $5
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(position)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        template.ok_or_else(|| Error::NotFound("Template not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM message_templates WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Template not found".to_string()));
        }
        Ok(())
    }
}
