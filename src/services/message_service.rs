use crate::error::Result;
use crate::models::message::{CreateMessage, Message, ThreadUnread};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, msg: CreateMessage) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (owner_id, recruit_id, direction, body, provider_sid, from_phone, to_phone, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(msg.owner_id)
        .bind(msg.recruit_id)
        .bind(&msg.direction)
        .bind(&msg.body)
        .bind(&msg.provider_sid)
        .bind(&msg.from_phone)
        .bind(&msg.to_phone)
        .bind(&msg.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn get_thread(&self, recruit_id: Uuid, owner_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE recruit_id = $1 AND owner_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(recruit_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Advances the owner's read cursor for a thread. Message rows stay
    /// immutable; unread state is derived from this cursor.
    pub async fn mark_thread_read(&self, recruit_id: Uuid, owner_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO inbox_reads (owner_id, recruit_id, last_read_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (owner_id, recruit_id) DO UPDATE SET last_read_at = NOW()
            "#,
        )
        .bind(owner_id)
        .bind(recruit_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn unread_by_thread(&self, owner_id: Uuid) -> Result<Vec<ThreadUnread>> {
        let rows = sqlx::query_as::<_, ThreadUnread>(
            r#"
            SELECT m.recruit_id, COUNT(*) AS unread_count
            FROM messages m
            LEFT JOIN inbox_reads r
                ON r.owner_id = m.owner_id AND r.recruit_id = m.recruit_id
            WHERE m.owner_id = $1
              AND m.direction = 'inbound'
              AND (r.last_read_at IS NULL OR m.created_at > r.last_read_at)
            GROUP BY m.recruit_id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
