use crate::error::Result;
use crate::models::message::{CreateMessage, Message, DIRECTION_INBOUND};
use crate::models::recruit::Recruit;
use crate::services::message_service::MessageService;
use crate::utils::phone;
use sqlx::PgPool;

/// Resolves inbound provider callbacks to an owned recruit and appends
/// them to the message log. Matching failures are silent: the provider
/// only ever sees an acknowledgement.
#[derive(Clone)]
pub struct InboundService {
    pool: PgPool,
    messages: MessageService,
}

impl InboundService {
    pub fn new(pool: PgPool, messages: MessageService) -> Self {
        Self { pool, messages }
    }

    /// Cascading match, first hit wins: exact stored value, then the
    /// common North-American storage variants, then a digits-only
    /// substring check that tolerates punctuation in stored phones.
    pub async fn handle_inbound(
        &self,
        from_raw: Option<&str>,
        to_raw: Option<&str>,
        body_raw: Option<&str>,
        provider_sid: Option<&str>,
    ) -> Result<Option<Message>> {
        let Some(from) = phone::normalize(from_raw) else {
            tracing::info!("inbound sms with unusable From number, dropping");
            return Ok(None);
        };
        let Some(to) = phone::normalize(to_raw) else {
            tracing::info!("inbound sms with unusable To number, dropping");
            return Ok(None);
        };
        let body = body_raw.map(str::trim).unwrap_or_default();
        if body.is_empty() {
            tracing::info!(from = %from, "inbound sms with empty body, dropping");
            return Ok(None);
        }

        let Some(last10) = phone::last_ten(&from) else {
            tracing::info!(from = %from, "inbound sms number too short to match, dropping");
            return Ok(None);
        };

        let Some(recruit) = self.match_recruit(&from, &last10).await? else {
            tracing::info!(from = %from, "no recruit matched inbound sms, dropping");
            return Ok(None);
        };

        let message = self
            .messages
            .create(CreateMessage {
                owner_id: recruit.owner_id,
                recruit_id: recruit.id,
                direction: DIRECTION_INBOUND.to_string(),
                body: body.to_string(),
                provider_sid: provider_sid.map(str::to_string),
                from_phone: from.clone(),
                to_phone: to,
                status: "received".to_string(),
            })
            .await?;

        tracing::info!(recruit_id = %recruit.id, from = %from, "inbound sms matched and logged");
        Ok(Some(message))
    }

    async fn match_recruit(&self, from: &str, last10: &str) -> Result<Option<Recruit>> {
        // Exact stored value.
        let exact = sqlx::query_as::<_, Recruit>(
            "SELECT * FROM recruits WHERE phone = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;
        if exact.is_some() {
            return Ok(exact);
        }

        // Stored as one of the clean variants of the caller's number.
        let variants = phone::variants(last10);
        let variant = sqlx::query_as::<_, Recruit>(
            "SELECT * FROM recruits WHERE phone = ANY($1) ORDER BY created_at LIMIT 1",
        )
        .bind(&variants[..])
        .fetch_optional(&self.pool)
        .await?;
        if variant.is_some() {
            return Ok(variant);
        }

        // Stored with formatting noise: strip to digits and look for
        // the caller's last ten as a substring.
        let fuzzy = sqlx::query_as::<_, Recruit>(
            r#"
            SELECT * FROM recruits
            WHERE phone IS NOT NULL
              AND regexp_replace(phone, '\D', '', 'g') LIKE '%' || $1 || '%'
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(last10)
        .fetch_optional(&self.pool)
        .await?;
        Ok(fuzzy)
    }
}
