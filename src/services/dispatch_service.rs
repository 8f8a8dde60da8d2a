use crate::error::{Error, Result};
use crate::services::sms_channel::{SendReceipt, SenderIdentity, SmsChannel};
use crate::utils::{phone, template};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

const PREVIEW_LEN: usize = 48;

/// Wraps the outbound channel behind the safety gates: no empty or
/// unaddressable sends, and never a body with a visible `{{...}}`
/// placeholder.
#[derive(Clone)]
pub struct DispatchService {
    channel: Arc<dyn SmsChannel>,
    sender: SenderIdentity,
}

impl DispatchService {
    pub fn new(channel: Arc<dyn SmsChannel>, sender: SenderIdentity) -> Self {
        Self { channel, sender }
    }

    /// Picks the sender identity from config: messaging-service routing
    /// id when present, else the fixed from number.
    pub fn resolve_sender(
        messaging_service_sid: Option<&str>,
        from_number: Option<&str>,
    ) -> Result<SenderIdentity> {
        if let Some(sid) = messaging_service_sid {
            return Ok(SenderIdentity::MessagingService(sid.to_string()));
        }
        if let Some(from) = from_number {
            return Ok(SenderIdentity::FromNumber(from.to_string()));
        }
        Err(Error::Config(
            "No TWILIO_MESSAGING_SERVICE_SID or TWILIO_FROM_NUMBER configured".to_string(),
        ))
    }

    /// The number outbound messages are logged as coming from. Empty
    /// when routing through a messaging service, which picks per-send.
    pub fn from_phone(&self) -> String {
        match &self.sender {
            SenderIdentity::MessagingService(_) => String::new(),
            SenderIdentity::FromNumber(from) => from.clone(),
        }
    }

    pub async fn send(&self, to: &str, body: &str, recruit_id: Uuid) -> Result<SendReceipt> {
        if body.trim().is_empty() {
            return Err(Error::BadRequest("Message body is empty".to_string()));
        }
        let to = phone::normalize(Some(to))
            .ok_or_else(|| Error::BadRequest("Recipient phone is missing or invalid".to_string()))?;

        if template::has_unresolved(body) {
            tracing::error!(%recruit_id, "refusing to send body with unresolved placeholder");
            return Err(Error::TemplateLeak);
        }

        let hash = body_hash(body);
        let preview: String = body.chars().take(PREVIEW_LEN).collect();
        tracing::info!(%recruit_id, to = %to, body_hash = %hash, preview = %preview, "dispatching sms");

        let receipt = self.channel.create_message(&to, &self.sender, body).await?;

        tracing::info!(%recruit_id, sid = %receipt.sid, status = %receipt.status, body_hash = %hash, "sms accepted by provider");
        Ok(receipt)
    }
}

/// Short content hash for log correlation without logging full bodies.
fn body_hash(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sms_channel::MockSmsChannel;

    fn service(mock: MockSmsChannel) -> DispatchService {
        DispatchService::new(
            Arc::new(mock),
            SenderIdentity::FromNumber("+15550001111".to_string()),
        )
    }

    #[tokio::test]
    async fn rejects_unresolved_placeholder_without_channel_call() {
        let mut mock = MockSmsChannel::new();
        mock.expect_create_message().times(0);
        let svc = service(mock);

        let err = svc
            .send("+15871234567", "Hi {{first_name}}", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TemplateLeak));

        // A stray closing brace is just as disqualifying.
        let mut mock = MockSmsChannel::new();
        mock.expect_create_message().times(0);
        let svc = service(mock);
        let err = svc
            .send("+15871234567", "weird}} text", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TemplateLeak));
    }

    #[tokio::test]
    async fn rejects_empty_body_and_bad_recipient() {
        let mut mock = MockSmsChannel::new();
        mock.expect_create_message().times(0);
        let svc = service(mock);
        assert!(matches!(
            svc.send("+15871234567", "   ", Uuid::new_v4()).await,
            Err(Error::BadRequest(_))
        ));

        let mut mock = MockSmsChannel::new();
        mock.expect_create_message().times(0);
        let svc = service(mock);
        assert!(matches!(
            svc.send("", "hello", Uuid::new_v4()).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn normalizes_recipient_and_sends_once() {
        let mut mock = MockSmsChannel::new();
        mock.expect_create_message()
            .times(1)
            .withf(|to, _, body| to == "+15871234567" && body == "Hello Ana")
            .returning(|_, _, _| {
                Ok(SendReceipt {
                    sid: "SM123".to_string(),
                    status: "queued".to_string(),
                })
            });
        let svc = service(mock);

        let receipt = svc
            .send("(587) 123-4567", "Hello Ana", Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(receipt.sid, "SM123");
    }

    #[test]
    fn sender_resolution_prefers_messaging_service() {
        let sender = DispatchService::resolve_sender(Some("MG1"), Some("+15550001111")).unwrap();
        assert!(matches!(sender, SenderIdentity::MessagingService(s) if s == "MG1"));

        let sender = DispatchService::resolve_sender(None, Some("+15550001111")).unwrap();
        assert!(matches!(sender, SenderIdentity::FromNumber(_)));

        assert!(matches!(
            DispatchService::resolve_sender(None, None),
            Err(Error::Config(_))
        ));
    }
}
