use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// How outbound messages identify their sender: a messaging-service
/// routing id when configured, else a fixed from number.
#[derive(Debug, Clone)]
pub enum SenderIdentity {
    MessagingService(String),
    FromNumber(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendReceipt {
    pub sid: String,
    pub status: String,
}

/// Phone-number-addressed text delivery. Implemented against Twilio in
/// production; mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsChannel: Send + Sync {
    async fn create_message(
        &self,
        to: &str,
        sender: &SenderIdentity,
        body: &str,
    ) -> Result<SendReceipt>;
}

#[derive(Clone)]
pub struct TwilioChannel {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
}

impl TwilioChannel {
    pub fn new(account_sid: String, auth_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    message: Option<String>,
    code: Option<i64>,
}

#[async_trait]
impl SmsChannel for TwilioChannel {
    async fn create_message(
        &self,
        to: &str,
        sender: &SenderIdentity,
        body: &str,
    ) -> Result<SendReceipt> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );

        let mut params = vec![("To", to.to_string()), ("Body", body.to_string())];
        match sender {
            SenderIdentity::MessagingService(sid) => {
                params.push(("MessagingServiceSid", sid.clone()));
            }
            SenderIdentity::FromNumber(from) => {
                params.push(("From", from.clone()));
            }
        }

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("provider request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<TwilioErrorResponse>()
                .await
                .ok()
                .and_then(|e| {
                    e.message
                        .map(|m| format!("{} (code {})", m, e.code.unwrap_or_default()))
                })
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(Error::Channel(format!("provider rejected message: {}", detail)));
        }

        let parsed: TwilioMessageResponse = resp
            .json()
            .await
            .map_err(|e| Error::Channel(format!("malformed provider response: {}", e)))?;

        Ok(SendReceipt {
            sid: parsed.sid,
            status: parsed.status,
        })
    }
}
