use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::application::{AppError, AppResult, DispatchReceipt, Notifier};
use crate::domain::{StockAlert, User};

/// Account credentials and endpoint of the SMS gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub from: String,
    pub user: String,
    pub pass: String,
    pub url: String,
}

/// Sends alerts as SMS through a Twilio-style messages endpoint.
pub struct TwilioNotifier {
    client: reqwest::Client,
    credentials: TwilioCredentials,
}

impl TwilioNotifier {
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageResp {
    sid: Option<String>,
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn notify(&self, user: &User, alert: &StockAlert) -> AppResult<DispatchReceipt> {
        let body = alert.message_body();
        let form = [
            ("To", user.phone_number.as_str()),
            ("From", self.credentials.from.as_str()),
            ("Body", body.as_str()),
        ];

        let resp = self
            .client
            .post(&self.credentials.url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.pass))
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Notifier(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::GatewayStatus(status.as_u16()));
        }
        tracing::debug!(status = %status, "gateway accepted message");

        // the sid is informational; an undecodable body is still a success
        let message_id = resp.json::<MessageResp>().await.ok().and_then(|m| m.sid);
        Ok(DispatchReceipt { message_id })
    }
}
