use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

use crate::report::builder::CardMessage;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("push API token is not configured")]
    MissingCredential,
    #[error("push API rejected the message ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("push API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Delivers a rendered card. One attempt, no retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &CardMessage) -> Result<(), NotifyError>;
}

/// Posts cards as JSON to the push-messaging HTTP API with a bearer token.
pub struct PushNotifier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl PushNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
        })
    }
}

#[async_trait]
impl Notifier for PushNotifier {
    async fn send(&self, message: &CardMessage) -> Result<(), NotifyError> {
        let token = self.token.as_deref().ok_or(NotifyError::MissingCredential)?;

        debug!(endpoint = %self.endpoint, group_id = %message.group_id, "Posting report card");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        info!(group_id = %message.group_id, %status, "Report card delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::daily_tally::DailyTally;
    use crate::report::builder::build_card;
    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use chrono::NaiveDate;

    fn card() -> CardMessage {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        build_card(date, &DailyTally::default(), "grp-1")
    }

    async fn push_endpoint(req: HttpRequest, body: web::Json<serde_json::Value>) -> HttpResponse {
        let authorized = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            == Some("Bearer good-token");
        if !authorized {
            return HttpResponse::Unauthorized().body("bad token");
        }
        if body.0["group_id"] != "grp-1" {
            return HttpResponse::BadRequest().body("unknown group");
        }
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_missing_token_sends_nothing() {
        // Unroutable endpoint: the call must fail before any request is made
        let notifier =
            PushNotifier::new("http://127.0.0.1:9/push", None, Duration::from_secs(1)).unwrap();
        let err = notifier.send(&card()).await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingCredential));
    }

    #[actix_web::test]
    async fn test_closed_port_is_transport_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let notifier = PushNotifier::new(
            format!("http://127.0.0.1:{port}/push"),
            Some("tok".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = notifier.send(&card()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)), "{err}");
    }

    #[actix_web::test]
    async fn test_delivery_and_rejection() {
        let server = HttpServer::new(|| App::new().route("/push", web::post().to(push_endpoint)))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let endpoint = format!("http://{addr}/push");

        let good = PushNotifier::new(
            endpoint.clone(),
            Some("good-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        good.send(&card()).await.unwrap();

        let bad = PushNotifier::new(endpoint, Some("stale".to_string()), Duration::from_secs(5))
            .unwrap();
        match bad.send(&card()).await {
            Err(NotifyError::Rejected { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "bad token");
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        handle.stop(true).await;
    }
}
