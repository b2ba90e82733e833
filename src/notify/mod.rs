use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_sdk_sns::{config::Region, Client};
use axum::async_trait;
use time::OffsetDateTime;
use tracing::info;

/// Outbound verification notification. Fire-and-forget from the
/// caller's perspective: a failed publish never rolls back the
/// registration that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish_verification(
        &self,
        email: &str,
        token: &str,
        link: &str,
    ) -> anyhow::Result<()>;
}

pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub async fn new(region: &str, topic_arn: &str) -> Self {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        info!(topic_arn = %topic_arn, "sns notifier initialized");
        Self {
            client: Client::new(&shared),
            topic_arn: topic_arn.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish_verification(
        &self,
        email: &str,
        token: &str,
        link: &str,
    ) -> anyhow::Result<()> {
        let timestamp_ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let message = serde_json::json!({
            "email": email,
            "token": token,
            "verificationLink": link,
            "timestamp": timestamp_ms.to_string(),
        });

        let out = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject("Email Verification Required")
            .message(message.to_string())
            .send()
            .await
            .context("sns publish")?;

        info!(
            message_id = out.message_id().unwrap_or("unknown"),
            email = %email,
            "sns message published"
        );
        Ok(())
    }
}

/// Stands in when no topic is configured, so accounts stay creatable in
/// environments without AWS; registration logs the failure and moves on.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn publish_verification(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
        anyhow::bail!("notification publishing is not configured")
    }
}
