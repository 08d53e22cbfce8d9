use crate::events::{DeploymentEvent, MintEvent};
use crate::metadata::{TokenMetadata, format_token_amount};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

const MINT_COLOR: u32 = 0x2ecc71;
const DEPLOYMENT_COLOR: u32 = 0x3498db;

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>) -> Self {
        EmbedField {
            name: name.to_string(),
            value: value.into(),
            inline: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    embeds: [&'a Embed; 1],
}

/// Heuristic label for the mint recipient, derived from code presence.
pub fn recipient_kind_label(has_code: bool) -> &'static str {
    if has_code {
        "Contract (Potentially Anonymous)"
    } else {
        "Wallet (Likely Non-Anonymous)"
    }
}

pub fn mint_embed(event: &MintEvent, metadata: &TokenMetadata, recipient_kind: &str) -> Embed {
    let amount = format_token_amount(event.amount, metadata.decimals.unwrap_or(18));
    Embed {
        title: "New Token Mint Detected".to_string(),
        color: MINT_COLOR,
        fields: vec![
            EmbedField::new("Token", format!("{} ({})", metadata.name, metadata.symbol)),
            EmbedField::new("Contract", format!("{:?}", event.contract)),
            EmbedField::new("Amount", format!("{} {}", amount, metadata.symbol)),
            EmbedField::new("Recipient", format!("{:?}", event.recipient)),
            EmbedField::new("Recipient Type", recipient_kind),
            EmbedField::new("24h Volume (USD)", metadata.volume_label()),
        ],
        thumbnail: metadata.icon.clone().map(|url| EmbedThumbnail { url }),
        timestamp: Utc::now().to_rfc3339(),
    }
}

pub fn deployment_embed(event: &DeploymentEvent, metadata: &TokenMetadata) -> Embed {
    Embed {
        title: "New ERC-20 Token Deployed".to_string(),
        color: DEPLOYMENT_COLOR,
        fields: vec![
            EmbedField::new("Token", format!("{} ({})", metadata.name, metadata.symbol)),
            EmbedField::new("Contract", format!("{:?}", event.contract)),
            EmbedField::new(
                "Decimals",
                metadata
                    .decimals
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            EmbedField::new(
                "Total Supply",
                metadata
                    .total_supply
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            EmbedField::new("Transaction", format!("{:?}", event.transaction_hash)),
            EmbedField::new("24h Volume (USD)", metadata.volume_label()),
        ],
        thumbnail: metadata.icon.clone().map(|url| EmbedThumbnail { url }),
        timestamp: Utc::now().to_rfc3339(),
    }
}

#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Notifier { http, webhook_url })
    }

    /// Best-effort delivery: a failed send is logged and the event is
    /// dropped, no retry and no queueing.
    pub async fn send(&self, embed: &Embed) {
        let payload = WebhookPayload { embeds: [embed] };
        let result = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => info!("Notification delivered: {}", embed.title),
            Err(e) => warn!("Webhook delivery failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};

    fn metadata() -> TokenMetadata {
        TokenMetadata {
            name: "Test Token".to_string(),
            symbol: "TST".to_string(),
            decimals: None,
            total_supply: None,
            icon: Some("https://img/x.png".to_string()),
            volume_usd: Some(1234.5),
        }
    }

    #[test]
    fn mint_embed_formats_amount_and_labels() {
        let event = MintEvent {
            contract: Address::repeat_byte(0x11),
            recipient: Address::repeat_byte(0x22),
            amount: U256::from(1_000_000_000_000_000_000u128),
        };
        let embed = mint_embed(&event, &metadata(), recipient_kind_label(false));

        assert_eq!(embed.title, "New Token Mint Detected");
        assert_eq!(embed.color, MINT_COLOR);
        assert_eq!(embed.fields[2].value, "1.0 TST");
        assert_eq!(embed.fields[4].value, "Wallet (Likely Non-Anonymous)");
        assert_eq!(embed.fields[5].value, "$1234.50");
        assert_eq!(embed.thumbnail.as_ref().unwrap().url, "https://img/x.png");
    }

    #[test]
    fn recipient_labels_map_code_presence() {
        assert_eq!(
            recipient_kind_label(true),
            "Contract (Potentially Anonymous)"
        );
        assert_eq!(
            recipient_kind_label(false),
            "Wallet (Likely Non-Anonymous)"
        );
    }

    #[test]
    fn deployment_embed_shows_sentinels_when_unresolved() {
        let event = DeploymentEvent {
            contract: Address::repeat_byte(0x33),
            transaction_hash: B256::repeat_byte(0x44),
        };
        let mut meta = TokenMetadata::unknown();
        meta.name = "Test Token".to_string();
        meta.symbol = "TST".to_string();

        let embed = deployment_embed(&event, &meta);
        assert_eq!(embed.color, DEPLOYMENT_COLOR);
        assert_eq!(embed.fields[2].value, "N/A");
        assert_eq!(embed.fields[3].value, "N/A");
        assert_eq!(embed.fields[5].value, "N/A");
        assert!(embed.thumbnail.is_none());
    }

    #[test]
    fn payload_wraps_embed_in_embeds_array() {
        let event = DeploymentEvent {
            contract: Address::repeat_byte(0x33),
            transaction_hash: B256::repeat_byte(0x44),
        };
        let embed = deployment_embed(&event, &metadata());
        let value = serde_json::to_value(WebhookPayload { embeds: [&embed] }).unwrap();

        let embeds = value.get("embeds").and_then(|e| e.as_array()).unwrap();
        assert_eq!(embeds.len(), 1);
        assert!(embeds[0].get("timestamp").is_some());
        assert!(embeds[0].get("thumbnail").is_some());
    }
}
