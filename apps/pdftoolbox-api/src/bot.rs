//! Optional Telegram bot front-end.
//!
//! Long-polls the Bot API and answers `/start` with a single static
//! message carrying a web-app button that deep-links into the web UI.
//! The user's Telegram identity is mirrored into the account store as
//! `tg_<id>` so the web app and the bot share one record. Fully decoupled
//! from the transform engine; any failure here is logged and never takes
//! the server down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::models::UserPatch;
use crate::store::AccountStore;

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct BotConfig {
    pub token: String,
    pub webapp_url: String,
}

/// Spawn the bot loop when `BOT_TOKEN` is configured; a missing token
/// just disables the front-end.
pub fn spawn_if_configured(store: Arc<AccountStore>, webapp_url: String) {
    match std::env::var("BOT_TOKEN") {
        Ok(token) if !token.is_empty() => {
            info!("starting Telegram bot");
            tokio::spawn(run(BotConfig { token, webapp_url }, store));
        }
        _ => info!("BOT_TOKEN not set, Telegram bot disabled"),
    }
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    text: Option<String>,
    chat: Chat,
    from: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Profile {
    id: i64,
    first_name: String,
    username: Option<String>,
}

async fn run(config: BotConfig, store: Arc<AccountStore>) {
    let client = reqwest::Client::new();
    let mut offset: i64 = 0;

    loop {
        match poll_updates(&client, &config.token, offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(message) = update.message else { continue };
                    let is_start = message
                        .text
                        .as_deref()
                        .is_some_and(|t| t.trim().starts_with("/start"));
                    if !is_start {
                        continue;
                    }
                    if let Err(e) = handle_start(&client, &config, &store, &message).await {
                        warn!("failed to handle /start: {e:#}");
                    }
                }
            }
            Err(e) => {
                warn!("getUpdates failed: {e:#}");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

async fn poll_updates(
    client: &reqwest::Client,
    token: &str,
    offset: i64,
) -> anyhow::Result<Vec<Update>> {
    let response: UpdatesResponse = client
        .get(format!("https://api.telegram.org/bot{token}/getUpdates"))
        .query(&[("timeout", POLL_TIMEOUT_SECS as i64), ("offset", offset)])
        .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
        .send()
        .await
        .context("getUpdates request failed")?
        .error_for_status()
        .context("getUpdates returned an error status")?
        .json()
        .await
        .context("getUpdates body did not parse")?;

    anyhow::ensure!(response.ok, "getUpdates responded with ok=false");
    Ok(response.result)
}

async fn handle_start(
    client: &reqwest::Client,
    config: &BotConfig,
    store: &AccountStore,
    message: &Message,
) -> anyhow::Result<()> {
    let Some(from) = &message.from else {
        return Ok(());
    };

    // Mirror the Telegram profile into the shared account record.
    let user_id = format!("tg_{}", from.id);
    let patch = UserPatch {
        name: Some(from.first_name.clone()),
        username: from.username.clone(),
        ..Default::default()
    };
    store.upsert(&user_id, &patch).await?;
    info!("bot greeted {user_id}");

    let body = json!({
        "chat_id": message.chat.id,
        "text": format!("Hi {}! Open PDF Toolbox:", from.first_name),
        "reply_markup": {
            "inline_keyboard": [[{
                "text": "Open PDF Toolbox",
                "web_app": { "url": config.webapp_url }
            }]]
        }
    });

    client
        .post(format!(
            "https://api.telegram.org/bot{}/sendMessage",
            config.token
        ))
        .json(&body)
        .send()
        .await
        .context("sendMessage request failed")?
        .error_for_status()
        .context("sendMessage returned an error status")?;

    Ok(())
}
