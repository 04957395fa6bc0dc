//! Subcommand handlers for Buddy.

use std::sync::Arc;

use anyhow::{Context, bail};
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::{debug, info};

use buddy_browser_cdp::{ATTACHED_TAB, CdpClient, CdpHost};
use buddy_config::{Config, ConfigLoader, ConfigValidator};
use buddy_protocols::{
    BrowserActionResponse, BusEnvelope, HostBus, Millis, OutboundMessage, TabController,
    now_millis,
};
use buddy_provider_anthropic::AnthropicProviderFactory;
use buddy_runtime::BackgroundService;
use buddy_storage::{FileStore, StorageManager};

use crate::cli::{BlacklistAction, ConfigAction};
use crate::prompter::TerminalPrompter;

pub(crate) async fn open_storage(config: &Config) -> anyhow::Result<Arc<StorageManager>> {
    let path = ConfigLoader::expand_path(&config.storage.path.to_string_lossy());
    let store = FileStore::new(&path)
        .await
        .with_context(|| format!("opening storage at {}", path))?
        .with_max_item_bytes(config.storage.max_item_bytes);
    let storage = StorageManager::open(Arc::new(store))
        .await?
        .with_max_messages_per_conversation(config.storage.max_messages_per_conversation);
    Ok(Arc::new(storage))
}

async fn connect_browser(config: &Config) -> anyhow::Result<Arc<CdpHost>> {
    let client = Arc::new(
        CdpClient::connect(&config.browser.cdp_endpoint)
            .await
            .context("connecting to Chrome")?,
    );
    let page = Arc::new(client.attach_first_page().await?);
    info!("Attached to page {}", page.target_id());

    let host = CdpHost::new(page, Arc::new(TerminalPrompter::stdin())).with_opener(client);
    Ok(Arc::new(host))
}

/// Wire the service to a live browser tab.
async fn start_service(config: Config) -> anyhow::Result<(BackgroundService, Arc<CdpHost>)> {
    let storage = open_storage(&config).await?;
    let host = connect_browser(&config).await?;
    let providers = Arc::new(AnthropicProviderFactory::new(
        config.anthropic.base_url.clone(),
        config.anthropic.api_version.clone(),
    ));
    let service = BackgroundService::new(config, storage, host.clone(), host.clone(), providers);

    let url = host.tab_info(ATTACHED_TAB).await?.url;
    let outcome = service.on_tab_complete(ATTACHED_TAB, &url).await?;
    if outcome.blacklisted {
        bail!("{} is blacklisted; remove it with `buddy blacklist remove`", url);
    }
    if let Some(state) = outcome.restored {
        eprintln!(
            "Request {} is still running in conversation {}",
            state.request_id, state.conversation_id
        );
    }

    spawn_event_printer(host.subscribe());
    Ok((service, host))
}

/// Echo tool activity on stderr while the model works.
fn spawn_event_printer(mut events: broadcast::Receiver<BusEnvelope>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) if envelope.message_type == "TOOL_CALL_UPDATE" => {
                    let call = &envelope.data["toolCall"];
                    eprintln!("  -> {} {}", call["name"].as_str().unwrap_or("?"), call["input"]);
                }
                Ok(envelope) => debug!("Host event {}", envelope.message_type),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Event printer skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

pub(crate) async fn chat(
    config: Config,
    message: String,
    conversation: Option<String>,
    debug: bool,
) -> anyhow::Result<()> {
    let (service, _host) = start_service(config).await?;

    let mut data = json!({ "message": message, "conversationId": conversation });
    if debug {
        data["showDebugMessages"] = json!(true);
    }
    let response = service
        .handle(&BusEnvelope::new("SEND_MESSAGE", data), Some(ATTACHED_TAB))
        .await;
    print_reply(&response)
}

pub(crate) async fn task(
    config: Config,
    task_id: String,
    content: Option<String>,
    conversation: Option<String>,
) -> anyhow::Result<()> {
    let (service, host) = start_service(config).await?;

    let content = match content {
        Some(content) => content,
        None => read_page_text(&host).await?,
    };
    let data = json!({
        "taskId": task_id,
        "content": content,
        "conversationId": conversation,
    });
    let response = service
        .handle(&BusEnvelope::new("EXECUTE_TASK", data), Some(ATTACHED_TAB))
        .await;
    print_reply(&response)
}

async fn read_page_text(host: &CdpHost) -> anyhow::Result<String> {
    let reply = host
        .send_to_tab(
            ATTACHED_TAB,
            OutboundMessage::ExecuteBrowserAction {
                action: "read_page_content".to_string(),
                params: json!({}),
            },
        )
        .await?;
    let response: BrowserActionResponse = serde_json::from_value(reply)?;
    match (response.success, response.result) {
        (true, Some(Value::String(text))) => Ok(text),
        _ => bail!(
            "could not read the page: {}",
            response.error.unwrap_or_else(|| "no text".to_string())
        ),
    }
}

fn print_reply(response: &Value) -> anyhow::Result<()> {
    if response["success"] == json!(true) {
        println!("{}", response["result"].as_str().unwrap_or_default());
        if let Some(id) = response["conversationId"].as_str() {
            eprintln!("\n(conversation {})", id);
        }
        Ok(())
    } else {
        bail!("{}", response["error"].as_str().unwrap_or("request failed"))
    }
}

pub(crate) async fn tasks(config: Config) -> anyhow::Result<()> {
    let storage = open_storage(&config).await?;
    let tasks = storage.get_tasks().await?;

    println!("{:<20} {:<28} {:<10} {}", "ID", "NAME", "INPUT", "BUILT-IN");
    println!("{}", "-".repeat(70));
    for task in tasks {
        let input = serde_json::to_value(task.input_type)?;
        println!(
            "{:<20} {:<28} {:<10} {}",
            task.id,
            task.name,
            input.as_str().unwrap_or("-"),
            if task.is_built_in { "yes" } else { "no" }
        );
    }
    Ok(())
}

pub(crate) async fn conversations(config: Config) -> anyhow::Result<()> {
    let storage = open_storage(&config).await?;
    let conversations = storage.get_conversations().await?;
    if conversations.is_empty() {
        println!("No conversations.");
        return Ok(());
    }

    let current = storage.get_current_conversation_id().await?;
    println!("{:<2} {:<38} {:<24} {:<9} {}", "", "ID", "TITLE", "MESSAGES", "UPDATED");
    println!("{}", "-".repeat(96));
    for conversation in conversations {
        let marker = if current.as_deref() == Some(conversation.id.as_str()) {
            "*"
        } else {
            ""
        };
        println!(
            "{:<2} {:<38} {:<24} {:<9} {}",
            marker,
            conversation.id,
            conversation.title,
            conversation.messages.len(),
            format_time(conversation.updated_at)
        );
    }
    Ok(())
}

pub(crate) async fn pending(config: Config) -> anyhow::Result<()> {
    let storage = open_storage(&config).await?;
    let Some(state) = storage.get_execution_state().await? else {
        println!("Nothing in flight.");
        return Ok(());
    };

    let stale_after_ms = (config.execution.stale_after_secs * 1000) as i64;
    let live = state.is_pending(now_millis(), stale_after_ms);
    println!("Request:      {}", state.request_id);
    println!("Conversation: {}", state.conversation_id);
    println!("Kind:         {:?}", state.kind);
    println!("Started:      {}", format_time(state.start_time));
    println!("Last active:  {}", format_time(state.last_activity));
    println!("Status:       {}", if live { "running" } else { "stale" });
    for call in &state.tool_calls {
        println!("  - {} {}", call.name, call.input);
    }
    Ok(())
}

pub(crate) async fn blacklist(config: Config, action: BlacklistAction) -> anyhow::Result<()> {
    let storage = open_storage(&config).await?;
    match action {
        BlacklistAction::List => {
            let domains = storage.get_blacklist().await?;
            if domains.is_empty() {
                println!("No blacklisted sites.");
            }
            for domain in domains {
                println!("{}", domain);
            }
        }
        BlacklistAction::Add { domain } => {
            storage.add_to_blacklist(domain.trim()).await?;
            println!("Added {}", domain.trim());
        }
        BlacklistAction::Remove { domain } => {
            storage.remove_from_blacklist(domain.trim()).await?;
            println!("Removed {}", domain.trim());
        }
    }
    Ok(())
}

pub(crate) fn config_command(config: &Config, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Check => {
            let result = ConfigValidator::validate(config);
            for warning in &result.warnings {
                println!("warning: {}: {}", warning.path, warning.message);
            }
            for error in &result.errors {
                println!("error: {}: {}", error.path, error.message);
            }
            if !result.is_valid() {
                bail!("configuration has {} error(s)", result.errors.len());
            }
            println!("Configuration OK");
            Ok(())
        }
    }
}

fn format_time(millis: Millis) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.storage.path = dir.path().join("storage");
        config
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "1970-01-01 00:00");
        assert_eq!(format_time(1_700_000_000_000), "2023-11-14 22:13");
    }

    #[test]
    fn test_print_reply_failure_is_error() {
        let err = print_reply(&json!({"success": false, "error": "Task not found"})).unwrap_err();
        assert_eq!(err.to_string(), "Task not found");
    }

    #[test]
    fn test_print_reply_success() {
        assert!(print_reply(&json!({"success": true, "result": "ok", "conversationId": "c"})).is_ok());
    }

    #[tokio::test]
    async fn test_blacklist_commands_persist() {
        let dir = tempfile::tempdir().unwrap();

        blacklist(config_in(&dir), BlacklistAction::Add { domain: " *.bank.com ".to_string() })
            .await
            .unwrap();

        let storage = open_storage(&config_in(&dir)).await.unwrap();
        assert_eq!(storage.get_blacklist().await.unwrap(), vec!["*.bank.com"]);

        blacklist(config_in(&dir), BlacklistAction::Remove { domain: "*.bank.com".to_string() })
            .await
            .unwrap();
        assert!(storage.get_blacklist().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_commands_on_empty_storage() {
        let dir = tempfile::tempdir().unwrap();
        tasks(config_in(&dir)).await.unwrap();
        conversations(config_in(&dir)).await.unwrap();
        pending(config_in(&dir)).await.unwrap();
    }

    #[test]
    fn test_config_check_rejects_invalid() {
        let mut config = Config::default();
        config.orchestrator.max_rounds = 0;
        assert!(config_command(&config, ConfigAction::Check).is_err());
        assert!(config_command(&Config::default(), ConfigAction::Check).is_ok());
    }
}
