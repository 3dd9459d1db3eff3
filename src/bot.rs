use crate::errors::{BotError, ConfigError, Result};
use crate::registry::ConfigRegistry;
use gpubot_api::AutodlClient;
use gpubot_core::Credentials;
use gpubot_utils::hash_password;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

const HELP_TEXT: &str = "Supported commands:
/user <username> - set the AutoDL username (phone number)
/password <secret> - set the AutoDL password
/gpuvalid - show idle/total GPUs for every instance
/poweron <uuid> - power an instance on
/poweroff <uuid> - power an instance off
/delayoff <uuid> <minutes> - power an instance off later
/balance - show the account balance";

const UNKNOWN_COMMAND: &str = "Unknown command, send /help for the supported ones";

/// Chat-command dispatcher.
///
/// Transport-agnostic: a chat front end hands each inbound message to
/// [`Bot::handle_message`] and delivers the returned reply. One client is
/// built lazily per user and cached until that user's credentials change.
pub struct Bot {
    registry: ConfigRegistry,
    clients: RwLock<HashMap<i64, Arc<AutodlClient>>>,
    base_url: Option<String>,
}

impl Bot {
    pub fn new(registry: ConfigRegistry) -> Self {
        Self {
            registry,
            clients: RwLock::new(HashMap::new()),
            base_url: None,
        }
    }

    /// Point every client this bot builds at a custom service URL.
    pub fn with_base_url(registry: ConfigRegistry, base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::new(registry)
        }
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    /// Handle one inbound chat message and produce the reply text.
    ///
    /// Errors never escape: whatever goes wrong becomes the reply, with the
    /// service's own message passed through verbatim.
    pub async fn handle_message(&self, user_id: i64, text: &str) -> String {
        let text = text.trim();
        let (command, args) = match text.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (text, ""),
        };
        debug!("User {} sent command {}", user_id, command);

        match self.dispatch(user_id, command, args).await {
            Ok(reply) => reply,
            Err(e) => e.to_string(),
        }
    }

    async fn dispatch(&self, user_id: i64, command: &str, args: &str) -> Result<String> {
        match command {
            "/start" | "/help" => Ok(HELP_TEXT.to_string()),
            "/user" => self.set_username(user_id, args),
            "/password" => self.set_password(user_id, args),
            "/gpuvalid" => self.gpu_status(user_id).await,
            "/poweron" => self.power_on(user_id, args).await,
            "/poweroff" => self.power_off(user_id, args).await,
            "/delayoff" => self.delayed_power_off(user_id, args).await,
            "/balance" => self.balance(user_id).await,
            _ => Ok(UNKNOWN_COMMAND.to_string()),
        }
    }

    fn set_username(&self, user_id: i64, args: &str) -> Result<String> {
        if args.is_empty() {
            return Ok("Usage: /user <username>, e.g. /user 18900000000".to_string());
        }

        let mut credentials = self.registry.get_or_create(user_id);
        credentials.username = args.to_string();
        self.registry.set(user_id, credentials);
        self.drop_client(user_id);
        self.registry.save_all()?;
        Ok("Username set".to_string())
    }

    fn set_password(&self, user_id: i64, args: &str) -> Result<String> {
        if args.is_empty() {
            return Ok("Usage: /password <secret>".to_string());
        }

        // Only the digest is ever stored or transmitted.
        let mut credentials = self.registry.get_or_create(user_id);
        credentials.password = hash_password(args);
        self.registry.set(user_id, credentials);
        self.drop_client(user_id);
        self.registry.save_all()?;
        Ok("Password set".to_string())
    }

    async fn gpu_status(&self, user_id: i64) -> Result<String> {
        let client = self.client_for(user_id)?;
        let report = client.get_gpu_status().await?;
        if report.is_empty() {
            Ok("No instances found".to_string())
        } else {
            Ok(report)
        }
    }

    async fn power_on(&self, user_id: i64, args: &str) -> Result<String> {
        if args.is_empty() {
            return Ok("Usage: /poweron <instance uuid>".to_string());
        }

        let client = self.client_for(user_id)?;
        self.ensure_token(&client).await?;
        client.power_on(args).await?;
        Ok(format!("Instance {} powered on", args))
    }

    async fn power_off(&self, user_id: i64, args: &str) -> Result<String> {
        if args.is_empty() {
            return Ok("Usage: /poweroff <instance uuid>".to_string());
        }

        let client = self.client_for(user_id)?;
        self.ensure_token(&client).await?;
        client.power_off(args).await?;
        Ok(format!("Instance {} powered off", args))
    }

    /// Schedule a power-off after a delay.
    ///
    /// The task is detached and has no cancellation: it will attempt the
    /// power-off regardless of later state changes, and a failure is only
    /// logged, never delivered to the user.
    async fn delayed_power_off(&self, user_id: i64, args: &str) -> Result<String> {
        let mut parts = args.split_whitespace();
        let (Some(uuid), Some(minutes)) = (parts.next(), parts.next()) else {
            return Ok("Usage: /delayoff <instance uuid> <minutes>".to_string());
        };
        let minutes: u64 = minutes
            .parse()
            .map_err(|_| BotError::InvalidInput(format!("not a number of minutes: {}", minutes)))?;

        let client = self.client_for(user_id)?;
        self.ensure_token(&client).await?;

        let uuid = uuid.to_string();
        let reply = format!("Instance {} will be powered off in {} minutes", uuid, minutes);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(minutes.saturating_mul(60))).await;
            if let Err(e) = client.power_off(&uuid).await {
                warn!("Delayed power off of instance {} failed: {}", uuid, e);
            }
        });

        Ok(reply)
    }

    async fn balance(&self, user_id: i64) -> Result<String> {
        let client = self.client_for(user_id)?;
        self.ensure_token(&client).await?;
        let balance = client.get_balance().await?;
        Ok(format!("Balance: {:.2}", balance))
    }

    /// Get or lazily build the user's client.
    fn client_for(&self, user_id: i64) -> Result<Arc<AutodlClient>> {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&user_id) {
            return Ok(Arc::clone(client));
        }

        let credentials = self.registry.get_or_create(user_id);
        if !credentials.is_complete() {
            return Err(ConfigError::MissingCredentials.into());
        }

        debug!("Building client for user {}", user_id);
        let client = Arc::new(self.build_client(credentials));
        clients.insert(user_id, Arc::clone(&client));
        Ok(client)
    }

    fn build_client(&self, credentials: Credentials) -> AutodlClient {
        match &self.base_url {
            Some(url) => AutodlClient::with_base_url(credentials, url.clone()),
            None => AutodlClient::new(credentials),
        }
    }

    /// Discard a cached client so the next command rebuilds it with fresh
    /// credentials.
    fn drop_client(&self, user_id: i64) {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id);
    }

    /// Log in when no token is held yet. Power and balance calls do not
    /// retry on rejection, so the caller establishes the session up front.
    async fn ensure_token(&self, client: &AutodlClient) -> Result<()> {
        if client.token().is_empty() {
            client.login().await?;
        }
        Ok(())
    }
}
