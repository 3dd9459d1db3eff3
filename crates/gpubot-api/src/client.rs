use crate::errors::{ApiError, Result};
use crate::token::TokenHolder;
use chrono::Utc;
use gpubot_core::{
    Credentials, Instance, InstanceRequest, InstanceResponse, LoginRequest, LoginResponse,
    PassportRequest, PassportResponse, PowerRequest, PowerResponse, WalletResponse,
    CODE_AUTHORIZE_FAILED, CODE_SUCCESS,
};
use gpubot_utils::render_status_report;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

const BASE_URL: &str = "https://www.autodl.com/api/v1";
const LOGIN_PATH: &str = "/new_login";
const PASSPORT_PATH: &str = "/passport";
const INSTANCE_PATH: &str = "/instance";
const POWER_ON_PATH: &str = "/instance/power_on";
const POWER_OFF_PATH: &str = "/instance/power_off";
const WALLET_PATH: &str = "/wallet";

/// Client identification string the service expects on every request.
const APP_VERSION: &str = "v5.56.0";

/// Session-aware HTTP client for one AutoDL account.
///
/// Holds the account's credentials (password already in digest form) and a
/// single mutable bearer token. The token's validity is unknown until used;
/// [`AutodlClient::get_instances`] authenticates lazily and retries once
/// when the service rejects the token.
#[derive(Debug)]
pub struct AutodlClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    token: TokenHolder,
}

/// States of the list-instances call. Carrying the retry flag in the state
/// makes "at most one retry" structural rather than a property of nested
/// branches.
enum ListState {
    EnsureToken,
    Fetch { retried: bool },
}

impl AutodlClient {
    /// Create a client for one account against the production service.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, BASE_URL)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        debug!("Creating AutodlClient for user {}", credentials.username);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
            token: TokenHolder::new(),
        }
    }

    /// Current bearer token, empty when unauthenticated.
    pub fn token(&self) -> String {
        self.token.get()
    }

    /// Replace the held bearer token.
    pub fn set_token(&self, token: impl Into<String>) {
        self.token.set(token.into());
    }

    /// POST a JSON body and decode a JSON response, with the fixed headers
    /// the service expects on every call.
    async fn post<B, R>(&self, path: &str, token: Option<&str>, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!("HTTP POST request to: {}", url);

        let mut request = self
            .http
            .post(&url)
            .header("accept", "*/*")
            .header("accept-language", "zh-CN,zh;q=0.9")
            .header("appversion", APP_VERSION)
            .header("content-type", "application/json;charset=UTF-8")
            .json(body);
        if let Some(token) = token {
            request = request.header("authorization", token);
        }

        let response = request.send().await.map_err(|e| {
            error!("POST {} failed: {:?}", path, e);
            ApiError::Request(e)
        })?;
        debug!("Response status: {}", response.status());

        Ok(response.json::<R>().await?)
    }

    /// Two-step login: exchange credentials for a ticket, then the ticket
    /// for a bearer token.
    ///
    /// On success the held token is replaced atomically. On failure at
    /// either step the holder is left untouched, so a stale token survives a
    /// failed re-login. Never retries; retrying is the caller's decision.
    pub async fn login(&self) -> Result<()> {
        let login_request = LoginRequest::new(&self.credentials.username, &self.credentials.password);
        let login_response: LoginResponse = self.post(LOGIN_PATH, None, &login_request).await?;
        if login_response.code != CODE_SUCCESS {
            error!(
                "Login failed for user {}: {}",
                self.credentials.username, login_response.msg
            );
            return Err(ApiError::rejected(login_response.code, login_response.msg));
        }

        let passport_request = PassportRequest {
            ticket: login_response.data.ticket,
        };
        let passport_response: PassportResponse =
            self.post(PASSPORT_PATH, None, &passport_request).await?;
        if passport_response.code != CODE_SUCCESS {
            error!(
                "Token exchange failed for user {}: {}",
                self.credentials.username, passport_response.msg
            );
            return Err(ApiError::rejected(
                passport_response.code,
                passport_response.msg,
            ));
        }

        self.token.set(passport_response.data.token);
        info!("User {} logged in", self.credentials.username);
        Ok(())
    }

    /// Fetch the account's instance list (first page of ten, no filters).
    ///
    /// Authenticates first when no token is held. When the service answers
    /// with the authorization-failure sentinel, re-authenticates once and
    /// retries the request exactly once; a rejection of the retried request
    /// is surfaced as-is.
    pub async fn get_instances(&self) -> Result<Vec<Instance>> {
        let request = InstanceRequest::first_page();
        let mut state = ListState::EnsureToken;

        loop {
            state = match state {
                ListState::EnsureToken => {
                    if self.token.is_empty() {
                        info!(
                            "User {} has no token, logging in",
                            self.credentials.username
                        );
                        self.login().await?;
                    }
                    ListState::Fetch { retried: false }
                }
                ListState::Fetch { retried } => {
                    let token = self.token.get();
                    let response: InstanceResponse = self
                        .post(INSTANCE_PATH, Some(token.as_str()), &request)
                        .await?;

                    if response.code == CODE_AUTHORIZE_FAILED && !retried {
                        info!(
                            "Token for user {} rejected, logging in again",
                            self.credentials.username
                        );
                        self.login().await?;
                        ListState::Fetch { retried: true }
                    } else if response.code != CODE_SUCCESS {
                        error!(
                            "Instance query failed for user {}: {}",
                            self.credentials.username, response.msg
                        );
                        return Err(ApiError::rejected(response.code, response.msg));
                    } else {
                        debug!(
                            "Fetched {} instances for user {}",
                            response.data.list.len(),
                            self.credentials.username
                        );
                        return Ok(response.data.list);
                    }
                }
            };
        }
    }

    /// Render the human-readable GPU status report for every instance.
    pub async fn get_gpu_status(&self) -> Result<String> {
        let instances = self.get_instances().await?;
        Ok(render_status_report(&instances, Utc::now()))
    }

    /// Power an instance on. The caller must already hold a token.
    pub async fn power_on(&self, instance_uuid: &str) -> Result<()> {
        self.power(POWER_ON_PATH, instance_uuid).await?;
        info!(
            "User {} powered on instance {}",
            self.credentials.username, instance_uuid
        );
        Ok(())
    }

    /// Power an instance off. The caller must already hold a token.
    pub async fn power_off(&self, instance_uuid: &str) -> Result<()> {
        self.power(POWER_OFF_PATH, instance_uuid).await?;
        info!(
            "User {} powered off instance {}",
            self.credentials.username, instance_uuid
        );
        Ok(())
    }

    async fn power(&self, path: &str, instance_uuid: &str) -> Result<()> {
        if instance_uuid.is_empty() {
            return Err(ApiError::InvalidInput(
                "instance uuid must not be empty".to_string(),
            ));
        }

        let request = PowerRequest {
            instance_uuid: instance_uuid.to_string(),
        };
        let token = self.token.get();
        let response: PowerResponse = self.post(path, Some(token.as_str()), &request).await?;
        if response.code != CODE_SUCCESS {
            return Err(ApiError::rejected(response.code, response.msg));
        }
        Ok(())
    }

    /// Fetch the account balance. The caller must already hold a token.
    pub async fn get_balance(&self) -> Result<f64> {
        let token = self.token.get();
        let response: WalletResponse = self
            .post(WALLET_PATH, Some(token.as_str()), &serde_json::json!({}))
            .await?;
        if response.code != CODE_SUCCESS {
            return Err(ApiError::rejected(response.code, response.msg));
        }
        Ok(response.data.assets)
    }
}
