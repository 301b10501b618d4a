//! HTTP SSO provider tool
//!
//! Loads the `httpsso_config` section of a homeserver configuration, prints
//! redirect URLs and dry-runs logins against a stand-in host that reports what
//! it would have done instead of touching any account.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use httpsso_provider::host::{
    MemoryAccountStore, ProviderRegistry, SsoCompletion, SsoLoginRequest, SsoRequest,
};
use httpsso_provider::{
    HttpSsoHandler, IdentityPayload, LoginContext, MxidLocalpartMapper, ProviderConfig,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "httpsso-provider")]
#[command(about = "Check and dry-run the HTTP SSO identity provider")]
struct Args {
    /// Path to the homeserver configuration (JSON)
    #[arg(long, default_value = "homeserver.json", env = "HTTPSSO_CONFIG")]
    config: PathBuf,

    /// Public base URL of the homeserver
    #[arg(long, env = "PUBLIC_BASEURL")]
    public_baseurl: String,

    /// Server name used to qualify local user ids
    #[arg(long, env = "SERVER_NAME")]
    server_name: String,

    /// Enable verbose logging
    #[arg(short, long, env = "HTTPSSO_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and show the resolved provider settings
    Check,

    /// Print the URL a client would be redirected to
    Redirect(FlowArgs),

    /// Decode a payload and show how the login would complete
    DryRun {
        /// Identity payload header value (JSON or base64-encoded JSON)
        #[arg(long)]
        payload: String,

        #[command(flatten)]
        flow: FlowArgs,

        /// JSON array of existing user ids to match against
        #[arg(long)]
        accounts: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct FlowArgs {
    /// UI-Auth session id (re-authentication)
    #[arg(long)]
    session: Option<String>,

    /// Client redirect URL (fresh login)
    #[arg(long)]
    redirect_url: Option<String>,
}

impl FlowArgs {
    fn login_context(&self) -> Result<LoginContext> {
        let context = LoginContext::from_parts(
            self.redirect_url.clone().map(String::into_bytes),
            self.session.clone(),
        )?;
        Ok(context)
    }
}

/// Stand-in completion mediator that prints what the host would receive.
struct DryRunCompletion;

#[async_trait]
impl SsoCompletion for DryRunCompletion {
    async fn complete_sso_login_request(&self, login: SsoLoginRequest<'_>) -> Result<()> {
        let report = match login.mapping.grandfather_existing_users().await? {
            Some(user_id) => json!({
                "outcome": "login",
                "idp_id": login.idp_id,
                "remote_user_id": login.remote_user_id,
                "user_id": user_id,
                "redirect_url": login.client_redirect_url,
            }),
            None if login.registration_enabled => {
                let attributes = login.mapping.map_user_attributes(0).await?;
                json!({
                    "outcome": "register",
                    "idp_id": login.idp_id,
                    "remote_user_id": login.remote_user_id,
                    "attributes": attributes,
                    "redirect_url": login.client_redirect_url,
                })
            }
            None => json!({
                "outcome": "registration_disabled",
                "idp_id": login.idp_id,
                "remote_user_id": login.remote_user_id,
            }),
        };

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    async fn complete_sso_ui_auth_request(
        &self,
        idp_id: &str,
        remote_user_id: &str,
        ui_auth_session_id: &str,
        _request: &SsoRequest,
    ) -> Result<()> {
        let report = json!({
            "outcome": "ui_auth",
            "idp_id": idp_id,
            "remote_user_id": remote_user_id,
            "session": ui_auth_session_id,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

fn load_accounts(path: &Path) -> Result<MemoryAccountStore> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read accounts file: {:?}", path))?;
    let user_ids: Vec<String> =
        serde_json::from_str(&contents).context("Accounts file must be a JSON array of user ids")?;
    Ok(MemoryAccountStore::from_user_ids(user_ids))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout only carries results
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = ProviderConfig::load(&args.config, &args.public_baseurl)?;

    let Some(settings) = config.settings() else {
        warn!(config = ?args.config, "HTTP SSO is disabled in this configuration");
        return Ok(());
    };

    info!(
        service_url = %settings.service_url,
        json_header = %settings.json_header,
        enable_registration = settings.enable_registration,
        idp_name = %settings.idp_name,
        required_attributes = settings.required_attributes.len(),
        "Configuration loaded"
    );

    let store = match &args.command {
        Command::DryRun {
            accounts: Some(path),
            ..
        } => load_accounts(path)?,
        _ => MemoryAccountStore::new(),
    };

    let handler = Arc::new(HttpSsoHandler::new(
        settings.clone(),
        args.server_name.as_str(),
        Arc::new(store),
        Arc::new(DryRunCompletion),
        Arc::new(MxidLocalpartMapper::new()),
    ));

    let registry = ProviderRegistry::new();
    handler.register(&registry)?;

    match &args.command {
        Command::Check => {
            println!("{}", serde_json::to_string_pretty(&registry.login_flows()?)?);
        }
        Command::Redirect(flow) => {
            println!("{}", handler.handle_redirect_request(&flow.login_context()?)?);
        }
        Command::DryRun { payload, flow, .. } => {
            let request = SsoRequest::new().with_header(settings.json_header.as_str(), payload.as_str());
            let payload = IdentityPayload::from_request(&request, &settings.json_header)?;
            handler
                .handle_payload(&request, &payload, &flow.login_context()?)
                .await?;
        }
    }

    Ok(())
}
