use anyhow::{bail, Context};
use axum::http::{header, HeaderMap, HeaderValue};
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{JwtSessionProvider, OrganizationId, SessionUser};
use crate::cli::OutputFormat;
use crate::config::{AppConfig, ProviderKind};
use crate::gate::{Gate, RequestContext};
use crate::server::AppState;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a session token (jwt provider only)")]
    Issue {
        #[arg(long, help = "Display name of the user")]
        name: String,
        #[arg(long, help = "User id (random when omitted)")]
        user_id: Option<String>,
        #[arg(long, help = "Email address")]
        email: Option<String>,
        #[arg(long, help = "Active organization id")]
        org: Option<String>,
    },

    #[command(about = "Run a token through the session and organization gates")]
    Inspect {
        #[arg(help = "Session token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue {
            name,
            user_id,
            email,
            org,
        } => issue(config, name, user_id, email, org, output_format),
        TokenCommands::Inspect { token } => inspect(config, &token, output_format).await,
    }
}

fn issue(
    config: &AppConfig,
    name: String,
    user_id: Option<String>,
    email: Option<String>,
    org: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if config.auth.provider != ProviderKind::Jwt {
        bail!("tokens can only be issued with AUTH_PROVIDER=jwt");
    }

    let issuer = JwtSessionProvider::from_config(&config.auth);
    let user = SessionUser {
        id: user_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        name,
        email,
    };
    let (token, session) = issuer.issue(&user, org.map(OrganizationId::from))?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "token": token, "session": session }))?),
        OutputFormat::Text => {
            println!("{}", token);
            eprintln!(
                "session {} for {} expires {}",
                session.session.id, session.user.id, session.session.expires_at
            );
        }
    }
    Ok(())
}

async fn inspect(config: &AppConfig, token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = AppState::from_config(config.clone())?;

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {}", token)).context("token is not a valid header value")?;
    headers.insert(header::AUTHORIZATION, value);

    let context = RequestContext::new(headers, state.provider.clone());
    let gate = context.require_active_organization_id().await?;
    let session = context.session().await?;

    let (outcome, detail) = match &gate {
        Gate::Continue(org) => ("continue", org.to_string()),
        Gate::Redirect(destination) => ("redirect", destination.path(&config.auth).to_string()),
    };

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "outcome": outcome,
                "detail": detail,
                "session": session,
            }))?
        ),
        OutputFormat::Text => {
            println!("{} {}", outcome, detail);
            if let Some(session) = session {
                println!("user {} ({})", session.user.id, session.user.name);
            }
        }
    }
    Ok(())
}
