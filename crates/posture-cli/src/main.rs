mod app;
mod commands;
mod event;
mod form;
mod sync;
mod theme;
mod ui;

use std::io;
use std::sync::Arc;

use app::{App, Screen};
use clap::{Parser, Subcommand};
use posture_client::PostureClient;
use posture_core::{M365Credentials, PostureApi};
use posture_shared::{telemetry::init_telemetry, AppConfig};
use ratatui::DefaultTerminal;
use tracing::info;

#[derive(Parser)]
#[command(name = "posture")]
#[command(about = "Terminal dashboard for Microsoft 365 tenant security posture")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides api.base_url)
    #[arg(long, env = "POSTURE_BASE_URL")]
    base_url: Option<String>,

    /// Dashboard user for per-user score endpoints (overrides api.user_id)
    #[arg(long, env = "POSTURE_USER")]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (Terminal User Interface) - Default
    Monitor,
    /// List tenants
    Tenants,
    /// Print the secure score, history and category scores of a tenant
    Scores {
        #[arg(long)]
        tenant: String,
    },
    /// Print the audit log
    Audit,
    /// Create a tenant, optionally connecting Microsoft 365 right away
    CreateTenant {
        #[arg(long)]
        name: String,
        #[arg(long)]
        domain: String,
        #[arg(long, requires = "client_secret")]
        client_id: Option<String>,
        #[arg(long, env = "POSTURE_CLIENT_SECRET", hide_env_values = true, requires = "client_id")]
        client_secret: Option<String>,
    },
    /// Connect an existing tenant to Microsoft 365
    Connect {
        #[arg(long)]
        tenant: String,
        #[arg(long)]
        client_id: String,
        #[arg(long, env = "POSTURE_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,
    },
    /// Enable or disable one guarantee of a tenant
    Guarantee {
        #[arg(long)]
        tenant: String,
        #[arg(long)]
        key: String,
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    color_eyre::install().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if cli.user.is_some() {
        config.api.user_id = cli.user;
    }

    let _guard = init_telemetry(&config.log)?;
    info!(env = %config.app.env, base_url = %config.api.base_url, "starting {}", config.app.name);

    let client: Arc<dyn PostureApi> = Arc::new(PostureClient::new(&config.api)?);
    let user_id = config.api.user_id.clone();
    let mut out = io::stdout();

    match cli.command.unwrap_or(Commands::Monitor) {
        Commands::Monitor => start_tui(client, user_id).await?,
        Commands::Tenants => commands::list_tenants(client.as_ref(), &mut out).await?,
        Commands::Scores { tenant } => {
            commands::show_scores(client.as_ref(), &tenant, user_id.as_deref(), &mut out).await?
        }
        Commands::Audit => commands::show_audit(client.as_ref(), &mut out).await?,
        Commands::CreateTenant { name, domain, client_id, client_secret } => {
            let credentials = client_id
                .zip(client_secret)
                .map(|(client_id, client_secret)| M365Credentials { client_id, client_secret });
            commands::create_tenant(client.as_ref(), &name, &domain, credentials, &mut out).await?
        }
        Commands::Connect { tenant, client_id, client_secret } => {
            let credentials = M365Credentials { client_id, client_secret };
            commands::connect(client.as_ref(), &tenant, &credentials, &mut out).await?
        }
        Commands::Guarantee { tenant, key, enabled } => {
            commands::set_guarantee(client.as_ref(), &tenant, &key, enabled, &mut out).await?
        }
    }

    Ok(())
}

async fn start_tui(client: Arc<dyn PostureApi>, user_id: Option<String>) -> anyhow::Result<()> {
    // Initialize terminal (ratatui::init handles raw mode + alternate screen)
    let terminal = ratatui::init();

    let result = run_app(terminal, client, user_id).await;

    // Restore terminal (always, even on error)
    ratatui::restore();

    result
}

async fn run_app(
    mut terminal: DefaultTerminal,
    client: Arc<dyn PostureApi>,
    user_id: Option<String>,
) -> anyhow::Result<()> {
    let mut app = App::new(client, user_id);
    app.open(Screen::Tenants);

    loop {
        // Background loads report here; the loop is the only writer of the store
        app.drain_events();

        terminal.draw(|frame| ui::render(frame, &app))?;

        if app.should_quit {
            break;
        }

        // Poll events (non-blocking with 100ms timeout)
        if let Some(evt) = event::poll_event(100)? {
            event::handle_event(&mut app, evt);
        }
    }
    Ok(())
}
