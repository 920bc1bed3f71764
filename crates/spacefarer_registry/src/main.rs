use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use spacefarer_core::{
    registry::{
        api::{SpacefarerRequest, SpacefarerResponse},
        handler::HandlerConfig,
        infrastructure::model::{Department, Rank, SpacefarerDraft},
        init_registry_with_smtp,
        services::reference::ReferenceService,
    },
    transport::smtp::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT, MailerConfig, TlsMode},
};
use tower::{ServiceBuilder, ServiceExt, timeout::TimeoutLayer};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TlsArg {
    None,
    Opportunistic,
    Required,
    Wrapper,
}

impl From<TlsArg> for TlsMode {
    fn from(arg: TlsArg) -> Self {
        match arg {
            TlsArg::None => TlsMode::None,
            TlsArg::Opportunistic => TlsMode::Opportunistic,
            TlsArg::Required => TlsMode::Required,
            TlsArg::Wrapper => TlsMode::Wrapper,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "spacefarer-registry")]
#[command(about = "Register a spacefarer and send the application confirmation")]
struct SpacefarerRegistryArgs {
    /// Spacefarer name
    #[arg(long)]
    name: String,

    /// Address receiving the confirmation
    #[arg(long)]
    email: String,

    /// Collected stardust
    #[arg(long, allow_hyphen_values = true)]
    stardust: i64,

    /// Requested rank, the highest eligible rank is assigned when omitted
    #[arg(long)]
    rank: Option<u32>,

    /// Department the spacefarer joins
    #[arg(long)]
    department: Option<u32>,

    /// Planet of origin
    #[arg(long)]
    origin_planet: Option<String>,

    /// SMTP relay host
    #[arg(long, env = "SPACEFARER_SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    smtp_host: String,

    /// SMTP relay port
    #[arg(long, env = "SPACEFARER_SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    smtp_port: u16,

    /// Sender address of the confirmation
    #[arg(long, env = "SPACEFARER_SMTP_SENDER", default_value = "info@spacefarers.gal")]
    smtp_sender: String,

    /// Connection security towards the relay
    #[arg(long, env = "SPACEFARER_SMTP_TLS", value_enum, default_value_t = TlsArg::Opportunistic)]
    smtp_tls: TlsArg,

    /// Verify the relay certificate
    #[arg(long, env = "SPACEFARER_SMTP_VERIFY_CERTS", default_value_t = false)]
    smtp_verify_certs: bool,

    /// Duration of the basic wormhole navigation training in milliseconds
    #[arg(long, env = "SPACEFARER_TRAINING_DELAY_MS", default_value_t = 0)]
    training_delay_ms: u64,

    /// Abort the request after this many milliseconds, disabled if 0
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,
}

impl SpacefarerRegistryArgs {
    fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            sender: self.smtp_sender.clone(),
            tls: self.smtp_tls.into(),
            accept_invalid_certs: !self.smtp_verify_certs,
        }
    }

    fn draft(&self) -> SpacefarerDraft {
        SpacefarerDraft {
            rank_id: self.rank,
            department_id: self.department,
            origin_planet: self.origin_planet.clone(),
            ..SpacefarerDraft::new(self.name.clone(), self.email.clone(), self.stardust)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(true).compact().with_target(false))
        .init();
}

/// Reference tables every registry starts with.
fn fleet_reference() -> ReferenceService {
    ReferenceService::new(
        [
            Rank::new(1, "Cadet", 0),
            Rank::new(2, "Lieutenant", 100),
            Rank::new(3, "Captain", 500),
            Rank::new(4, "Admiral", 1000),
        ],
        [
            Department::new(1, "Engineering").with_galaxy("Milky Way"),
            Department::new(2, "Science").with_galaxy("Andromeda"),
            Department::new(3, "Navigation").with_galaxy("Milky Way"),
        ],
    )
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = SpacefarerRegistryArgs::parse();

    let registry = init_registry_with_smtp(
        fleet_reference(),
        &args.mailer_config(),
        HandlerConfig { training_delay_ms: args.training_delay_ms },
    )
    .context("failed to configure the SMTP transport")?;

    let request = SpacefarerRequest::Create(args.draft());
    let response = if args.timeout_ms > 0 {
        ServiceBuilder::new()
            .layer(TimeoutLayer::new(Duration::from_millis(args.timeout_ms)))
            .service(registry)
            .oneshot(request)
            .await
            .map_err(|e| anyhow::anyhow!(e))?
    } else {
        registry.oneshot(request).await?
    };

    let spacefarer = match response {
        SpacefarerResponse::Stored(spacefarer) => spacefarer,
        other => bail!("unexpected registry response: {other:?}"),
    };
    tracing::info!(id = spacefarer.id, rank = ?spacefarer.rank_id, "Spacefarer registered");
    println!("{spacefarer:#?}");
    Ok(())
}
