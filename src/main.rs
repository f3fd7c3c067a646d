use std::sync::Arc;

use anyhow::Context;

use onboarding_form::cli;
use onboarding_form::config::OnboardingConfig;
use onboarding_form::navigation::HistoryNavigator;
use onboarding_form::onboarding::{BootstrapPhase, OnboardingDeps, OnboardingForm};
use onboarding_form::session::StaticSession;
use onboarding_form::store::{ProfileStore, open_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Arc::new(OnboardingConfig::from_env().context("loading configuration")?);

    let store: Arc<dyn ProfileStore> = Arc::new(
        open_store(&config)
            .await
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );

    eprintln!("📝 Onboarding Form v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Pictures: {}", config.picture_candidates.len());

    let navigator = Arc::new(HistoryNavigator::new());
    let deps = OnboardingDeps {
        sessions: Arc::new(StaticSession::from_env()),
        store,
        navigator: navigator.clone(),
    };

    let mut form = OnboardingForm::new(Arc::clone(&config), deps);
    match form.mount().await {
        BootstrapPhase::Unlocked => {
            if let Some(session) = form.session() {
                eprintln!("   Signed in as: {}", session.email);
            }
            eprintln!("   Type 'help' for commands.\n");
            cli::run(&mut form).await;
        }
        phase => {
            eprintln!(
                "   Not showing the form ({phase}), went to {}",
                navigator.last().unwrap_or_default()
            );
        }
    }

    Ok(())
}
