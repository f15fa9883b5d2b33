use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use cashguard_app::{AppConfig, AppError, LedgerEnvelope, Session};
use cashguard_events::InMemoryEventBus;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("invalid configuration")?;

    cashguard_observability::init_with(config.log_format);
    config.log_defaults();

    let bus: Arc<InMemoryEventBus<LedgerEnvelope>> = Arc::new(InMemoryEventBus::new());
    let mut session = Session::from_config(&config, bus);

    let view = session
        .login(&config.login_user)
        .with_context(|| format!("cannot log in as {}", config.login_user))?;

    // Operators have no dashboard; print what they can see instead of failing.
    let dashboard = match session.dashboard() {
        Ok(summary) => Some(summary),
        Err(AppError::Forbidden(err)) => {
            tracing::warn!(error = %err, "dashboard not available");
            None
        }
        Err(err) => return Err(err.into()),
    };
    let reconciliation = match session.reconciliation() {
        Ok(report) => Some(report),
        Err(AppError::Forbidden(_)) => None,
        Err(err) => return Err(err.into()),
    };

    if let Some(report) = &reconciliation {
        if !report.is_balanced() {
            tracing::warn!(total_drift = %report.total_drift(), "balances drifted");
        }
    }

    let output = json!({
        "user": session.current_user(),
        "view": view,
        "navigation": session.navigation()?,
        "dashboard": dashboard,
        "reconciliation": reconciliation,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
