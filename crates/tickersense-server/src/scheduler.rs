//! Periodic driver: independent fixed-interval jobs, each fired once at
//! startup before the first interval elapses.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use tickersense_core::http_client::{HttpClient, HttpRequest};

use crate::config::ServerConfig;
use crate::cycle::AnalysisCycle;
use crate::state::AppState;

pub const ROTATION_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const ANALYSIS_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(12 * 60);

/// Spawn the rotation, analysis, and keep-alive jobs.
pub fn spawn(state: AppState, config: &ServerConfig, http: Arc<dyn HttpClient>) {
    let tokens = Arc::clone(&state.tokens);
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(ROTATION_INTERVAL);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            match tokens.rotate().await {
                Ok(credential) => {
                    tracing::info!(created_at = %credential.created_at, "access credential rotated");
                }
                Err(error) => tracing::error!(%error, "credential rotation failed"),
            }
        }
    });

    let cycle = AnalysisCycle::new(state);
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(ANALYSIS_INTERVAL);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            cycle.run().await;
        }
    });

    // Free-tier hosts idle out instances that receive no traffic; pinging
    // our own public URL keeps the process warm.
    if let Some(url) = config.keepalive_url.clone() {
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(KEEPALIVE_INTERVAL);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                match http.execute(HttpRequest::get(&url)).await {
                    Ok(response) if response.is_success() => {
                        tracing::debug!("keep-alive ping ok");
                    }
                    Ok(response) => {
                        tracing::debug!(status = response.status, "keep-alive ping rejected");
                    }
                    Err(error) => tracing::debug!(%error, "keep-alive ping failed"),
                }
            }
        });
    }
}
