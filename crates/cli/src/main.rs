//! partners-blog entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration** from the environment (after an optional `.env`)
//!    and the prompt directory. Missing credentials stop startup.
//! 2. **Wire observability** with a JSON `tracing-subscriber` layer and, when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure** (`CoupangClient`, `OpenAiProvider`,
//!    `WordPressPublisher`) and inject it into one shared `BlogPipeline`.
//! 4. **Serve** the `listener` routes on `PORT` until Ctrl-C.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use coupang::CoupangClient;
use llm::OpenAiProvider;
use pipeline::{BlogPipeline, Clock, ContentGenerator, PipelineSettings, RequestSigner, SystemClock};
use wordpress::WordPressPublisher;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let telemetry = telemetry::init().context("installing the tracing subscriber")?;

    let result = run().await;
    if let Err(e) = &result {
        error!("exiting: {e:#}");
    }
    telemetry.shutdown();
    result
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let signer = RequestSigner::new(
        config.coupang_access_key.as_str(),
        config.coupang_secret_key.as_str(),
        clock,
    )?;
    let search = CoupangClient::new(config.coupang.clone(), signer)?;
    let text = OpenAiProvider::new(config.openai.clone())?;
    let publisher = WordPressPublisher::new(config.wordpress.clone())?;
    if !publisher.is_enabled() {
        info!("WordPress credentials absent; publishing disabled");
    }

    let (post_templates, review_templates) = config.template_sources();
    let generator = ContentGenerator::new(Arc::new(text), &post_templates, &review_templates);
    let pipeline = Arc::new(BlogPipeline::new(
        Arc::new(search),
        generator,
        Arc::new(publisher),
        PipelineSettings::default(),
    ));

    let socket = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    info!(port = config.port, model = %config.openai.model, "partners-blog started");
    listener::serve(socket, pipeline, shutdown_signal()).await?;
    info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl-C; shutting down");
    }
}
