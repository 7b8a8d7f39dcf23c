//! `dgb-studio` -- headless DGB Audio session.
//!
//! Checks the backend, lists presets and, when a prompt is given on the
//! command line, submits one generation and prints where to stream it.
//!
//! # Environment variables
//!
//! | Variable                   | Required | Default                     | Description                        |
//! |----------------------------|----------|-----------------------------|------------------------------------|
//! | `DGB_API_URL`              | no       | `http://localhost:8000/api` | Backend API base URL               |
//! | `DGB_REQUEST_TIMEOUT_SECS` | no       | `120`                       | Per-request timeout                |
//! | `DGB_HISTORY_CAP`          | no       | `10`                        | Results kept in the session        |
//! | `DGB_SESSION_FILE`         | no       | `.dgb_session.json`         | Saved sign-in                      |
//! | `DGB_EMAIL`                | no       | --                          | Sign in when no session is saved   |
//! | `DGB_PASSWORD`             | no       | --                          | Password for `DGB_EMAIL`           |
//! | `DGB_PRESET`               | no       | --                          | Preset id to start the form from   |
//! | `DGB_ANTIGRAVITY`          | no       | `50` or the preset's level  | Creativity level 0-100             |
//! | `DGB_LOG_FORMAT`           | no       | `text`                      | `json` for structured log lines    |

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dgb_client::DgbApi;
use dgb_core::playback::{format_time, AudioSink};
use dgb_core::preset::find_preset;
use dgb_core::request::GenerationForm;
use dgb_studio::{SessionStore, Studio, StudioConfig};

/// Sink that only logs transport commands.
struct LogSink;

impl AudioSink for LogSink {
    fn load(&mut self, url: &str) {
        tracing::debug!(url, "Load audio");
    }
    fn play(&mut self) {
        tracing::debug!("Play");
    }
    fn pause(&mut self) {
        tracing::debug!("Pause");
    }
    fn seek(&mut self, seconds: f64) {
        tracing::debug!(position = %format_time(seconds), "Seek");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("DGB_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dgb_studio=info,dgb_client=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = StudioConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        timeout_secs = config.request_timeout.as_secs(),
        history_cap = config.history_cap,
        "Starting dgb-studio",
    );

    let api = DgbApi::new(&config.api_url, config.request_timeout)?;
    let mut studio = Studio::new(
        api,
        LogSink,
        SessionStore::new(&config.session_file),
        config.history_cap,
    );

    studio
        .restore_session()
        .context("could not read the saved session")?;
    if studio.session().is_none() {
        if let (Ok(email), Ok(password)) =
            (std::env::var("DGB_EMAIL"), std::env::var("DGB_PASSWORD"))
        {
            studio.sign_in(&email, &password).await?;
        }
    }

    let health = studio.refresh_availability().await;
    match (health.connected, &health.error) {
        (true, _) => println!("Backend: online ({})", health.status.as_deref().unwrap_or("ok")),
        (false, Some(reason)) => println!("Backend: offline ({reason})"),
        (false, None) => println!("Backend: offline"),
    }

    let presets = studio.load_presets().await;
    if !presets.is_empty() {
        println!("Presets:");
        for preset in presets {
            println!(
                "  {:<20} {:>3} BPM  {:<3}  antigravity {:>3}  {}",
                preset.id,
                preset.bpm,
                preset.key,
                preset.antigravity.value(),
                preset.description,
            );
        }
    }

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let preset_id = std::env::var("DGB_PRESET").ok();
    if prompt.trim().is_empty() && preset_id.is_none() {
        return Ok(());
    }

    let mut form = GenerationForm::with_prompt(prompt);
    if let Some(id) = preset_id {
        let preset = find_preset(studio.presets(), &id)
            .with_context(|| format!("unknown preset {id:?}"))?
            .clone();
        form.apply_preset(preset);
    }
    if let Ok(raw) = std::env::var("DGB_ANTIGRAVITY") {
        form.antigravity = raw
            .trim()
            .parse()
            .with_context(|| format!("DGB_ANTIGRAVITY must be an integer, got {raw:?}"))?;
    }

    let view = studio.preview_parameters(form.antigravity).await;
    println!(
        "Creativity {} ({})",
        view.level().value(),
        view.mode().label()
    );
    if let Some(params) = view.params() {
        for (name, value) in params.display_rows() {
            println!("  {name:<16} {value}");
        }
    }

    let result = studio.generate(&form).await?;
    println!("Job {} ready", result.short_id());
    println!("  prompt  {}", result.prompt_used);
    println!("  audio   {}", result.audio_reference);
    Ok(())
}
