//! Headless shell for the UGC scene studio.
//!
//! Collects a generation configuration from the command line, validates it
//! at the boundary, subscribes to the store for progress, runs one batch,
//! and prints the result URLs. Mock mode needs no API key.

use anyhow::{bail, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use ugcstudio_lib::config::GenerationConfig;
use ugcstudio_lib::error::GenerationError;
use ugcstudio_lib::generator::Generator;
use ugcstudio_lib::kie::MediaClient;
use ugcstudio_lib::scene::StageStatus;
use ugcstudio_lib::settings::{self, Settings};
use ugcstudio_lib::store::{GenerationState, GenerationStore};

#[derive(Parser, Debug)]
#[command(name = "ugcstudio-headless")]
#[command(about = "Generate a batch of UGC ad scenes from the command line", long_about = None)]
struct Args {
    /// Number of scenes to generate (1-12)
    #[arg(short, long, default_value_t = 3)]
    scenes: usize,

    /// Dialogue line; repeat once per scene when --scenes > 1
    #[arg(short, long = "dialogue")]
    dialogues: Vec<String>,

    /// Product reference image URL (Drive share links are rewritten)
    #[arg(short, long)]
    reference_image: Option<String>,

    /// Video model tier: veo3_fast or veo3
    #[arg(long, default_value = "veo3_fast")]
    model: String,

    /// Image model variant: gpt4o_image or flux_kontext
    #[arg(long, default_value = "gpt4o_image")]
    image_model: String,

    /// Image aspect ratio: 3:2 or 2:3
    #[arg(long, default_value = "2:3")]
    image_ratio: String,

    /// Video aspect ratio: 16:9 or 9:16
    #[arg(long, default_value = "9:16")]
    video_ratio: String,

    /// Free-text special requests, mined for setting keywords
    #[arg(long)]
    special_requests: Option<String>,

    /// Product/brand hint appended to scene actions
    #[arg(long)]
    product_hint: Option<String>,

    /// Fabricate results locally instead of calling the remote API
    #[arg(long)]
    mock: bool,

    /// API key (overrides the settings file and KIE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Print the prompts JSON and exit without generating
    #[arg(long)]
    prompts_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr so stdout stays clean for prompts JSON and result URLs.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let settings_path = settings::default_settings_path();
    let mut saved = match &settings_path {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let config = build_config(&args, &saved)?;
    if let Err(e) = config.validate() {
        // Boundary check: validation problems never reach the orchestrator.
        eprintln!("Error: {e}");
        std::process::exit(2);
    }

    let mock_mode = args.mock || saved.mock_mode;
    let client = if mock_mode {
        info!("mock mode: fabricating results locally");
        MediaClient::mock()
    } else {
        let api_key = match args.api_key.clone().or_else(|| saved.resolve_api_key()) {
            Some(key) => key,
            None => bail!(
                "no API key found. Pass --api-key, set {}, or run with --mock",
                settings::API_KEY_ENV
            ),
        };
        MediaClient::live(saved.base_url.clone(), api_key)
    };

    let store = Arc::new(GenerationStore::new());
    let progress = store.subscribe(Arc::new(render_progress));

    let mut generator = Generator::new(store.clone(), client);
    generator.set_on_batch_complete(Arc::new(|state: &GenerationState| {
        let done = state
            .scenes
            .iter()
            .filter(|s| s.video_status == StageStatus::Done)
            .count();
        info!(done, total = state.scenes.len(), "batch complete");
    }));

    if args.prompts_only {
        println!("{}", generator.copy_prompts_json(&config)?);
        return Ok(());
    }

    let costs = MediaClient::estimated_costs(config.scene_count, config.model);
    let balance = generator.refresh_credits().await;
    info!(
        balance,
        estimated = costs.total,
        image = costs.image,
        video = costs.video,
        "credit balance"
    );
    if !mock_mode && balance < u64::from(costs.total) {
        warn!(
            balance,
            estimated = costs.total,
            "credit balance may not cover this batch"
        );
    }

    generator.generate_scenes(&config).await;
    store.unsubscribe(progress);
    generator.refresh_credits().await;

    // Remember the last-used free-text fields for the next run.
    saved.remember(&config);
    if let Some(path) = &settings_path {
        if let Err(e) = saved.save(path) {
            warn!("failed to save settings: {e}");
        }
    }

    print_results(&store.snapshot());
    Ok(())
}

/// Merge CLI arguments with remembered settings into one configuration.
fn build_config(args: &Args, saved: &Settings) -> Result<GenerationConfig> {
    let dialogue = args
        .dialogues
        .first()
        .cloned()
        .unwrap_or_else(|| saved.dialogue.clone());

    Ok(GenerationConfig {
        reference_image: args.reference_image.clone().unwrap_or_default(),
        scene_count: args.scenes,
        dialogue,
        dialogues: args.dialogues.clone(),
        model: parse_arg("--model", &args.model)?,
        image_model: parse_arg("--image-model", &args.image_model)?,
        image_aspect_ratio: parse_arg("--image-ratio", &args.image_ratio)?,
        video_aspect_ratio: parse_arg("--video-ratio", &args.video_ratio)?,
        special_requests: args
            .special_requests
            .clone()
            .unwrap_or_else(|| saved.special_requests.clone()),
        product_hint: args
            .product_hint
            .clone()
            .unwrap_or_else(|| saved.product_hint.clone()),
    })
}

fn parse_arg<T>(what: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = GenerationError>,
{
    value
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{what}: {e}"))
}

/// One progress line per store update, e.g.
/// `scene 1 [image=done video=working] | scene 2 [image=idle video=idle]`.
fn render_progress(state: &GenerationState) {
    if state.scenes.is_empty() {
        return;
    }
    let line = state
        .scenes
        .iter()
        .map(|s| {
            format!(
                "scene {} [image={} video={}]",
                s.id,
                s.image_status.as_str(),
                s.video_status.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join(" | ");
    info!("{line}");
}

fn print_results(state: &GenerationState) {
    for scene in &state.scenes {
        match (&scene.image_url, &scene.video_url) {
            (Some(image), Some(video)) => {
                println!("scene {}: image {image}", scene.id);
                println!("scene {}: video {video}", scene.id);
            }
            (Some(image), None) => {
                println!("scene {}: image {image}", scene.id);
                println!(
                    "scene {}: video failed ({})",
                    scene.id,
                    scene.video_status.as_str()
                );
            }
            _ => println!("scene {}: failed", scene.id),
        }
    }
}
