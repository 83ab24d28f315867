use clap::{Parser, Subcommand};
use handsign_lib::{
    logging, Classifier, FrameOrchestrator, HttpClassifier, RawFrame, RecognitionListener,
    RecognizerConfig, ReplayTracker, Telemetry,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "handsign", version, about = "Hand sign recognition against a remote classifier")]
struct Cli {
    /// Classifier base URL, overrides the configured one
    #[arg(long, global = true)]
    server: Option<String>,

    /// Settings file to use instead of ~/.handsign/config/settings.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the classification service is up and has a model loaded
    Health,

    /// Replay recorded frames and landmarks through the recognizer
    Replay {
        /// Directory of frame images, processed in file name order
        #[arg(long)]
        frames: PathBuf,

        /// JSON lines file with one landmark record (or null) per frame
        #[arg(long)]
        landmarks: PathBuf,

        /// Delivery rate in frames per second
        #[arg(long, default_value_t = 30)]
        fps: u32,
    },
}

struct ConsoleListener {
    recognized: usize,
    hand_visible: bool,
}

impl RecognitionListener for ConsoleListener {
    fn on_letter_recognized(&mut self, label: &str, confidence: f32) {
        self.recognized += 1;
        println!("{} ({:.1}%)", label, confidence * 100.0);
    }

    fn on_telemetry(&mut self, telemetry: Telemetry) {
        if telemetry.hand_detected != self.hand_visible {
            self.hand_visible = telemetry.hand_detected;
            println!("{}", if self.hand_visible { "[hand detected]" } else { "[hand lost]" });
        }
    }

    fn on_frame_rate(&mut self, fps: u32) {
        println!("[{} fps]", fps);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RecognizerConfig::load_from(path)?,
        None => RecognizerConfig::load()?,
    };
    apply_server_override(&mut config, cli.server)?;

    logging::init_subscriber(logging::get_subscriber(&config.log_filter, std::io::stderr))?;

    let classifier = HttpClassifier::from_config(&config)?;

    match cli.command {
        Commands::Health => {
            let health = classifier.health().await?;
            println!(
                "{}: status={}, model_loaded={}",
                classifier.base_url(),
                health.status,
                health.model_loaded
            );
            if !health.is_ready() {
                return Err("classifier is not ready".into());
            }
        }
        Commands::Replay { frames, landmarks, fps } => {
            replay(&config, classifier, &frames, &landmarks, fps).await?;
        }
    }

    Ok(())
}

fn apply_server_override(
    config: &mut RecognizerConfig,
    server: Option<String>,
) -> Result<(), Box<dyn Error>> {
    if let Some(server) = server {
        config.server_url = server;
        config.validate()?;
    }
    Ok(())
}

async fn replay(
    config: &RecognizerConfig,
    classifier: HttpClassifier,
    frames_dir: &Path,
    landmarks: &Path,
    fps: u32,
) -> Result<(), Box<dyn Error>> {
    let tracker = ReplayTracker::from_file(landmarks)?;
    let skipper = tracker.skipper();

    let mut paths: Vec<PathBuf> = std::fs::read_dir(frames_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    if paths.len() != tracker.total() {
        warn!(
            frames = paths.len(),
            landmark_records = tracker.total(),
            "frame and landmark counts differ"
        );
    }

    let mut orchestrator = FrameOrchestrator::new(
        config,
        tracker,
        Arc::new(classifier),
        ConsoleListener {
            recognized: 0,
            hand_visible: false,
        },
    );
    orchestrator.start()?;

    let (tx, rx) = mpsc::channel::<RawFrame>(4);
    let period = Duration::from_secs_f64(1.0 / fps.max(1) as f64);

    let producer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        for (index, path) in paths.into_iter().enumerate() {
            ticker.tick().await;

            let decoded = tokio::task::spawn_blocking({
                let path = path.clone();
                move || image::open(path)
            })
            .await;

            let image = match decoded {
                Ok(Ok(image)) => image,
                Ok(Err(e)) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable frame");
                    skipper.skip(index);
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "frame decoder task failed");
                    skipper.skip(index);
                    continue;
                }
            };

            let frame = RawFrame::from_rgba_image(image.to_rgba8(), chrono::Utc::now().timestamp_millis());
            if tx.send(frame).await.is_err() {
                break;
            }
        }
    });

    orchestrator.run(rx).await;
    producer.await?;

    println!(
        "Replayed {} frames, recognized {} letters",
        orchestrator.state().frames_processed,
        orchestrator.listener().recognized
    );
    Ok(())
}
