use roofshape::{
    resolve_model_path, ClassifierConfig, ImageSet, ModelArtifact, ModelManager, DEFAULT_MODELS_DIR,
    ROOF_SHAPE_CLASSES,
};
use anyhow::Context;
use log::info;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

/// Resolve (and if needed download) the roof shape model.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Force a fresh download of the default model file
    #[arg(short, long)]
    fresh: bool,

    /// Use a custom model file instead of the default one
    #[arg(short, long, conflicts_with = "config")]
    model_path: Option<PathBuf>,

    /// JSON configuration with a `modelPath` key
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the cached default model
    #[arg(long, default_value = DEFAULT_MODELS_DIR)]
    cache_dir: PathBuf,

    /// Directory of images to list as the set a backend would receive
    #[arg(short, long)]
    images: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start_time = Instant::now();

    let configured = match (&args.config, &args.model_path) {
        (Some(config), _) => {
            let config = ClassifierConfig::from_file(config)
                .with_context(|| format!("Failed to read config {}", config.display()))?;
            Some(PathBuf::from(config.model_path()?))
        }
        (None, Some(path)) => Some(path.clone()),
        (None, None) => None,
    };

    let manager = ModelManager::new(&args.cache_dir)?;
    let artifact = ModelArtifact::roof_shape_v1();

    if args.fresh && configured.is_none() {
        info!("Fresh download requested - removing any cached model file...");
        manager.remove_download(&artifact)?;
    }

    let model_path = resolve_model_path(configured.as_deref(), &manager, &artifact).await?;
    info!("Model resolved in {:.2?}", start_time.elapsed());

    println!("Model: {}", model_path.display());
    println!("Classes: {}", ROOF_SHAPE_CLASSES.join(", "));

    if let Some(dir) = &args.images {
        let images = ImageSet::from_dir(dir)
            .with_context(|| format!("Failed to list images in {}", dir.display()))?;
        println!("Images ({}):", images.len());
        for key in images.keys() {
            if let Some(path) = images.image_path(key) {
                println!("  {}: {}", key, path.display());
            }
        }
    }

    Ok(())
}
