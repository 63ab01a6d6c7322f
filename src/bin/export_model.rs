//! Writes the built-in lexicon model to a model file.

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;

use sentiment_api::config::DEFAULT_MODEL_FILE;
use sentiment_api::lexicon::LexiconAnalyzer;
use sentiment_api::model::{Model, ModelFile, Stage};
use sentiment_api::preprocess::PreprocessingConfig;

#[derive(Parser, Debug)]
#[command(name = "export_model", about = "Write the built-in lexicon model file")]
struct Args {
    /// Destination; a timestamped copy is written next to it
    #[arg(env = "MODEL_FILE", default_value = DEFAULT_MODEL_FILE)]
    path: PathBuf,
    #[arg(long, default_value = "sentiment-analysis")]
    name: String,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let analyzer = LexiconAnalyzer::default();
    tracing::info!(entries = analyzer.len(), "exporting lexicon model");

    let file = ModelFile::new(
        Model::Lexicon(analyzer),
        args.name,
        Stage::Train,
        PreprocessingConfig::all_enabled(),
    );
    let archived = file.save(&args.path)?;

    println!("Model written to {} (archived copy: {})", args.path.display(), archived.display());
    Ok(())
}
