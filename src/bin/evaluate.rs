//! Scores a labelled `__label__N<TAB>text` file with a saved model.

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;

use sentiment_api::config::DEFAULT_MODEL_FILE;
use sentiment_api::evaluate::{evaluate, read_labeled};
use sentiment_api::model::ModelFile;
use sentiment_api::service::PredictionService;

#[derive(Parser, Debug)]
#[command(name = "evaluate", about = "Report accuracy and macro-F1 of a model on labelled data")]
struct Args {
    /// Labelled data, one `__label__N<TAB>text` line per sentence
    data: PathBuf,
    #[arg(env = "MODEL_FILE", default_value = DEFAULT_MODEL_FILE)]
    model: PathBuf,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let file = ModelFile::load(&args.model)?;
    let model_type = file.model_type.clone();
    let service = PredictionService::from_file(file);
    let rows = read_labeled(&args.data)?;

    let report = evaluate(&service, &rows)?;
    println!("{} performance on {} sentences:", model_type, report.total);
    println!("Accuracy:       {:.4}\nMacro F1 score: {:.4}", report.accuracy, report.macro_f1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults_when_omitted() {
        let args = Args::try_parse_from(["evaluate", "sst_test.txt"]).unwrap();
        assert_eq!(args.data, PathBuf::from("sst_test.txt"));
        if std::env::var_os("MODEL_FILE").is_none() {
            assert_eq!(args.model, PathBuf::from(DEFAULT_MODEL_FILE));
        }
    }

    #[test]
    fn test_data_is_required() {
        assert!(Args::try_parse_from(["evaluate"]).is_err());
    }
}
