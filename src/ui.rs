//! Minimal HTML form for trying the model from a browser.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;

use crate::service::PredictionService;

pub const MAX_SENTENCE_CHARS: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct SentenceForm {
    #[serde(default)]
    pub sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Success(String),
    Error(String),
}

/// Runs a submitted form through the same scoring path as the JSON API.
pub fn submit(service: &PredictionService, form: &SentenceForm) -> Flash {
    let sentence = form.sentence.trim();
    if sentence.is_empty() {
        return Flash::Error("Sentence: This field is required.".to_string());
    }
    if form.sentence.chars().count() > MAX_SENTENCE_CHARS {
        return Flash::Error(format!(
            "Sentence: Field must be between 0 and {} characters long.",
            MAX_SENTENCE_CHARS
        ));
    }

    match service.score_sentence(&form.sentence) {
        Ok(score) => Flash::Success(format!("{}  ({})", score, service.model().display_name())),
        Err(e) => {
            tracing::error!(error = %e, "form prediction failed");
            Flash::Error("Prediction failed. Please try again later.".to_string())
        }
    }
}

pub fn render(sentence: &str, flash: Option<&Flash>) -> String {
    let flash_html = match flash {
        Some(Flash::Success(msg)) => format!(r#"<p class="flash success">{}</p>"#, encode_text(msg)),
        Some(Flash::Error(msg)) => format!(r#"<p class="flash error">{}</p>"#, encode_text(msg)),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Sentiment Analysis</title>
<style>
body {{ font-family: sans-serif; max-width: 40rem; margin: 3rem auto; }}
input[type=text] {{ width: 100%; padding: .4rem; }}
.flash {{ padding: .6rem; border-radius: 4px; }}
.success {{ background: #e6f4ea; }}
.error {{ background: #fce8e6; }}
</style>
</head>
<body>
<h1>Sentiment Analysis</h1>
{flash}
<form method="post" action="/">
<label for="sentence">Sentence:</label>
<input type="text" id="sentence" name="sentence" maxlength="{max}" value="{value}" required>
<button type="submit">Analyse</button>
</form>
</body>
</html>
"#,
        flash = flash_html,
        max = MAX_SENTENCE_CHARS,
        value = encode_double_quoted_attribute(sentence),
    )
}
