//! Translation into regional languages for rural distribution.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{ask, AgentError};
use crate::llm::{ModelClient, PromptTask};
use crate::models::{MultilingualResult, Translation, UnitOutcome};

/// Target languages as (code, display name), in output order.
pub const SUPPORTED_LANGUAGES: [(&str, &str); 5] = [
    ("hindi", "Hindi (हिंदी)"),
    ("marathi", "Marathi (मराठी)"),
    ("bengali", "Bengali (বাংলা)"),
    ("tamil", "Tamil (தமிழ்)"),
    ("kannada", "Kannada (ಕನ್ನಡ)"),
];

pub struct MultilingualConverter {
    client: Arc<dyn ModelClient>,
}

impl MultilingualConverter {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Translate into every supported language. One failed language aborts
    /// the whole conversion.
    pub async fn convert_languages(&self, clause: &str) -> UnitOutcome<MultilingualResult> {
        match self.translate_all(clause).await {
            Ok(translations) => {
                let rural_customer_ready = translations.iter().all(|t| t.ready_for_distribution);
                UnitOutcome::Completed(MultilingualResult {
                    source_language: "english".to_string(),
                    total_languages: translations.len(),
                    translations,
                    rural_customer_ready,
                })
            }
            Err(e) => {
                warn!("Translation failed: {}", e);
                UnitOutcome::failed(format!("Translation failed: {}", e))
            }
        }
    }

    async fn translate_all(&self, clause: &str) -> Result<Vec<Translation>, AgentError> {
        let mut translations = Vec::with_capacity(SUPPORTED_LANGUAGES.len());

        for (code, name) in SUPPORTED_LANGUAGES {
            debug!("Translating into {}", code);
            let task = PromptTask::Translation {
                language_name: name,
            };
            let translated_text = ask(self.client.as_ref(), task, clause).await?;

            translations.push(Translation {
                language_code: code.to_string(),
                language_name: name.to_string(),
                ready_for_distribution: !translated_text.is_empty(),
                translated_text,
            });
        }

        Ok(translations)
    }
}
