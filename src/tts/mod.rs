//! Speech synthesis.
//!
//! This is a placeholder: no provider is called and every request gets the
//! same sample clip back. It stands in until a real Murf integration lands,
//! so the frontend has something to play.

pub const DEFAULT_VOICE_ID: &str = "en-US-natalie";
pub const DEFAULT_FILENAME: &str = "output";
pub const PLACEHOLDER_AUDIO_URL: &str = "https://www.soundjay.com/misc/sounds/bell-ringing-05.wav";

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub audio_url: String,
    pub audio_urls: Vec<String>,
}

pub struct TtsService {
    api_key: Option<String>,
}

impl TtsService {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// Whether a Murf key was supplied. The stub works either way.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn synthesize(&self, text: &str, voice_id: &str, filename: &str) -> Synthesis {
        tracing::info!(
            text_len = text.len(),
            voice_id,
            filename,
            "Placeholder TTS returning sample audio"
        );

        Synthesis {
            audio_url: PLACEHOLDER_AUDIO_URL.to_string(),
            audio_urls: vec![PLACEHOLDER_AUDIO_URL.to_string()],
        }
    }
}
