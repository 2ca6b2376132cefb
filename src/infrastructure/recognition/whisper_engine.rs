use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use tokenizers::Tokenizer;

use crate::application::ports::{RecognitionEngine, RecognitionError, RecognizerSession};

const MAX_DECODE_TOKENS: usize = 224;

/// Whisper model loaded from a local directory holding `config.json`,
/// `tokenizer.json`, `model.safetensors` and the mel filter bank.
pub struct WhisperEngine {
    model: m::model::Whisper,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
    model_path: PathBuf,
}

impl WhisperEngine {
    pub fn load(model_path: &Path) -> Result<Self, RecognitionError> {
        let device = Device::Cpu;

        tracing::info!(
            device = ?device,
            model_path = %model_path.display(),
            "Loading Whisper recognition model"
        );

        if !model_path.is_dir() {
            return Err(RecognitionError::ModelLoadFailed(format!(
                "model directory not found: {}",
                model_path.display()
            )));
        }

        let config_contents = std::fs::read_to_string(model_path.join("config.json"))
            .map_err(|e| RecognitionError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| RecognitionError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(model_path.join("tokenizer.json"))
            .map_err(|e| RecognitionError::ModelLoadFailed(format!("tokenizer: {}", e)))?;

        let mel_file = match config.num_mel_bins {
            128 => "melfilters128.bytes",
            _ => "melfilters.bytes",
        };
        let mel_bytes = std::fs::read(model_path.join(mel_file))
            .map_err(|e| RecognitionError::ModelLoadFailed(format!("{}: {}", mel_file, e)))?;
        let mel_filters = read_mel_filters(&mel_bytes, &config)?;

        let weights_path = model_path.join("model.safetensors");
        if !weights_path.is_file() {
            return Err(RecognitionError::ModelLoadFailed(format!(
                "weights not found: {}",
                weights_path.display()
            )));
        }

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &device)
                .map_err(|e| RecognitionError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| RecognitionError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!("Whisper recognition model loaded");

        Ok(Self {
            model,
            tokenizer,
            config,
            device,
            mel_filters,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl RecognitionEngine for WhisperEngine {
    fn create_session(
        &self,
        sample_rate: u32,
    ) -> Result<Box<dyn RecognizerSession + '_>, RecognitionError> {
        if sample_rate as usize != m::SAMPLE_RATE {
            return Err(RecognitionError::SessionFailed(format!(
                "whisper requires {} Hz audio, got {} Hz",
                m::SAMPLE_RATE,
                sample_rate
            )));
        }

        // Sessions decode on their own copy; weights are shared, the KV cache is not.
        Ok(Box::new(WhisperSession {
            engine: self,
            model: self.model.clone(),
            samples: Vec::new(),
            carry: None,
        }))
    }
}

impl Drop for WhisperEngine {
    fn drop(&mut self) {
        tracing::info!(
            model_path = %self.model_path.display(),
            "Whisper recognition model released"
        );
    }
}

struct WhisperSession<'a> {
    engine: &'a WhisperEngine,
    model: m::model::Whisper,
    samples: Vec<f32>,
    carry: Option<u8>,
}

impl RecognizerSession for WhisperSession<'_> {
    fn accept_waveform(&mut self, pcm: &[u8]) -> Result<bool, RecognitionError> {
        let windows_before = self.samples.len() / m::N_SAMPLES;

        let mut bytes = pcm;
        if let Some(low) = self.carry.take() {
            match bytes.split_first() {
                Some((&high, rest)) => {
                    self.push_sample(i16::from_le_bytes([low, high]));
                    bytes = rest;
                }
                None => {
                    self.carry = Some(low);
                    return Ok(false);
                }
            }
        }

        let mut pairs = bytes.chunks_exact(2);
        for pair in &mut pairs {
            self.push_sample(i16::from_le_bytes([pair[0], pair[1]]));
        }
        self.carry = pairs.remainder().first().copied();

        Ok(self.samples.len() / m::N_SAMPLES > windows_before)
    }

    fn final_result(mut self: Box<Self>) -> Result<String, RecognitionError> {
        let engine = self.engine;
        let mut segments: Vec<String> = Vec::new();
        let samples = std::mem::take(&mut self.samples);

        for (i, chunk) in samples.chunks(m::N_SAMPLES).enumerate() {
            let mut window = chunk.to_vec();
            window.resize(m::N_SAMPLES, 0.0);

            let mel_data = m::audio::pcm_to_mel(&engine.config, &window, &engine.mel_filters);
            let n_mel = engine.config.num_mel_bins;
            let n_frames = mel_data.len() / n_mel;

            let mel = Tensor::from_vec(mel_data, (1, n_mel, n_frames), &engine.device)
                .map_err(failed_at("mel tensor"))?;

            tracing::debug!(segment = i, "Decoding audio window");
            let text = decode_segment(&mut self.model, &engine.tokenizer, &engine.device, &mel)?;
            if !text.is_empty() {
                segments.push(text);
            }
        }

        let transcript = segments.join(" ");

        tracing::debug!(
            segments = segments.len(),
            chars = transcript.len(),
            "Whisper session finalized"
        );

        Ok(serde_json::json!({ "text": transcript }).to_string())
    }
}

impl WhisperSession<'_> {
    fn push_sample(&mut self, sample: i16) {
        self.samples.push(f32::from(sample) / 32768.0);
    }
}

fn decode_segment(
    model: &mut m::model::Whisper,
    tokenizer: &Tokenizer,
    device: &Device,
    mel: &Tensor,
) -> Result<String, RecognitionError> {
    let sot_token = token_id(tokenizer, m::SOT_TOKEN)?;
    let transcribe_token = token_id(tokenizer, m::TRANSCRIBE_TOKEN)?;
    let no_timestamps_token = token_id(tokenizer, m::NO_TIMESTAMPS_TOKEN)?;
    let eot_token = token_id(tokenizer, m::EOT_TOKEN)?;

    let audio_features = model
        .encoder
        .forward(mel, true)
        .map_err(failed_at("encoder"))?;

    let prompt = [sot_token, transcribe_token, no_timestamps_token];
    let mut tokens = prompt.to_vec();

    for step in 0..MAX_DECODE_TOKENS {
        let token_tensor = Tensor::new(tokens.as_slice(), device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(failed_at("token tensor"))?;

        let decoder_output = model
            .decoder
            .forward(&token_tensor, &audio_features, step == 0)
            .map_err(failed_at("decoder"))?;

        let logits = decoder_output
            .squeeze(0)
            .and_then(|t| model.decoder.final_linear(&t))
            .map_err(failed_at("linear"))?;

        let next_token = logits
            .dim(0)
            .and_then(|seq_len| logits.get(seq_len - 1))
            .and_then(|last| last.argmax(0))
            .and_then(|t| t.to_scalar::<u32>())
            .map_err(failed_at("argmax"))?;

        if next_token == eot_token {
            break;
        }
        tokens.push(next_token);
    }

    model.reset_kv_cache();

    let text = tokenizer
        .decode(&tokens[prompt.len()..], true)
        .map_err(failed_at("detokenize"))?;

    Ok(text.trim().to_string())
}

fn failed_at<E: std::fmt::Display>(stage: &'static str) -> impl FnOnce(E) -> RecognitionError {
    move |e| RecognitionError::RecognitionFailed(format!("{}: {}", stage, e))
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, RecognitionError> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| RecognitionError::RecognitionFailed(format!("token not found: {}", token)))
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, RecognitionError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(RecognitionError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    let filters: Vec<f32> = bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(filters)
}
