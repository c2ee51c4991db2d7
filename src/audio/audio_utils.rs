// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Audio decoding for the translation endpoints
//!
//! Whisper expects 16 kHz mono `f32` samples, so every payload is decoded,
//! downmixed and resampled into that layout before it reaches the model.
//! WAV goes through hound; MP3 and the other containers symphonia knows
//! (FLAC, Ogg Vorbis, MKV, ADPCM) go through symphonia.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::debug;

use crate::vision::image_utils::normalize_base64;

/// Maximum decoded audio size (50MB)
pub const MAX_AUDIO_SIZE: usize = 50 * 1024 * 1024;

/// Sample rate the speech model is trained on
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Lowest source rate accepted; telephone audio is 8 kHz
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Longest clip accepted, in seconds
pub const MAX_AUDIO_DURATION_SECS: u64 = 30 * 60;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported audio container")]
    UnsupportedFormat,

    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    #[error("Audio data is empty")]
    EmptyData,
}

/// Decoded, model-ready audio
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples in [-1, 1] at `sample_rate`
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Rate and channel count of the uploaded file
    pub source_sample_rate: u32,
    pub source_channels: u16,
}

impl AudioBuffer {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode a base64-encoded audio file
pub fn decode_base64_audio(base64_str: &str) -> Result<AudioBuffer, AudioError> {
    let normalized = normalize_base64(base64_str);
    if normalized.is_empty() {
        return Err(AudioError::EmptyData);
    }

    let bytes = STANDARD.decode(normalized.as_bytes())?;
    decode_audio_bytes(&bytes)
}

/// Decode raw audio bytes (for multipart uploads)
pub fn decode_audio_bytes(bytes: &[u8]) -> Result<AudioBuffer, AudioError> {
    if bytes.len() > MAX_AUDIO_SIZE {
        return Err(AudioError::TooLarge(bytes.len(), MAX_AUDIO_SIZE));
    }

    if bytes.is_empty() {
        return Err(AudioError::EmptyData);
    }

    let (samples, source_sample_rate, source_channels) = if is_wav(bytes) {
        decode_wav_bytes(bytes)?
    } else {
        decode_compressed_bytes(bytes)?
    };
    if samples.is_empty() {
        return Err(AudioError::EmptyData);
    }

    if source_sample_rate < MIN_SAMPLE_RATE {
        return Err(AudioError::DecodeFailed(format!(
            "sample rate {} Hz is below the minimum of {} Hz",
            source_sample_rate, MIN_SAMPLE_RATE
        )));
    }
    check_duration(samples.len(), source_sample_rate)?;

    let samples = resample_linear(&samples, source_sample_rate, TARGET_SAMPLE_RATE);

    debug!(
        "Decoded audio: {} Hz x{} -> {} samples @ {} Hz",
        source_sample_rate,
        source_channels,
        samples.len(),
        TARGET_SAMPLE_RATE
    );

    Ok(AudioBuffer {
        samples,
        sample_rate: TARGET_SAMPLE_RATE,
        source_sample_rate,
        source_channels,
    })
}

/// RIFF/WAVE container check
fn is_wav(bytes: &[u8]) -> bool {
    matches!(
        bytes,
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x41, 0x56, 0x45, ..]
    )
}

fn decode_wav_bytes(wav_bytes: &[u8]) -> Result<(Vec<f32>, u32, u16), AudioError> {
    let mut reader = hound::WavReader::new(Cursor::new(wav_bytes))
        .map_err(|e| AudioError::DecodeFailed(e.to_string()))?;

    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample.max(1) as u32;
            let max_val = if bits > 1 {
                ((1i64 << (bits - 1)) - 1) as f32
            } else {
                1.0
            };
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::DecodeFailed(e.to_string()))?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::DecodeFailed(e.to_string()))?,
    };

    let mono: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .map(|s| if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 })
        .collect();

    Ok((mono, spec.sample_rate, spec.channels))
}

/// Decode any container symphonia can probe into mono samples
fn decode_compressed_bytes(bytes: &[u8]) -> Result<(Vec<f32>, u32, u16), AudioError> {
    let stream = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|_| AudioError::UnsupportedFormat)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::UnsupportedFormat)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeFailed(e.to_string()))?;

    let mut mono = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(AudioError::DecodeFailed(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frame, keep going
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable audio packet: {}", e);
                continue;
            }
            Err(e) => return Err(AudioError::DecodeFailed(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        mono.extend(
            buffer
                .samples()
                .chunks(usize::from(channels.max(1)))
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .map(|s| if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 }),
        );

        if sample_rate > 0 {
            check_duration(mono.len(), sample_rate)?;
        }
    }

    // A stray frame sync in non-audio bytes probes as MP3 but yields nothing
    if mono.is_empty() {
        return Err(AudioError::UnsupportedFormat);
    }

    Ok((mono, sample_rate, channels))
}

fn check_duration(samples: usize, sample_rate: u32) -> Result<(), AudioError> {
    let max_samples = MAX_AUDIO_DURATION_SECS.saturating_mul(u64::from(sample_rate));
    if samples as u64 > max_samples {
        return Err(AudioError::DecodeFailed(format!(
            "audio is longer than {} seconds",
            MAX_AUDIO_DURATION_SECS
        )));
    }
    Ok(())
}

pub fn resample_linear(audio: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if audio.is_empty() || src_rate == 0 || dst_rate == 0 || src_rate == dst_rate {
        return audio.to_vec();
    }

    let ratio = dst_rate as f64 / src_rate as f64;
    let out_len = ((audio.len() as f64) * ratio).round().max(1.0) as usize;
    let mut out = vec![0f32; out_len];

    for (i, sample) in out.iter_mut().enumerate() {
        let src_pos = i as f64 / ratio;
        let left = (src_pos.floor() as usize).min(audio.len() - 1);
        let right = (left + 1).min(audio.len() - 1);
        let frac = (src_pos - left as f64) as f32;
        *sample = audio[left] * (1.0 - frac) + audio[right] * frac;
    }

    out
}
