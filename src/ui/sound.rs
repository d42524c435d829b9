/// Procedural sound effects via rodio.
///
/// Each effect is synthesized once into an in-memory WAV buffer when the
/// engine starts; playback is fire-and-forget on rodio's output thread.
///
/// Build without the "sound" feature to get a silent stub.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{make_wav, synth};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_eat: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
        sfx_new_best: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::info!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_eat: Arc::new(make_wav(&synth::eat())),
                sfx_game_over: Arc::new(make_wav(&synth::game_over())),
                sfx_new_best: Arc::new(make_wav(&synth::new_best())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_eat(&self) { self.play(&self.sfx_eat); }
        pub fn play_game_over(&self) { self.play(&self.sfx_game_over); }
        pub fn play_new_best(&self) { self.play(&self.sfx_new_best); }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveforms: mono f32 samples at SAMPLE_RATE
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::PI;

    use super::SAMPLE_RATE;

    /// One note: sine plus a little of the given harmonic.
    fn note(freq: f32, dur: f32, harmonic: f32, volume: f32, out: &mut Vec<f32>) {
        let n = (SAMPLE_RATE as f32 * dur) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(0.5);
            let wave = (t * freq * 2.0 * PI).sin() * 0.7
                + (t * freq * harmonic * 2.0 * PI).sin() * 0.3;
            out.push(wave * env * volume);
        }
    }

    /// Short upward chirp.
    pub fn eat() -> Vec<f32> {
        let mut s = Vec::new();
        note(880.0, 0.035, 3.0, 0.25, &mut s);
        note(1319.0, 0.05, 3.0, 0.25, &mut s);
        s
    }

    /// Descending A4→F#4→Eb4→C4 with a fade on the last quarter.
    pub fn game_over() -> Vec<f32> {
        let mut s = Vec::new();
        for freq in [440.0_f32, 370.0, 311.0, 261.0] {
            note(freq, 0.12, 2.0, 0.3, &mut s);
        }
        let total = s.len();
        let fade = total / 4;
        for (k, v) in s[total - fade..].iter_mut().enumerate() {
            *v *= 1.0 - k as f32 / fade as f32;
        }
        s
    }

    /// C5→E5→G5→C6 fanfare.
    pub fn new_best() -> Vec<f32> {
        let mut s = Vec::new();
        for freq in [523.0_f32, 659.0, 784.0] {
            note(freq, 0.09, 2.0, 0.3, &mut s);
        }
        note(1047.0, 0.3, 2.0, 0.3, &mut s);
        s
    }
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: 16-bit PCM mono
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_eat(&self) {}
    pub fn play_game_over(&self) {}
    pub fn play_new_best(&self) {}
}
