/// Sound cues: short procedural tones via rodio.
///
/// Cue buffers are synthesized once as in-memory WAV files; the reveal blip
/// is built per call because its pitch follows reveal progress. Playback is
/// fire-and-forget on a detached Sink.
///
/// Without the "sound" feature the stub SoundEngine does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_correct: Arc<Vec<u8>>,
        sfx_wrong: Arc<Vec<u8>>,
        sfx_time_up: Arc<Vec<u8>>,
        sfx_match: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_correct: Arc::new(make_wav(&gen_correct())),
                sfx_wrong: Arc::new(make_wav(&gen_wrong())),
                sfx_time_up: Arc::new(make_wav(&gen_time_up())),
                sfx_match: Arc::new(make_wav(&gen_match_complete())),
            })
        }

        fn play_bytes(&self, bytes: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(bytes)) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            self.play_bytes(buf.as_ref().clone());
        }

        /// Tick for one revealed cell; pitch climbs as the picture fills in.
        pub fn play_reveal_blip(&self, revealed: usize, target: usize) {
            let ratio = revealed as f32 / target.max(1) as f32;
            let freq = 320.0 + ratio * 640.0;
            self.play_bytes(make_wav(&tone(freq, 0.03, 0.2, Voice::Pure)));
        }

        pub fn play_correct(&self) { self.play(&self.sfx_correct); }
        pub fn play_wrong(&self) { self.play(&self.sfx_wrong); }
        pub fn play_time_up(&self) { self.play(&self.sfx_time_up); }
        pub fn play_match_complete(&self) { self.play(&self.sfx_match); }
    }

    // ── Synthesis ──

    #[derive(Clone, Copy)]
    enum Voice {
        Pure,
        /// Fundamental plus octave and twelfth.
        Bright,
        /// Hard-clipped sine, a cheap square.
        Buzz,
    }

    fn tone(freq: f32, seconds: f32, volume: f32, voice: Voice) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let phase = t * freq * TAU;
                let wave = match voice {
                    Voice::Pure => phase.sin(),
                    Voice::Bright => {
                        phase.sin() * 0.6 + (phase * 2.0).sin() * 0.3 + (phase * 3.0).sin() * 0.1
                    }
                    Voice::Buzz => (phase.sin() * 4.0).clamp(-1.0, 1.0),
                };
                let env = 1.0 - (i as f32 / n as f32).powf(0.7);
                wave * env * volume
            })
            .collect()
    }

    fn sequence(notes: &[(f32, f32)], volume: f32, voice: Voice) -> Vec<f32> {
        notes
            .iter()
            .flat_map(|&(freq, secs)| tone(freq, secs, volume, voice))
            .collect()
    }

    /// Correct: quick rising triad, G5 B5 D6.
    fn gen_correct() -> Vec<f32> {
        sequence(&[(784.0, 0.06), (988.0, 0.06), (1175.0, 0.14)], 0.28, Voice::Bright)
    }

    /// Wrong: two low buzzes.
    fn gen_wrong() -> Vec<f32> {
        sequence(&[(196.0, 0.09), (0.0, 0.03), (165.0, 0.14)], 0.18, Voice::Buzz)
    }

    /// Time up: slow falling minor third pair.
    fn gen_time_up() -> Vec<f32> {
        sequence(&[(523.0, 0.12), (440.0, 0.12), (349.0, 0.24)], 0.28, Voice::Pure)
    }

    /// Match complete: C major run with a held top note.
    fn gen_match_complete() -> Vec<f32> {
        sequence(
            &[(523.0, 0.09), (659.0, 0.09), (784.0, 0.09), (1047.0, 0.35)],
            0.3,
            Voice::Bright,
        )
    }

    // ── WAV encoding (16-bit mono PCM) ──

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let byte_rate = SAMPLE_RATE * CHANNELS as u32 * BITS as u32 / 8;
        let block_align = CHANNELS * BITS / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let samples = gen_correct();
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(data_size as usize, samples.len() * 2);
        }

        #[test]
        fn cues_stay_in_range() {
            for cue in [gen_correct(), gen_wrong(), gen_time_up(), gen_match_complete()] {
                assert!(!cue.is_empty());
                assert!(cue.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

// ── Public API: no-ops when the sound feature is off ──

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_reveal_blip(&self, _revealed: usize, _target: usize) {}
    pub fn play_correct(&self) {}
    pub fn play_wrong(&self) {}
    pub fn play_time_up(&self) {}
    pub fn play_match_complete(&self) {}
}
