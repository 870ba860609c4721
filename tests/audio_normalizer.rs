mod common;

use bird_inference_api::audio_pipeline::{
    AudioError, AudioFormat, AudioNormalizer, WINDOW_SAMPLES,
};
use bird_inference_api::config::AudioProcessingConfig;

use common::{silent_mp3, silent_wav, wav_bytes};

fn normalizer() -> AudioNormalizer {
    AudioNormalizer::new(AudioProcessingConfig::default())
}

#[test]
fn two_seconds_of_silence_fill_the_window_with_zeros() {
    let bytes = silent_wav(2.0, 32_000);
    let normalizer = normalizer();
    assert_eq!(normalizer.detect_format(&bytes), AudioFormat::Wav);

    let waveform = normalizer.normalize(bytes, AudioFormat::Wav).unwrap();
    assert_eq!(waveform.len(), WINDOW_SAMPLES);
    assert_eq!(waveform.sample_rate_hz(), 32_000);
    assert!(waveform.samples().iter().all(|s| *s == 0.0));
}

#[test]
fn short_clip_is_padded_after_its_own_samples() {
    let pcm: Vec<i16> = (0..48_000).map(|i| ((i % 200) as i16 - 100) * 100).collect();
    let waveform = normalizer()
        .normalize(wav_bytes(&pcm, 1, 32_000), AudioFormat::Wav)
        .unwrap();

    assert_eq!(waveform.len(), WINDOW_SAMPLES);
    for (out, input) in waveform.samples().iter().zip(&pcm) {
        assert!((out - *input as f32 / 32_768.0).abs() < 1e-6);
    }
    assert!(waveform.samples()[48_000..].iter().all(|s| *s == 0.0));
}

#[test]
fn long_clip_keeps_the_first_window() {
    let pcm: Vec<i16> = (0..200_000).map(|i| (i % 30_000) as i16).collect();
    let waveform = normalizer()
        .normalize(wav_bytes(&pcm, 1, 32_000), AudioFormat::Wav)
        .unwrap();

    assert_eq!(waveform.len(), WINDOW_SAMPLES);
    for (out, input) in waveform.samples().iter().zip(&pcm[..WINDOW_SAMPLES]) {
        assert!((out - *input as f32 / 32_768.0).abs() < 1e-6);
    }
}

#[test]
fn stereo_is_averaged_to_mono() {
    // 左 8192、右 0 → 平均 4096 (= 0.125)
    let interleaved: Vec<i16> = (0..32_000).flat_map(|_| [8_192i16, 0]).collect();
    let waveform = normalizer()
        .normalize(wav_bytes(&interleaved, 2, 32_000), AudioFormat::Wav)
        .unwrap();

    assert!(waveform.samples()[..32_000]
        .iter()
        .all(|s| (*s - 0.125).abs() < 1e-6));
    assert!(waveform.samples()[32_000..].iter().all(|s| *s == 0.0));
}

#[test]
fn other_sample_rates_are_resampled() {
    // 16kHz で 1 秒の定数信号 → 32kHz で約 32000 サンプル
    let pcm = vec![8_192i16; 16_000];
    let waveform = normalizer()
        .normalize(wav_bytes(&pcm, 1, 16_000), AudioFormat::Wav)
        .unwrap();

    assert_eq!(waveform.len(), WINDOW_SAMPLES);
    assert!((waveform.samples()[16_000] - 0.25).abs() < 0.02);
    assert!(waveform.samples()[32_000..].iter().all(|s| *s == 0.0));
}

#[test]
fn empty_payload_is_silence_not_an_error() {
    let waveform = normalizer().normalize(Vec::new(), AudioFormat::Mp3).unwrap();
    assert_eq!(waveform.len(), WINDOW_SAMPLES);
    assert!(waveform.samples().iter().all(|s| *s == 0.0));
}

#[test]
fn corrupt_payload_is_a_decode_error() {
    let mut bytes = b"RIFF\x24\x00\x00\x00WAVE".to_vec();
    bytes.extend_from_slice(&[0xff; 64]);
    let result = normalizer().normalize(bytes, AudioFormat::Wav);
    assert!(matches!(
        result,
        Err(AudioError::Probe(_) | AudioError::NoTrack | AudioError::Decode(_))
    ));
}

#[test]
fn unknown_bytes_fall_back_to_default_format() {
    assert_eq!(normalizer().detect_format(b"????????????"), AudioFormat::Mp3);
}

#[test]
fn mp3_frames_are_decoded_into_the_window() {
    // 200 フレーム = 230400 サンプルで窓より長い
    let bytes = silent_mp3(200);
    let normalizer = normalizer();
    assert_eq!(normalizer.detect_format(&bytes), AudioFormat::Mp3);

    let waveform = normalizer.normalize(bytes, AudioFormat::Mp3).unwrap();
    assert_eq!(waveform.len(), WINDOW_SAMPLES);
    assert_eq!(waveform.sample_rate_hz(), 32_000);
    assert!(waveform.samples().iter().all(|s| s.abs() < 1e-6));
}
