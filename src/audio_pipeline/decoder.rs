//! symphonia によるメモリ上の音声デコード
use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::utils::downmix_interleaved;
use super::{AudioError, AudioFormat};

/// デコード済みのモノラル信号（元のサンプルレートのまま）
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate_hz: u32,
    pub channels: usize,
}

/// バイト列をデコードし、全チャネルを平均したモノラル f32 にする
///
/// `max_frames` を指定するとその数に達した時点でデコードを打ち切る。
pub fn decode_to_mono(
    bytes: Vec<u8>,
    format: Option<AudioFormat>,
    max_frames: Option<usize>,
) -> Result<DecodedAudio, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(format) = format {
        hint.with_extension(format.extension());
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(AudioError::Probe)?;
    let mut reader = probed.format;

    let (track_id, codec_params) = {
        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(AudioError::NoTrack)?;
        (track.id, track.codec_params.clone())
    };

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &dec_opts)
        .map_err(AudioError::Decode)?;

    let mut samples = Vec::new();
    let mut sample_rate_hz = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    loop {
        if max_frames.is_some_and(|limit| samples.len() >= limit) {
            break;
        }

        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => break,
            Err(SymphoniaError::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(AudioError::Decode(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate_hz.get_or_insert(spec.rate);
                channels = spec.channels.count().max(1);

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                downmix_interleaved(buffer.samples(), channels, &mut samples);
            }
            Err(SymphoniaError::DecodeError(message)) => {
                // 壊れたパケットは読み飛ばす
                warn!(%message, "skipping undecodable packet");
            }
            Err(SymphoniaError::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(AudioError::Decode(err)),
        }
    }

    let sample_rate_hz = sample_rate_hz.ok_or(AudioError::NoTrack)?;
    debug!(
        frames = samples.len(),
        sample_rate_hz,
        channels,
        "audio decoded"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate_hz,
        channels,
    })
}
