#![allow(dead_code)]

use std::io::Cursor;

use bird_inference_api::assembler::ClassificationResult;

/// 16bit PCM の WAV をメモリ上に作る（`frames` はチャネルごとのサンプル列をインターリーブしたもの）
pub fn wav_bytes(interleaved: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for sample in interleaved {
            writer.write_sample(*sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// 無音のモノラル WAV
pub fn silent_wav(seconds: f32, sample_rate: u32) -> Vec<u8> {
    let frames = (seconds * sample_rate as f32) as usize;
    wav_bytes(&vec![0; frames], 1, sample_rate)
}

/// 無音の MP3（MPEG-1 Layer III, 32kbps, 32kHz, モノラル, 1 フレーム 144 バイト / 1152 サンプル）
pub fn silent_mp3(frames: usize) -> Vec<u8> {
    const HEADER: [u8; 4] = [0xFF, 0xFB, 0x18, 0xC4];
    const FRAME_LEN: usize = 144;
    let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        bytes.extend_from_slice(&HEADER);
        bytes.resize(bytes.len() + FRAME_LEN - HEADER.len(), 0);
    }
    bytes
}

pub fn sample_result(species: &str) -> ClassificationResult {
    ClassificationResult {
        species: species.to_string(),
        common_name: "American Robin".to_string(),
        scientific_name: "Turdus migratorius".to_string(),
        identification_text: "Familiar thrush.".to_string(),
        image_url: "https://example.org/amerob.jpg".to_string(),
        probability: 0.75,
        genus: "Turdus".to_string(),
        genus_probability: 0.7,
        family: "Turdidae".to_string(),
        family_probability: 0.65,
        order: "Passeriformes".to_string(),
        order_probability: 0.9,
    }
}
