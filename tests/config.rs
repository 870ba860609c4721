use std::fs;

use bird_inference_api::config::{
    BackendKind, BodyPolicy, ConfigError, ConfigSet, MetadataProviderKind, ReplyFraming,
    ResamplerKind, CONFIG_DIR_ENV,
};

#[test]
fn shipped_config_loads() {
    let config = ConfigSet::load_from_dir("config").unwrap();
    assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
    assert_eq!(config.server.body_policy, BodyPolicy::Strict);
    assert_eq!(config.server.reply_framing, ReplyFraming::Framed);
    assert!(config.server.error_replies);
    assert_eq!(config.client.port, 9000);
    assert_eq!(config.client.reply_framing, config.server.reply_framing);
    assert_eq!(config.audio.target_samples(), 160_000);
    assert_eq!(config.audio.resampler, ResamplerKind::Sinc);
    assert_eq!(config.classifier.backend, BackendKind::Mock);
    assert_eq!(config.classifier.label_index_offset, 0);
    assert_eq!(config.metadata.provider, MetadataProviderKind::Catalog);
}

#[test]
fn env_var_selects_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir("config").unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }
    fs::write(
        dir.path().join("server.yaml"),
        "bind_addr: \"127.0.0.1:9100\"\nmax_connections: 2\nmax_payload_bytes: 1024\nheader_timeout_ms: 100\nbody_timeout_ms: 100\nbody_policy: lenient\nreply_framing: raw\n",
    )
    .unwrap();

    std::env::set_var(CONFIG_DIR_ENV, dir.path());
    let loaded = ConfigSet::load_from_env();
    std::env::remove_var(CONFIG_DIR_ENV);

    let config = loaded.unwrap();
    assert_eq!(config.root(), dir.path());
    assert_eq!(config.server.bind_addr, "127.0.0.1:9100");
    assert_eq!(config.server.body_policy, BodyPolicy::Lenient);
    assert_eq!(config.server.reply_framing, ReplyFraming::Raw);
    // 省略時は有効
    assert!(config.server.error_replies);
}

#[test]
fn zero_window_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir("config").unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }
    fs::write(
        dir.path().join("audio_processing.yaml"),
        "target_sample_rate_hz: 32000\nwindow_seconds: 0\nresampler: sinc\ndefault_format: mp3\ntranscoder: native\n",
    )
    .unwrap();

    match ConfigSet::load_from_dir(dir.path()) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "audio.window_seconds"),
        other => panic!("unexpected result: {other:?}"),
    }
}
