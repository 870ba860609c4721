use std::sync::Arc;

use bird_inference_api::audio_pipeline::Waveform;
use bird_inference_api::classifier::{
    argmax, softmax, Head, HeadLogits, LabelSet, LabelTable, MockBackend, MultiHeadClassifier,
    UNKNOWN_LABEL,
};
use bird_inference_api::config::ConfigSet;

const LOGIT_CASES: &[&[f32]] = &[
    &[0.0],
    &[1.0, 2.0, 3.0],
    &[-5.0, 10.0, 9.99, -100.0],
    &[88.0, 88.0, 87.0],
    &[-1e4, -1e4 + 1.0, -1e4 + 0.5],
    &[3.5, -2.25, 0.0, 7.125, 7.0, -9.0],
];

#[test]
fn softmax_is_a_distribution() {
    for logits in LOGIT_CASES {
        let probs = softmax(logits);
        assert_eq!(probs.len(), logits.len());
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "sum {sum} for {logits:?}");
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}

#[test]
fn softmax_preserves_argmax() {
    for logits in LOGIT_CASES {
        assert_eq!(argmax(&softmax(logits)), argmax(*logits), "{logits:?}");
    }
}

#[test]
fn ties_pick_the_lowest_index() {
    assert_eq!(argmax(&softmax(&[2.0, 5.0, 5.0])), Some(1));
}

#[test]
fn index_beyond_table_is_unknown() {
    let labels = Arc::new(LabelSet::new(
        LabelTable::new(["amerob"]),
        LabelTable::new(["Turdus"]),
        LabelTable::new(["Turdidae"]),
        LabelTable::new(["Passeriformes"]),
    ));
    let logits = HeadLogits::default()
        .with(Head::Label, vec![0.0, 1.0])
        .with(Head::Genus, vec![1.0, 0.0])
        .with(Head::Family, vec![0.0, 0.0, 9.0])
        .with(Head::Order, vec![4.0]);
    let classifier =
        MultiHeadClassifier::new(Arc::new(MockBackend::with_logits(logits)), labels, 0, 16);

    let prediction = classifier.classify(&Waveform::silent(32_000, 16)).unwrap();
    assert_eq!(prediction.label.name, UNKNOWN_LABEL);
    assert_eq!(prediction.genus.name, "Turdus");
    assert_eq!(prediction.family.name, UNKNOWN_LABEL);
    assert_eq!(prediction.order.name, "Passeriformes");
    assert_eq!(prediction.order.probability, 1.0);
}

#[test]
fn shipped_labels_and_mock_backend_classify_silence() {
    let config = ConfigSet::load_from_dir("config").unwrap();
    let classifier =
        MultiHeadClassifier::from_config(&config.classifier, config.audio.target_samples())
            .unwrap();
    assert_eq!(classifier.backend_name(), "mock");
    assert_eq!(classifier.labels().table(Head::Label).len(), 5);

    let prediction = classifier
        .classify(&Waveform::silent(32_000, config.audio.target_samples()))
        .unwrap();
    assert_eq!(prediction.label.name, "amerob");
    assert_eq!(prediction.genus.name, "Turdus");
    assert_eq!(prediction.family.name, "Turdidae");
    assert_eq!(prediction.order.name, "Passeriformes");
    for head in Head::ALL {
        let p = prediction.head(head).probability;
        assert!((0.0..=1.0).contains(&p));
    }
}
