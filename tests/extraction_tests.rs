//! Integration tests for the waveform extraction and loading pipeline

use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use spikewave::{
    ChannelTopology, Component, ExtractorConfig, LoaderConfig, SampleCount, SpikeLoader,
    Thresholds, WaveformExtractor, WaveformLoader,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Synthesize a trace with a smooth spike bump on the given channel
fn trace_with_spike(
    n_samples: usize,
    n_channels: usize,
    center: usize,
    channel: usize,
    amplitude: f32,
) -> Array2<f32> {
    let mut traces = Array2::<f32>::zeros((n_samples, n_channels));
    for s in 0..n_samples {
        let d = s as f32 - center as f32;
        traces[(s, channel)] += amplitude * (-d * d / 4.0).exp();
    }
    traces
}

fn two_channel_extractor() -> WaveformExtractor {
    let mut groups = BTreeMap::new();
    groups.insert(0, vec![0, 1]);
    WaveformExtractor::new(
        ExtractorConfig {
            extract_before: 8,
            extract_after: 12,
            weight_power: 1.0,
        },
        Thresholds::new(1.0, 6.0).unwrap(),
        ChannelTopology::new(groups).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_full_pipeline_on_synthetic_spike() {
    let extractor = two_channel_extractor();
    let raw = trace_with_spike(500, 2, 250, 0, 8.0);
    let filtered = raw.clone();

    // Component: the samples around the bump that cross the weak threshold
    let points: Vec<(usize, usize)> = (247..=253).map(|s| (s, 0)).collect();
    let component = Component::new(points);

    let spike = extractor
        .extract_spike(&component, raw.view(), filtered.view())
        .expect("extraction should succeed");

    assert_eq!(spike.group, 0);
    // The bump is symmetric around 250; the centroid lands close to it
    assert!(
        (spike.time - 250.0).abs() < 0.5,
        "aligned time {} too far from 250",
        spike.time
    );
    assert_eq!(spike.waveform.dim(), (20, 2));
    assert_eq!(spike.mask.len(), 2);
    // Peak amplitude 8 exceeds strong=6 on channel 0
    assert_eq!(spike.mask[0], 1.0);
    // Channel 1 never crossed
    assert_eq!(spike.mask[1], 0.0);

    // The aligned waveform's peak sits at the extract_before position
    let peak_row = spike
        .waveform
        .index_axis(Axis(1), 0)
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(row, _)| row)
        .unwrap();
    assert!(
        (peak_row as i64 - 8).abs() <= 1,
        "peak row {} not near extract_before",
        peak_row
    );
}

#[test]
fn test_pipeline_near_trace_start() {
    // A component at the very start of the recording: the window clips
    // and the extracted waveform pads with zeros instead of failing
    let extractor = two_channel_extractor();
    let raw = trace_with_spike(500, 2, 3, 0, 8.0);
    let filtered = raw.clone();
    let component = Component::new(vec![(2, 0), (3, 0), (4, 0)]);

    let spike = extractor
        .extract_spike(&component, raw.view(), filtered.view())
        .expect("extraction near the start should succeed");
    assert_eq!(spike.waveform.dim(), (20, 2));
    assert!(spike.time > 0.0 && spike.time < 10.0);
}

#[test]
fn test_dead_channel_aborts_event() {
    let extractor = two_channel_extractor();
    let raw = Array2::<f32>::zeros((100, 2));
    let component = Component::new(vec![(50, 7)]);
    let err = extractor
        .extract_spike(&component, raw.view(), raw.view())
        .unwrap_err();
    assert_eq!(err, spikewave::WaveformError::DeadChannel(7));
}

#[test]
fn test_loader_roundtrip_with_filter_and_subset() {
    // A moving-average filter over the margin-inclusive window
    let filter: spikewave::FilterTransform = Arc::new(|window: ArrayView2<f32>| {
        let mut out = window.to_owned();
        for c in 0..window.ncols() {
            for s in 1..window.nrows() - 1 {
                out[(s, c)] =
                    (window[(s - 1, c)] + window[(s, c)] + window[(s + 1, c)]) / 3.0;
            }
        }
        out
    });

    let mut loader = WaveformLoader::with_filter(
        LoaderConfig {
            n_samples: SampleCount::BeforeAfter(4, 4),
            filter_margin: SampleCount::BeforeAfter(2, 2),
            channels: Some(vec![0]),
            ..LoaderConfig::default()
        },
        filter,
    )
    .unwrap();
    loader.set_traces(Arc::new(trace_with_spike(200, 3, 100, 0, 5.0)));

    let batch = loader.load_batch(&[100, 150]).unwrap();
    assert_eq!(batch.dim(), (2, 8, 1));
    // The window at the spike peak carries energy; the one at 150 does not
    assert!(batch.index_axis(Axis(0), 0).iter().any(|&v| v > 1.0));
    assert!(batch.index_axis(Axis(0), 1).iter().all(|&v| v.abs() < 1e-3));
}

#[test]
fn test_spike_loader_matches_waveform_loader() {
    let mut loader = WaveformLoader::new(LoaderConfig {
        n_samples: SampleCount::Total(10),
        ..LoaderConfig::default()
    })
    .unwrap();
    loader.set_traces(Arc::new(trace_with_spike(300, 2, 120, 1, 4.0)));
    let loader = Arc::new(loader);

    let spike_samples = vec![50, 120, 200];
    let spikes = SpikeLoader::new(loader.clone(), spike_samples.clone());
    assert_eq!(spikes.shape(), (3, 10, 2));

    let by_id = spikes.load(&[0, 1, 2]).unwrap();
    let by_time = loader.load_batch(&spike_samples).unwrap();
    assert_eq!(by_id, by_time);
}

#[test]
fn test_batch_with_invalid_time_keeps_shape() {
    init_logging();
    let mut loader = WaveformLoader::new(LoaderConfig {
        n_samples: SampleCount::Total(6),
        ..LoaderConfig::default()
    })
    .unwrap();
    loader.set_traces(Arc::new(Array2::<f32>::zeros((3, 1))));

    // -5 is out of range on a 3-sample trace; the batch still returns
    // with the correct overall shape and a zeroed slot
    let batch = loader.load_batch(&[-5, 1]).unwrap();
    assert_eq!(batch.dim(), (2, 6, 1));
    assert!(batch.iter().all(|&v| v == 0.0));
}
