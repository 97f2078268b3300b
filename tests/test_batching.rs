// tests/test_batching.rs
//
// Transaction boundaries of the ingestion loop, observed through a recording store.

mod common;

use anyhow::Result;
use common::Fixture;
use lmdb_dataset::{
    DatasetBuilder, DatasetConfig, DatasetStore, GroundTruth, StoreError, WriteBatch,
};
use std::collections::HashMap;

/// Keeps every committed batch so tests can inspect commit boundaries.
#[derive(Default)]
struct RecordingStore {
    commits: Vec<Vec<(Vec<u8>, Vec<u8>)>>,
    syncs: usize,
}

impl RecordingStore {
    fn merged(&self) -> HashMap<Vec<u8>, Vec<u8>> {
        self.commits.iter().flatten().cloned().collect()
    }
}

impl DatasetStore for RecordingStore {
    fn commit(&mut self, batch: &WriteBatch) -> Result<(), StoreError> {
        self.commits
            .push(batch.iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect());
        Ok(())
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        self.syncs += 1;
        Ok(())
    }
}

fn build_many(fx: &Fixture, count: usize, config: DatasetConfig) -> Result<RecordingStore> {
    let mut lines = Vec::with_capacity(count * 2);
    for i in 0..count {
        let name = format!("{i:05}.bin");
        fx.add_image(&name, name.as_bytes());
        lines.push(name);
        lines.push(format!("label{i}"));
    }
    let gt = GroundTruth::from_text(&lines.join("\n"));

    let mut store = RecordingStore::default();
    DatasetBuilder::new(config, &mut store)?.build(&gt)?;
    Ok(store)
}

#[test]
fn two_thousand_and_one_samples_commit_three_times() -> Result<()> {
    let fx = Fixture::new();
    let config = DatasetConfig::new(fx.images(), fx.gt_file(), fx.output()).with_check_valid(false);

    let store = build_many(&fx, 2001, config)?;

    let sizes: Vec<usize> = store.commits.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2000, 2000, 3]);
    assert_eq!(store.syncs, 1);

    // first batch ends exactly at sample 1000
    let first = &store.commits[0];
    assert_eq!(first.last().unwrap().0, b"label-000001000");
    let last = &store.commits[2];
    assert_eq!(last[0].0, b"image-000002001");
    assert_eq!(last[2], (b"num-samples".to_vec(), b"2001".to_vec()));
    Ok(())
}

#[test]
fn counter_is_contiguous_and_ordered() -> Result<()> {
    let fx = Fixture::new();
    let config = DatasetConfig::new(fx.images(), fx.gt_file(), fx.output())
        .with_check_valid(false)
        .with_batch_size(4);

    let store = build_many(&fx, 10, config)?;
    let data = store.merged();

    assert_eq!(data.len(), 10 * 2 + 1);
    for i in 0..10u64 {
        let index = i + 1;
        let label = data[&format!("label-{index:09}").into_bytes()].clone();
        assert_eq!(label, format!("label{i}").into_bytes());
        let image = data[&format!("image-{index:09}").into_bytes()].clone();
        assert_eq!(image, format!("{i:05}.bin").into_bytes());
    }
    assert_eq!(data[&b"num-samples".to_vec()], b"10");
    Ok(())
}
