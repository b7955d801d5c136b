//! Unity builds.
//!
//! A unity-enabled target compiles a few synthesized sources, each of which
//! `#include`s a batch of the real sources, instead of one translation unit
//! per source. This trades rebuild granularity (touching one member
//! recompiles its whole batch) for throughput.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::target::{Language, SourceFile};

/// Default number of sources per unity batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// One synthesized unity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnityBatch {
    /// Language class shared by every member
    pub lang: Language,
    /// Position of this batch within its language class, from 0
    pub index: usize,
    /// Member sources in declaration order
    pub members: Vec<PathBuf>,
}

impl UnityBatch {
    /// File name of the synthesized source, e.g. `unity_cxx_0.cpp`.
    pub fn file_name(&self) -> String {
        format!(
            "unity_{}_{}.{}",
            self.lang.ident(),
            self.index,
            self.lang.unity_extension()
        )
    }

    /// Path of the synthesized source inside `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Partition `sources` into unity batches of at most `capacity` members.
///
/// Sources are grouped by language class (C first, then C++), keeping their
/// relative order inside each class. Batches are numbered per class. A
/// capacity of 0 is treated as 1.
pub fn batch_sources(sources: &[SourceFile], capacity: usize) -> Vec<UnityBatch> {
    let capacity = capacity.max(1);
    let mut batches = Vec::new();

    for lang in Language::ALL {
        let members: Vec<&SourceFile> = sources.iter().filter(|s| s.lang == lang).collect();

        for (index, chunk) in members.chunks(capacity).enumerate() {
            batches.push(UnityBatch {
                lang,
                index,
                members: chunk.iter().map(|s| s.path.clone()).collect(),
            });
        }
    }

    tracing::debug!(
        "batched {} sources into {} unity sources (capacity {})",
        sources.len(),
        batches.len(),
        capacity
    );

    batches
}
