use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use ragstore_common::{AppConfig, RagStoreError, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::similarity::{cosine_similarity, mean_vector};
use crate::store::VectorStore;
use crate::types::{Cluster, ClusterMember, Entry};

/// Default cap on refinement rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default centroid similarity at which refinement stops
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.99;

/// Centroid refinement settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterConfig {
    /// Maximum assignment/recompute rounds
    pub max_iterations: usize,

    /// Refinement stops once every centroid's similarity to its previous
    /// position exceeds this value
    pub convergence_threshold: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }
}

impl From<&AppConfig> for ClusterConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            convergence_threshold: config.convergence_threshold,
        }
    }
}

/// Partitions store contents by cosine similarity (k-means style)
///
/// The random source picks the initial centroids. Use
/// [`ClusterEngine::with_seed`] for reproducible partitions.
pub struct ClusterEngine<R = StdRng> {
    config: ClusterConfig,
    rng: R,
}

impl ClusterEngine<StdRng> {
    /// Engine seeded from system entropy
    pub fn new(config: ClusterConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine with a fixed seed
    pub fn with_seed(config: ClusterConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ClusterEngine<R> {
    /// Engine with a caller-supplied random source
    pub fn with_rng(config: ClusterConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Engine settings
    pub fn config(&self) -> ClusterConfig {
        self.config
    }

    /// Cluster everything currently in the store
    pub async fn cluster(
        &mut self,
        store: &VectorStore,
        num_clusters: usize,
    ) -> Result<Vec<Cluster>> {
        let entries = store.entries().await;
        self.cluster_entries(&entries, num_clusters)
    }

    /// Cluster a snapshot of entries
    ///
    /// * `num_clusters == 0` is invalid input.
    /// * An empty snapshot fails with `InsufficientData`.
    /// * Fewer entries than `num_clusters` yields a single cluster holding
    ///   every entry.
    /// * Otherwise returns at most `num_clusters` non-empty clusters in
    ///   centroid order. When fewer distinct vectors exist than requested
    ///   clusters, only that many centroids are seeded.
    pub fn cluster_entries(
        &mut self,
        entries: &[Arc<Entry>],
        num_clusters: usize,
    ) -> Result<Vec<Cluster>> {
        if num_clusters == 0 {
            return Err(RagStoreError::invalid_input(
                "number of clusters must be at least 1",
            ));
        }

        if entries.is_empty() {
            return Err(RagStoreError::insufficient_data(format!(
                "cannot form {} clusters from an empty store",
                num_clusters
            )));
        }

        if entries.len() < num_clusters {
            debug!(
                "{} entries for {} clusters, returning a single cluster",
                entries.len(),
                num_clusters
            );
            return Ok(vec![single_cluster(entries)]);
        }

        let mut centroids = self.initial_centroids(entries, num_clusters);
        let mut assignments = Vec::new();
        let mut rounds = 0;

        for _ in 0..self.config.max_iterations.max(1) {
            rounds += 1;
            assignments = assign(entries, &centroids)?;

            let updated = recompute(entries, &assignments, &centroids);
            let converged = has_converged(&centroids, &updated, self.config.convergence_threshold)?;
            centroids = updated;

            if converged {
                break;
            }
        }

        let clusters: Vec<Cluster> = centroids
            .into_iter()
            .enumerate()
            .filter_map(|(index, centroid)| {
                let members: Vec<ClusterMember> = assignments
                    .iter()
                    .enumerate()
                    .filter(|(_, &assigned)| assigned == index)
                    .map(|(position, _)| ClusterMember {
                        position,
                        id: entries[position].id.clone(),
                    })
                    .collect();

                (!members.is_empty()).then_some(Cluster { centroid, members })
            })
            .collect();

        info!(
            "Clustering finished - {} clusters from {} entries after {} rounds",
            clusters.len(),
            entries.len(),
            rounds
        );
        Ok(clusters)
    }

    /// Pick up to `k` entries with pairwise distinct vectors, at random
    fn initial_centroids(&mut self, entries: &[Arc<Entry>], k: usize) -> Vec<Vec<f64>> {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.shuffle(&mut self.rng);

        let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
        for index in order {
            let vector = &entries[index].vector;
            if !centroids.iter().any(|c| c == vector) {
                centroids.push(vector.clone());
                if centroids.len() == k {
                    break;
                }
            }
        }

        centroids
    }
}

fn single_cluster(entries: &[Arc<Entry>]) -> Cluster {
    let centroid =
        mean_vector(entries.iter().map(|e| e.vector.as_slice())).unwrap_or_default();
    let members = entries
        .iter()
        .enumerate()
        .map(|(position, e)| ClusterMember {
            position,
            id: e.id.clone(),
        })
        .collect();
    Cluster { centroid, members }
}

/// Index of the most similar centroid per entry; ties go to the lowest index
fn assign(entries: &[Arc<Entry>], centroids: &[Vec<f64>]) -> Result<Vec<usize>> {
    entries
        .iter()
        .map(|entry| -> Result<usize> {
            let mut best = 0;
            let mut best_similarity = f64::NEG_INFINITY;
            for (index, centroid) in centroids.iter().enumerate() {
                let similarity = cosine_similarity(&entry.vector, centroid)?;
                if similarity > best_similarity {
                    best = index;
                    best_similarity = similarity;
                }
            }
            Ok(best)
        })
        .collect()
}

/// Mean of each centroid's members; centroids without members stay put
fn recompute(
    entries: &[Arc<Entry>],
    assignments: &[usize],
    centroids: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    centroids
        .iter()
        .enumerate()
        .map(|(index, previous)| {
            let members = entries
                .iter()
                .zip(assignments)
                .filter(|(_, &assigned)| assigned == index)
                .map(|(entry, _)| entry.vector.as_slice());
            mean_vector(members).unwrap_or_else(|| previous.clone())
        })
        .collect()
}

fn has_converged(previous: &[Vec<f64>], updated: &[Vec<f64>], threshold: f64) -> Result<bool> {
    for (old, new) in previous.iter().zip(updated) {
        if cosine_similarity(old, new)? <= threshold {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TableEmbedder;
    use crate::types::Metadata;
    use std::collections::BTreeSet;

    fn entry(id: &str, vector: &[f64]) -> Arc<Entry> {
        Arc::new(Entry {
            id: id.to_string(),
            vector: vector.to_vec(),
            content: id.to_string(),
            metadata: Metadata::new(),
            indexed_at: chrono::Utc::now(),
        })
    }

    fn two_groups() -> Vec<Arc<Entry>> {
        vec![
            entry("a1", &[1.0, 0.0]),
            entry("b1", &[0.0, 1.0]),
            entry("a2", &[0.9, 0.1]),
            entry("b2", &[0.1, 0.9]),
            entry("a3", &[0.95, 0.05]),
            entry("b3", &[0.05, 0.95]),
        ]
    }

    /// Deterministic spread of positive vectors
    fn scattered(count: usize, dim: usize) -> Vec<Arc<Entry>> {
        let mut rng = StdRng::seed_from_u64(7);
        (0..count)
            .map(|i| {
                let vector: Vec<f64> = (0..dim).map(|_| rng.gen_range(0.01..1.0)).collect();
                entry(&format!("e{}", i), &vector)
            })
            .collect()
    }

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn member_ids(cluster: &Cluster) -> BTreeSet<String> {
        cluster.members.iter().map(|m| m.id.clone()).collect()
    }

    #[test]
    fn test_separates_two_groups() {
        for seed in 0..10 {
            let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), seed);
            let clusters = engine.cluster_entries(&two_groups(), 2).unwrap();

            assert_eq!(clusters.len(), 2, "seed {}", seed);
            let groups: BTreeSet<BTreeSet<String>> = clusters.iter().map(member_ids).collect();
            let expected = BTreeSet::from([ids(&["a1", "a2", "a3"]), ids(&["b1", "b2", "b3"])]);
            assert_eq!(groups, expected, "seed {}", seed);
        }
    }

    #[test]
    fn test_partition_covers_every_entry_once() {
        let entries = scattered(40, 5);
        let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), 42);
        let clusters = engine.cluster_entries(&entries, 4).unwrap();

        assert!(!clusters.is_empty() && clusters.len() <= 4);
        assert!(clusters.iter().all(|c| !c.is_empty()));

        let mut positions: Vec<usize> = clusters
            .iter()
            .flat_map(|c| c.members.iter().map(|m| m.position))
            .collect();
        positions.sort_unstable();
        assert_eq!(positions, (0..entries.len()).collect::<Vec<_>>());

        for cluster in &clusters {
            for member in &cluster.members {
                assert_eq!(member.id, entries[member.position].id);
            }
            assert!(cluster.members.windows(2).all(|w| w[0].position < w[1].position));
        }
    }

    #[test]
    fn test_same_seed_same_partition() {
        let entries = scattered(30, 4);
        let first = ClusterEngine::with_seed(ClusterConfig::default(), 1234)
            .cluster_entries(&entries, 3)
            .unwrap();
        let second = ClusterEngine::with_seed(ClusterConfig::default(), 1234)
            .cluster_entries(&entries, 3)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fewer_entries_than_clusters() {
        let entries = vec![entry("x", &[1.0, 0.0]), entry("y", &[0.0, 2.0])];
        let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), 0);
        let clusters = engine.cluster_entries(&entries, 3).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[0].centroid, vec![0.5, 1.0]);
    }

    #[test]
    fn test_empty_input_is_insufficient_data() {
        let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), 0);
        let err = engine.cluster_entries(&[], 2).unwrap_err();
        assert!(matches!(err, RagStoreError::InsufficientData(_)));
    }

    #[test]
    fn test_zero_clusters_is_invalid() {
        let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), 0);
        let err = engine.cluster_entries(&two_groups(), 0).unwrap_err();
        assert!(matches!(err, RagStoreError::InvalidInput(_)));
    }

    #[test]
    fn test_identical_vectors_seed_one_centroid() {
        let entries = vec![
            entry("p", &[1.0, 1.0]),
            entry("q", &[1.0, 1.0]),
            entry("r", &[1.0, 1.0]),
        ];
        let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), 9);
        let clusters = engine.cluster_entries(&entries, 2).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
    }

    #[test]
    fn test_single_round_still_partitions() {
        let config = ClusterConfig {
            max_iterations: 1,
            ..ClusterConfig::default()
        };
        let entries = scattered(12, 3);
        let clusters = ClusterEngine::with_seed(config, 5)
            .cluster_entries(&entries, 3)
            .unwrap();
        let total: usize = clusters.iter().map(Cluster::len).sum();
        assert_eq!(total, entries.len());
    }

    #[test]
    fn test_zero_vector_is_degenerate() {
        let entries = vec![
            entry("a", &[1.0, 0.0]),
            entry("zero", &[0.0, 0.0]),
            entry("b", &[0.0, 1.0]),
        ];
        let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), 3);
        let err = engine.cluster_entries(&entries, 2).unwrap_err();
        assert!(matches!(err, RagStoreError::DegenerateVector(_)));
    }

    #[tokio::test]
    async fn test_cluster_reads_store() {
        let embedder = Arc::new(TableEmbedder::new(&[
            ("left", &[1.0, 0.0][..]),
            ("left again", &[0.9, 0.2][..]),
            ("right", &[0.0, 1.0][..]),
        ]));
        let store = VectorStore::new(embedder);
        for text in ["left", "right", "left again"] {
            store.add(text, text, Metadata::new()).await.unwrap();
        }

        let mut engine = ClusterEngine::with_seed(ClusterConfig::default(), 11);
        let clusters = engine.cluster(&store, 2).await.unwrap();

        let groups: BTreeSet<BTreeSet<String>> = clusters.iter().map(member_ids).collect();
        assert!(groups.contains(&ids(&["left", "left again"])));
        assert!(groups.contains(&ids(&["right"])));
    }

    #[test]
    fn test_config_from_app_config() {
        let mut app = AppConfig::default();
        app.max_iterations = 7;
        app.convergence_threshold = 0.5;
        let config = ClusterConfig::from(&app);
        assert_eq!(config.max_iterations, 7);
        assert_eq!(config.convergence_threshold, 0.5);
    }
}
