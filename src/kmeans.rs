//! Deterministic k-means over RGB samples.
//!
//! Seeding strides evenly through the input instead of picking random points,
//! and the loop always runs the configured number of iterations, so the same
//! input always produces bit-identical centroids.

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::{HslTriple, Rgb, dist2, luminance, to_hsl};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansOptions {
    /// Number of centroids to seed.
    pub k: usize,
    /// Assignment/update rounds; there is no early exit.
    pub iterations: usize,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self { k: 8, iterations: 12 }
    }
}

/// One dominant colour found by [`kmeans`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster {
    pub center: Rgb,
    /// Number of samples assigned in the final pass. Always > 0 in results.
    pub weight: usize,
    pub hsl: HslTriple,
    pub lum: f32,
}

impl Cluster {
    pub(crate) fn new(center: Rgb, weight: usize) -> Self {
        Self {
            center,
            weight,
            hsl: to_hsl(center),
            lum: luminance(center),
        }
    }
}

/// Partition `samples` into at most `opts.k` clusters, heaviest first.
///
/// Centroids that end up with no samples are dropped, so the result may be
/// shorter than `k`. Empty input gives an empty result.
pub fn kmeans(samples: &[Srgb<u8>], opts: &KMeansOptions) -> Vec<Cluster> {
    if samples.is_empty() || opts.k == 0 {
        return Vec::new();
    }

    let step = (samples.len() / opts.k).max(1);
    let mut centers: Vec<Rgb> = (0..opts.k)
        .map(|i| {
            let s = samples[(i * step) % samples.len()];
            [s.red as f32, s.green as f32, s.blue as f32]
        })
        .collect();

    let mut assignments = vec![0usize; samples.len()];

    for _ in 0..opts.iterations {
        assign(samples, &centers, &mut assignments);

        let mut sums = vec![[0u64; 4]; centers.len()];
        for (sample, &c) in samples.iter().zip(&assignments) {
            sums[c][0] += sample.red as u64;
            sums[c][1] += sample.green as u64;
            sums[c][2] += sample.blue as u64;
            sums[c][3] += 1;
        }
        for (center, sum) in centers.iter_mut().zip(&sums) {
            // Empty clusters keep their previous position.
            if sum[3] == 0 {
                continue;
            }
            let n = sum[3] as f32;
            *center = [sum[0] as f32 / n, sum[1] as f32 / n, sum[2] as f32 / n];
        }
    }

    let mut weights = vec![0usize; centers.len()];
    for &c in &assignments {
        weights[c] += 1;
    }

    let mut clusters: Vec<Cluster> = centers
        .into_iter()
        .zip(weights)
        .filter(|&(_, weight)| weight > 0)
        .map(|(center, weight)| Cluster::new(center, weight))
        .collect();
    clusters.sort_by(|a, b| b.weight.cmp(&a.weight));

    tracing::debug!(samples = samples.len(), clusters = clusters.len(), "k-means finished");
    clusters
}

/// Nearest centroid per sample; ties go to the lower index.
fn assign(samples: &[Srgb<u8>], centers: &[Rgb], assignments: &mut [usize]) {
    for (sample, slot) in samples.iter().zip(assignments.iter_mut()) {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (idx, center) in centers.iter().enumerate() {
            let d = dist2(*sample, center);
            if d < best_dist {
                best_dist = d;
                best = idx;
            }
        }
        *slot = best;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples_of(colors: &[([u8; 3], usize)]) -> Vec<Srgb<u8>> {
        colors
            .iter()
            .flat_map(|&([r, g, b], n)| std::iter::repeat_n(Srgb::new(r, g, b), n))
            .collect()
    }

    #[test]
    fn empty_input_gives_no_clusters() {
        assert!(kmeans(&[], &KMeansOptions::default()).is_empty());
    }

    #[test]
    fn zero_k_gives_no_clusters() {
        let samples = samples_of(&[([10, 20, 30], 5)]);
        assert!(kmeans(&samples, &KMeansOptions { k: 0, iterations: 3 }).is_empty());
    }

    #[test]
    fn never_more_than_k_and_never_empty_clusters() {
        let samples: Vec<Srgb<u8>> = (0..2000u32)
            .map(|i| Srgb::new((i * 37 % 256) as u8, (i * 91 % 256) as u8, (i * 13 % 256) as u8))
            .collect();
        for k in 1..10 {
            let clusters = kmeans(&samples, &KMeansOptions { k, iterations: 6 });
            assert!(clusters.len() <= k);
            assert!(clusters.iter().all(|c| c.weight > 0));
            assert_eq!(clusters.iter().map(|c| c.weight).sum::<usize>(), samples.len());
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let samples: Vec<Srgb<u8>> = (0..777u32)
            .map(|i| Srgb::new((i * 7 % 256) as u8, (i * 3 % 256) as u8, (i * 11 % 256) as u8))
            .collect();
        let opts = KMeansOptions::default();
        let a = kmeans(&samples, &opts);
        let b = kmeans(&samples, &opts);
        assert_eq!(a, b);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.center.map(f32::to_bits), y.center.map(f32::to_bits));
        }
    }

    #[test]
    fn fewer_distinct_colours_than_k() {
        let samples = samples_of(&[([40, 20, 10], 30), ([230, 220, 200], 10)]);
        let clusters = kmeans(&samples, &KMeansOptions { k: 8, iterations: 12 });
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].center, [40.0, 20.0, 10.0]);
        assert_eq!(clusters[0].weight, 30);
        assert_eq!(clusters[1].center, [230.0, 220.0, 200.0]);
        assert_eq!(clusters[1].weight, 10);
    }

    #[test]
    fn sorted_by_descending_weight() {
        let samples: Vec<Srgb<u8>> = (0..1500u32)
            .map(|i| Srgb::new((i * 53 % 256) as u8, (i * 29 % 256) as u8, (i * 17 % 256) as u8))
            .collect();
        let clusters = kmeans(&samples, &KMeansOptions::default());
        assert!(clusters.windows(2).all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn equal_distance_goes_to_lowest_index() {
        let centers = [[10.0, 10.0, 10.0], [10.0, 10.0, 10.0], [30.0, 10.0, 10.0]];
        let samples = [Srgb::new(10, 10, 10), Srgb::new(20, 10, 10)];
        let mut out = [9usize; 2];
        assign(&samples, &centers, &mut out);
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn cluster_carries_hsl_and_luminance() {
        let samples = samples_of(&[([0, 255, 0], 4)]);
        let clusters = kmeans(&samples, &KMeansOptions { k: 1, iterations: 1 });
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].hsl.h - 120.0).abs() < 1e-3);
        assert!((clusters[0].lum - 0.7152).abs() < 1e-4);
    }
}
