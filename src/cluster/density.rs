//! Density clustering over bounding boxes
//!
//! Groups detections whose boxes sit close together in the frame. Works on
//! the four corner coordinates as one feature vector, tolerates noise points
//! and needs no cluster count up front, since the number of co-located text
//! fragments per frame is unknown and variable.

use crate::config::ClusterConfig;

/// Label assigned to points that belong to no cluster
pub const NOISE_LABEL: i32 = -1;

/// Assign a cluster label to every point
///
/// Builds mutual-reachability distances (pairwise distance inflated to the
/// core distance of either endpoint, the distance to its min_samples-th
/// nearest neighbour) and connects points whose reachability stays within
/// `proximity_threshold`. Connected components with at least
/// `min_cluster_size` members become clusters, labelled `0..k` in order of
/// their lowest member index; everything else is noise. A single point is
/// its own cluster.
pub fn cluster_labels(points: &[[f64; 4]], config: &ClusterConfig) -> Vec<i32> {
    let n = points.len();
    if n <= 1 {
        return vec![0; n];
    }

    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&points[i], &points[j]);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    // Core distances; min_samples is clamped to the available neighbours
    let min_samples = config.min_samples.clamp(1, n - 1);
    let mut core = vec![0.0f64; n];
    for i in 0..n {
        let mut neighbours: Vec<f64> = (0..n).filter(|&j| j != i).map(|j| dist[i][j]).collect();
        neighbours.sort_by(|a, b| a.partial_cmp(b).unwrap());
        core[i] = neighbours[min_samples - 1];
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let reachability = dist[i][j].max(core[i]).max(core[j]);
            if reachability <= config.proximity_threshold {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    // Collect components from the lowest index up, so cluster numbering
    // follows first appearance
    let mut labels = vec![NOISE_LABEL; n];
    let mut visited = vec![false; n];
    let mut next_label = 0;
    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut members = vec![start];
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for &neighbour in &adjacency[node] {
                if !visited[neighbour] {
                    visited[neighbour] = true;
                    members.push(neighbour);
                    stack.push(neighbour);
                }
            }
        }
        if members.len() >= config.min_cluster_size {
            for &member in &members {
                labels[member] = next_label;
            }
            next_label += 1;
        }
    }

    labels
}

/// Euclidean distance between two 4-dimensional points
fn euclidean(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
