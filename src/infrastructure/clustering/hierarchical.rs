//! Agglomerative hierarchical clustering.
//!
//! Every instance starts as its own cluster; the two closest clusters are
//! merged until `k` remain. "Closest" depends on the [`Linkage`]. The merge
//! history is kept as a binary tree per remaining cluster and rendered as
//! Newick text with merge heights as branch lengths.
//!
//! Cost is O(n²) memory for the pairwise distance matrix and O(n²) cluster
//! distance updates per merge for the centroid-style linkages.

use std::fmt::Write as _;

use super::distance::{Distance, Metric};
use super::error::{Error, Result};
use super::table::{column_summary, Column, Table};
use super::traits::Clusterer;

/// Inter-cluster distance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Linkage {
    /// Closest pair of members.
    #[default]
    Single,
    /// Farthest pair of members.
    Complete,
    /// Mean distance over all cross-cluster pairs.
    Average,
    /// Mean distance over all pairs in the merged cluster.
    Mean,
    /// Distance between cluster centroids.
    Centroid,
    /// Increase in within-cluster squared error caused by the merge.
    Ward,
}

impl Linkage {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Complete => "COMPLETE",
            Self::Average => "AVERAGE",
            Self::Mean => "MEAN",
            Self::Centroid => "CENTROID",
            Self::Ward => "WARD",
        }
    }

    /// Parse an upper-case linkage name.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Single,
            Self::Complete,
            Self::Average,
            Self::Mean,
            Self::Centroid,
            Self::Ward,
        ]
        .into_iter()
        .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

/// Hierarchical clustering configuration.
#[derive(Debug, Clone)]
pub struct Hierarchical {
    k: usize,
    linkage: Linkage,
    metric: Metric,
}

impl Hierarchical {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            linkage: Linkage::Single,
            metric: Metric::Euclidean,
        }
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn fit(&self, table: &Table) -> Result<HierarchicalModel> {
        let n = table.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let distance = Distance::fit(self.metric, table);
        let rows = table.rows();
        let pair: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| distance.distance(&rows[i], &rows[j])).collect())
            .collect();

        // Active clusters: member lists plus the arena node of their subtree.
        let mut members: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
        let mut roots: Vec<usize> = (0..n).collect();
        let mut nodes: Vec<Node> = (0..n).map(Node::leaf).collect();
        let mut cluster_dist = match self.linkage {
            // Merge cost of two singletons is half their squared distance.
            Linkage::Ward => pair
                .iter()
                .map(|r| r.iter().map(|d| d * d / 2.0).collect())
                .collect(),
            _ => pair.clone(),
        };
        let mut active = n;

        while active > self.k {
            let Some((a, b, height)) = closest_pair(&members, &cluster_dist) else {
                break;
            };
            let merged_node = Node {
                leaf: None,
                children: Some((roots[a], roots[b])),
                height,
            };
            nodes.push(merged_node);
            roots[a] = nodes.len() - 1;

            let mut merged = members[a].take().unwrap_or_default();
            merged.extend(members[b].take().unwrap_or_default());
            members[a] = Some(merged);
            active -= 1;

            for m in 0..n {
                if m == a || members[m].is_none() {
                    continue;
                }
                let d = self.linkage_distance(
                    table,
                    &distance,
                    &pair,
                    members[a].as_deref().unwrap_or_default(),
                    members[m].as_deref().unwrap_or_default(),
                    (cluster_dist[a][m], cluster_dist[b][m]),
                );
                cluster_dist[a][m] = d;
                cluster_dist[m][a] = d;
            }
        }

        let mut clusters = Vec::with_capacity(self.k);
        let mut assignments = vec![0usize; n];
        for (slot, m) in members.iter().enumerate() {
            if let Some(m) = m {
                for &i in m {
                    assignments[i] = clusters.len();
                }
                clusters.push(roots[slot]);
            }
        }

        let centroids = clusters_centroids(table, &assignments, clusters.len());
        Ok(HierarchicalModel {
            linkage: self.linkage,
            distance,
            rows: rows.to_vec(),
            assignments,
            centroids,
            nodes,
            clusters,
        })
    }

    /// Distance between a freshly merged cluster and another cluster.
    ///
    /// `previous` carries the pre-merge distances of the two halves to the
    /// other cluster, which is all single and complete linkage need.
    fn linkage_distance(
        &self,
        table: &Table,
        distance: &Distance,
        pair: &[Vec<f64>],
        merged: &[usize],
        other: &[usize],
        previous: (f64, f64),
    ) -> f64 {
        let (da, db) = previous;
        match self.linkage {
            Linkage::Single => da.min(db),
            Linkage::Complete => da.max(db),
            Linkage::Average => {
                let sum: f64 = merged
                    .iter()
                    .flat_map(|&i| other.iter().map(move |&j| pair[i][j]))
                    .sum();
                sum / (merged.len() * other.len()) as f64
            }
            Linkage::Mean => {
                let all: Vec<usize> = merged.iter().chain(other).copied().collect();
                let mut sum = 0.0;
                let mut count = 0usize;
                for (x, &i) in all.iter().enumerate() {
                    for &j in &all[x + 1..] {
                        sum += pair[i][j];
                        count += 1;
                    }
                }
                if count == 0 {
                    0.0
                } else {
                    sum / count as f64
                }
            }
            Linkage::Centroid => {
                let ca = centroid(table, merged);
                let cb = centroid(table, other);
                distance.distance(&ca, &cb)
            }
            Linkage::Ward => {
                let all: Vec<usize> = merged.iter().chain(other).copied().collect();
                error_sum(table, distance, &all)
                    - error_sum(table, distance, merged)
                    - error_sum(table, distance, other)
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    leaf: Option<usize>,
    children: Option<(usize, usize)>,
    height: f64,
}

impl Node {
    const fn leaf(index: usize) -> Self {
        Self {
            leaf: Some(index),
            children: None,
            height: 0.0,
        }
    }
}

/// The two active clusters with the smallest distance; ties go to the lowest indices.
fn closest_pair(members: &[Option<Vec<usize>>], dist: &[Vec<f64>]) -> Option<(usize, usize, f64)> {
    let active: Vec<usize> = (0..members.len()).filter(|&i| members[i].is_some()).collect();
    let mut best: Option<(usize, usize, f64)> = None;
    for (x, &a) in active.iter().enumerate() {
        for &b in &active[x + 1..] {
            let d = dist[a][b];
            if best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((a, b, d));
            }
        }
    }
    best
}

fn centroid(table: &Table, members: &[usize]) -> Vec<f64> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, kind)| column_summary(*kind, members.iter().map(|&i| table.rows()[i][col])))
        .collect()
}

fn error_sum(table: &Table, distance: &Distance, members: &[usize]) -> f64 {
    let c = centroid(table, members);
    members
        .iter()
        .map(|&i| distance.distance(&table.rows()[i], &c).powi(2))
        .sum()
}

fn clusters_centroids(table: &Table, assignments: &[usize], k: usize) -> Vec<Vec<f64>> {
    (0..k)
        .map(|c| {
            let members: Vec<usize> =
                (0..assignments.len()).filter(|&i| assignments[i] == c).collect();
            centroid(table, &members)
        })
        .collect()
}

/// A fitted cluster hierarchy, cut at `k` clusters.
#[derive(Debug, Clone)]
pub struct HierarchicalModel {
    linkage: Linkage,
    distance: Distance,
    rows: Vec<Vec<f64>>,
    /// Cluster index of every training instance.
    pub assignments: Vec<usize>,
    centroids: Vec<Vec<f64>>,
    nodes: Vec<Node>,
    clusters: Vec<usize>,
}

impl HierarchicalModel {
    pub const fn linkage(&self) -> Linkage {
        self.linkage
    }

    pub const fn distance(&self) -> &Distance {
        &self.distance
    }

    /// Newick text of every cluster tree, one per line.
    ///
    /// Leaves are labelled with the instance index; branch lengths are the
    /// height differences between a node and its parent.
    pub fn newick(&self) -> String {
        self.clusters
            .iter()
            .map(|&root| self.newick_tree(root))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn newick_tree(&self, root: usize) -> String {
        enum Step {
            Enter(usize, f64),
            Comma,
            Close(f64),
        }

        let mut out = String::new();
        let mut stack = vec![Step::Enter(root, f64::NAN)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(idx, parent_height) => {
                    let node = &self.nodes[idx];
                    let branch = parent_height - node.height;
                    match (node.leaf, node.children) {
                        (Some(leaf), _) => {
                            let _ = write!(out, "{leaf}");
                            push_branch(&mut out, branch);
                        }
                        (None, Some((left, right))) => {
                            out.push('(');
                            stack.push(Step::Close(branch));
                            stack.push(Step::Enter(right, node.height));
                            stack.push(Step::Comma);
                            stack.push(Step::Enter(left, node.height));
                        }
                        (None, None) => {}
                    }
                }
                Step::Comma => out.push(','),
                Step::Close(branch) => {
                    out.push(')');
                    push_branch(&mut out, branch);
                }
            }
        }
        out
    }
}

fn push_branch(out: &mut String, branch: f64) {
    if branch.is_finite() {
        let _ = write!(out, ":{}", branch.max(0.0));
    }
}

impl Clusterer for HierarchicalModel {
    fn number_of_clusters(&self) -> usize {
        self.clusters.len()
    }

    fn cluster_instance(&self, row: &[f64]) -> Result<usize> {
        let expected = self.rows.first().map_or(0, Vec::len);
        if row.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: row.len(),
            });
        }

        let k = self.clusters.len();
        let score = |c: usize| -> f64 {
            let dists = self
                .rows
                .iter()
                .zip(&self.assignments)
                .filter(|&(_, &a)| a == c)
                .map(|(r, _)| self.distance.distance(row, r));
            match self.linkage {
                Linkage::Single => dists.fold(f64::INFINITY, f64::min),
                Linkage::Complete => dists.fold(0.0, f64::max),
                Linkage::Average | Linkage::Mean => {
                    let (sum, count) = dists.fold((0.0, 0usize), |(s, n), d| (s + d, n + 1));
                    sum / count.max(1) as f64
                }
                Linkage::Centroid | Linkage::Ward => {
                    self.distance.distance(row, &self.centroids[c])
                }
            }
        };

        let mut best = 0;
        let mut best_score = f64::INFINITY;
        for c in 0..k {
            let s = score(c);
            if s < best_score {
                best = c;
                best_score = s;
            }
        }
        Ok(best)
    }
}
