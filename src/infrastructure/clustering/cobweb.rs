//! Cobweb / Classit incremental conceptual clustering.
//!
//! Instances are added one at a time to a concept tree. At each internal
//! node the instance either joins the best child, starts a new child,
//! causes the two best children to merge, or causes the best child to be
//! split, whichever yields the highest category utility. Nominal
//! attributes use the classic Cobweb utility; numeric attributes use the
//! Classit normal approximation with `acuity` as the minimum standard
//! deviation. When the best utility falls below `cutoff`, the instance is
//! absorbed by the current node and no further structure is grown.
//!
//! Every node of the finished tree is a cluster, numbered in pre-order.

use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{Error, Result};
use super::table::{Column, Table};
use super::traits::Clusterer;

/// `1 / (2 * sqrt(pi))`, the Classit normalising constant.
const NORMAL: f64 = 0.282_094_791_773_878_1;

/// Cobweb configuration.
#[derive(Debug, Clone)]
pub struct Cobweb {
    acuity: f64,
    cutoff: f64,
    seed: u64,
}

impl Default for Cobweb {
    fn default() -> Self {
        Self {
            acuity: 1.0,
            cutoff: 0.01 * NORMAL,
            seed: 42,
        }
    }
}

impl Cobweb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_acuity(mut self, acuity: f64) -> Self {
        self.acuity = acuity;
        self
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Seeded presentation order for `n` instances.
    pub fn presentation_order(&self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.seed));
        order
    }

    /// Start an empty tree for instances with the given columns.
    pub fn start(&self, columns: &[Column]) -> Result<CobwebTree> {
        if !(self.acuity.is_finite() && self.acuity > 0.0) {
            return Err(Error::InvalidParameter {
                name: "acuity",
                message: "must be positive",
            });
        }
        if !self.cutoff.is_finite() {
            return Err(Error::InvalidParameter {
                name: "cutoff",
                message: "must be finite",
            });
        }
        Ok(CobwebTree {
            columns: columns.to_vec(),
            acuity: self.acuity,
            cutoff: self.cutoff,
            nodes: Vec::new(),
            root: None,
            numbers: Vec::new(),
            finished: false,
        })
    }

    /// Batch fit: stream every row in seeded order, then finish.
    pub fn fit(&self, table: &Table) -> Result<CobwebTree> {
        if table.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut tree = self.start(table.columns())?;
        for i in self.presentation_order(table.len()) {
            tree.update(&table.rows()[i])?;
        }
        tree.update_finished();
        Ok(tree)
    }
}

/// Sufficient statistics of the instances below a node.
#[derive(Debug, Clone, PartialEq)]
enum AttrStats {
    Nominal(Vec<f64>),
    Numeric { n: f64, sum: f64, sum_sq: f64 },
}

#[derive(Debug, Clone, PartialEq)]
struct Stats {
    count: f64,
    attrs: Vec<AttrStats>,
}

impl Stats {
    fn empty(columns: &[Column]) -> Self {
        Self {
            count: 0.0,
            attrs: columns
                .iter()
                .map(|c| match c {
                    Column::Nominal(card) => AttrStats::Nominal(vec![0.0; *card]),
                    Column::Numeric => AttrStats::Numeric {
                        n: 0.0,
                        sum: 0.0,
                        sum_sq: 0.0,
                    },
                })
                .collect(),
        }
    }

    fn of(columns: &[Column], row: &[f64]) -> Self {
        let mut s = Self::empty(columns);
        s.add(row, 1.0);
        s
    }

    /// Add (`sign = 1`) or remove (`sign = -1`) one instance.
    fn add(&mut self, row: &[f64], sign: f64) {
        self.count += sign;
        for (stat, &v) in self.attrs.iter_mut().zip(row) {
            if v.is_nan() {
                continue;
            }
            match stat {
                AttrStats::Nominal(counts) => {
                    if let Some(c) = counts.get_mut(v as usize) {
                        *c += sign;
                    }
                }
                AttrStats::Numeric { n, sum, sum_sq } => {
                    *n += sign;
                    *sum += sign * v;
                    *sum_sq += sign * v * v;
                }
            }
        }
    }

    fn with(&self, row: &[f64]) -> Self {
        let mut s = self.clone();
        s.add(row, 1.0);
        s
    }

    fn merged(&self, other: &Self) -> Self {
        let mut s = self.clone();
        s.count += other.count;
        for (a, b) in s.attrs.iter_mut().zip(&other.attrs) {
            match (a, b) {
                (AttrStats::Nominal(x), AttrStats::Nominal(y)) => {
                    for (xi, yi) in x.iter_mut().zip(y) {
                        *xi += yi;
                    }
                }
                (
                    AttrStats::Numeric { n, sum, sum_sq },
                    AttrStats::Numeric {
                        n: n2,
                        sum: s2,
                        sum_sq: q2,
                    },
                ) => {
                    *n += n2;
                    *sum += s2;
                    *sum_sq += q2;
                }
                _ => {}
            }
        }
        s
    }

    /// Expected number of correctly guessed attribute values (Classit form for numerics).
    fn score(&self, acuity: f64) -> f64 {
        self.attrs
            .iter()
            .map(|a| match a {
                AttrStats::Nominal(counts) => {
                    if self.count <= 0.0 {
                        0.0
                    } else {
                        counts.iter().map(|c| (c / self.count).powi(2)).sum()
                    }
                }
                AttrStats::Numeric { n, sum, sum_sq } => {
                    let std = if *n < 2.0 {
                        0.0
                    } else {
                        let mean = sum / n;
                        (sum_sq / n - mean * mean).max(0.0).sqrt()
                    };
                    NORMAL / std.max(acuity)
                }
            })
            .sum()
    }
}

/// Category utility of partitioning `parent` into `children`.
fn category_utility(parent: &Stats, children: &[&Stats], acuity: f64) -> f64 {
    if children.is_empty() || parent.count <= 0.0 {
        return 0.0;
    }
    let base = parent.score(acuity);
    let total: f64 = children
        .iter()
        .map(|c| (c.count / parent.count) * (c.score(acuity) - base))
        .sum();
    total / children.len() as f64
}

#[derive(Debug, Clone)]
struct Node {
    stats: Stats,
    children: Vec<usize>,
}

/// Where an instance goes next while descending the tree.
enum Placement {
    Descend(usize),
    Stop,
}

/// A Cobweb concept tree.
#[derive(Debug, Clone)]
pub struct CobwebTree {
    columns: Vec<Column>,
    acuity: f64,
    cutoff: f64,
    nodes: Vec<Node>,
    root: Option<usize>,
    /// Pre-order cluster number per arena node, set by `update_finished`.
    numbers: Vec<Option<usize>>,
    finished: bool,
}

impl CobwebTree {
    pub const fn acuity(&self) -> f64 {
        self.acuity
    }

    pub const fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Total instances seen.
    pub fn instance_count(&self) -> usize {
        self.root.map_or(0, |r| self.nodes[r].stats.count as usize)
    }

    fn push(&mut self, stats: Stats, children: Vec<usize>) -> usize {
        self.nodes.push(Node { stats, children });
        self.nodes.len() - 1
    }

    /// Incorporate one more instance.
    pub fn update(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::DimensionMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.finished = false;

        let Some(mut current) = self.root else {
            let root = self.push(Stats::of(&self.columns, row), Vec::new());
            self.root = Some(root);
            return Ok(());
        };

        loop {
            if self.nodes[current].children.is_empty() {
                self.grow_leaf(current, row);
                return Ok(());
            }
            match self.place(current, row) {
                Placement::Descend(next) => current = next,
                Placement::Stop => return Ok(()),
            }
        }
    }

    /// Turn a leaf into a parent of its old contents and the new instance.
    fn grow_leaf(&mut self, leaf: usize, row: &[f64]) {
        let old = self.nodes[leaf].stats.clone();
        let fresh = Stats::of(&self.columns, row);
        let parent = old.with(row);
        let cu = category_utility(&parent, &[&old, &fresh], self.acuity);
        self.nodes[leaf].stats = parent;
        if cu >= self.cutoff {
            let a = self.push(old, Vec::new());
            let b = self.push(fresh, Vec::new());
            self.nodes[leaf].children = vec![a, b];
        }
    }

    /// Choose among join / new child / merge / split at an internal node.
    fn place(&mut self, node: usize, row: &[f64]) -> Placement {
        self.nodes[node].stats.add(row, 1.0);
        let parent = self.nodes[node].stats.clone();
        let children = self.nodes[node].children.clone();
        let stats: Vec<Stats> = children.iter().map(|&c| self.nodes[c].stats.clone()).collect();

        // Joining each existing child.
        let mut ranked: Vec<(usize, f64)> = (0..children.len())
            .map(|i| {
                let joined = stats[i].with(row);
                let refs: Vec<&Stats> = stats
                    .iter()
                    .enumerate()
                    .map(|(j, s)| if j == i { &joined } else { s })
                    .collect();
                (i, category_utility(&parent, &refs, self.acuity))
            })
            .collect();
        ranked.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
        let (best, best_cu) = ranked[0];

        // A new singleton child.
        let singleton = Stats::of(&self.columns, row);
        let new_cu = {
            let mut refs: Vec<&Stats> = stats.iter().collect();
            refs.push(&singleton);
            category_utility(&parent, &refs, self.acuity)
        };

        // Merging the two best children and joining the result.
        let merge = ranked.get(1).map(|&(second, _)| {
            let merged = stats[best].merged(&stats[second]).with(row);
            let mut refs: Vec<&Stats> = stats
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != best && *j != second)
                .map(|(_, s)| s)
                .collect();
            refs.push(&merged);
            (second, category_utility(&parent, &refs, self.acuity))
        });

        // Splitting the best child into its children.
        let best_node = children[best];
        let split_cu = (!self.nodes[best_node].children.is_empty()).then(|| {
            let mut refs: Vec<&Stats> = stats
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != best)
                .map(|(_, s)| s)
                .collect();
            for &g in &self.nodes[best_node].children {
                refs.push(&self.nodes[g].stats);
            }
            category_utility(&parent, &refs, self.acuity)
        });

        let merge_cu = merge.map_or(f64::NEG_INFINITY, |(_, cu)| cu);
        let split_cu = split_cu.unwrap_or(f64::NEG_INFINITY);
        let top = best_cu.max(new_cu).max(merge_cu).max(split_cu);

        if top < self.cutoff {
            return Placement::Stop;
        }
        if best_cu >= new_cu && best_cu >= merge_cu && best_cu >= split_cu {
            return Placement::Descend(best_node);
        }
        if new_cu >= merge_cu && new_cu >= split_cu {
            let leaf = self.push(singleton, Vec::new());
            self.nodes[node].children.push(leaf);
            return Placement::Stop;
        }
        if let Some((second, _)) = merge.filter(|_| merge_cu >= split_cu) {
            let second_node = children[second];
            let merged_stats = stats[best].merged(&stats[second]);
            let merged = self.push(merged_stats, vec![best_node, second_node]);
            let kids = &mut self.nodes[node].children;
            kids.retain(|&c| c != best_node && c != second_node);
            kids.push(merged);
            return Placement::Descend(merged);
        }

        // Split, then retry placement at this node with the instance withdrawn.
        let grandchildren = self.nodes[best_node].children.clone();
        let kids = &mut self.nodes[node].children;
        kids.retain(|&c| c != best_node);
        kids.extend(grandchildren);
        self.nodes[node].stats.add(row, -1.0);
        self.place(node, row)
    }

    /// Number the clusters. Call once all instances have been added.
    pub fn update_finished(&mut self) {
        self.numbers = vec![None; self.nodes.len()];
        let mut next = 0;
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            self.numbers[idx] = Some(next);
            next += 1;
            stack.extend(self.nodes[idx].children.iter().rev());
        }
        self.finished = true;
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Graphviz rendering of the numbered tree.
    pub fn graph(&self) -> String {
        let mut out = String::from("digraph CobwebTree {\n");
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            let num = self.number(idx);
            let count = node.stats.count as usize;
            if node.children.is_empty() {
                let _ = writeln!(
                    out,
                    "N{num} [label=\"leaf {num} ({count})\" shape=box style=filled ]"
                );
            } else {
                let _ = writeln!(out, "N{num} [label=\"node {num} ({count})\" ]");
                for &c in &node.children {
                    let _ = writeln!(out, "N{num}->N{}", self.number(c));
                }
            }
            stack.extend(node.children.iter().rev());
        }
        out.push('}');
        out
    }

    fn number(&self, idx: usize) -> usize {
        self.numbers.get(idx).copied().flatten().unwrap_or(idx)
    }

    /// Descend without changing the tree, as in a membership query.
    fn frozen_host(&self, node: usize, row: &[f64]) -> Option<usize> {
        let parent = self.nodes[node].stats.with(row);
        let stats: Vec<&Stats> = self.nodes[node]
            .children
            .iter()
            .map(|&c| &self.nodes[c].stats)
            .collect();

        let mut best: Option<(usize, f64)> = None;
        for i in 0..stats.len() {
            let joined = stats[i].with(row);
            let refs: Vec<&Stats> = stats
                .iter()
                .enumerate()
                .map(|(j, s)| if j == i { &joined } else { *s })
                .collect();
            let cu = category_utility(&parent, &refs, self.acuity);
            if best.is_none_or(|(_, b)| cu > b) {
                best = Some((i, cu));
            }
        }

        let singleton = Stats::of(&self.columns, row);
        let mut refs = stats.clone();
        refs.push(&singleton);
        let new_cu = category_utility(&parent, &refs, self.acuity);

        match best {
            Some((i, cu)) if cu >= new_cu => Some(self.nodes[node].children[i]),
            _ => None,
        }
    }
}

impl Clusterer for CobwebTree {
    fn number_of_clusters(&self) -> usize {
        if self.finished {
            self.numbers.iter().flatten().count()
        } else {
            0
        }
    }

    fn cluster_instance(&self, row: &[f64]) -> Result<usize> {
        if row.len() != self.columns.len() {
            return Err(Error::DimensionMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        let mut host = self.root.ok_or(Error::EmptyInput)?;
        while !self.nodes[host].children.is_empty() {
            match self.frozen_host(host, row) {
                Some(next) => host = next,
                None => break,
            }
        }
        Ok(self.number(host))
    }
}
