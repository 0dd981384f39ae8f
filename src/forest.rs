//! Random forest of CART trees (Gini impurity) over TF-IDF rows.
//!
//! Every tree is grown on a bootstrap sample, considers a random subset of
//! `sqrt(n_features)` features per split and is grown until its leaves are
//! pure. Trees and bootstrap samples are drawn from one seeded `StdRng`, so
//! the same data and seed always give the same forest.

use crate::classifier::{classes_of, ensure_trainable, TextModel};
use crate::error::Result;
use crate::tfidf::SparseVec;
use crate::types::Category;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Candidate features per split; `None` means `sqrt(n_features)`.
    pub max_features: Option<usize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        dist: [f64; 4],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict(&self, x: &SparseVec) -> &[f64; 4] {
        let mut at = 0usize;
        loop {
            match &self.nodes[at] {
                Node::Leaf { dist } => return dist,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if value_at(x, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

fn value_at(x: &SparseVec, feature: usize) -> f64 {
    match x.binary_search_by(|(j, _)| j.cmp(&feature)) {
        Ok(pos) => x[pos].1,
        Err(_) => 0.0,
    }
}

fn gini(counts: &[usize; 4], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let t = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / t;
            p * p
        })
        .sum::<f64>()
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Builds one tree over column-major dense features.
struct TreeBuilder<'a> {
    columns: &'a [Vec<f64>],
    labels: &'a [usize],
    config: &'a ForestConfig,
    mtry: usize,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn build(&mut self, samples: &[usize], depth: usize, rng: &mut StdRng) -> usize {
        let mut counts = [0usize; 4];
        for &s in samples {
            counts[self.labels[s]] += 1;
        }
        let impurity = gini(&counts, samples.len());
        let depth_reached = self.config.max_depth.map_or(false, |d| depth >= d);

        if impurity == 0.0 || samples.len() < self.config.min_samples_split || depth_reached {
            return self.leaf(&counts, samples.len());
        }

        let Some(split) = self.best_split(samples, impurity, rng) else {
            return self.leaf(&counts, samples.len());
        };

        let (left_s, right_s): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .copied()
            .partition(|&s| self.columns[split.feature][s] <= split.threshold);

        let id = self.nodes.len();
        // Placeholder until the children exist.
        self.nodes.push(Node::Leaf { dist: [0.0; 4] });
        let left = self.build(&left_s, depth + 1, rng);
        let right = self.build(&right_s, depth + 1, rng);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn leaf(&mut self, counts: &[usize; 4], total: usize) -> usize {
        let mut dist = [0.0; 4];
        if total > 0 {
            for (d, &c) in dist.iter_mut().zip(counts) {
                *d = c as f64 / total as f64;
            }
        }
        self.nodes.push(Node::Leaf { dist });
        self.nodes.len() - 1
    }

    /// Examines features in random order until at least `mtry` were tried and
    /// one of them reduces impurity, or every feature was tried.
    fn best_split(&self, samples: &[usize], parent: f64, rng: &mut StdRng) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.columns.len()).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        for (tried, &f) in features.iter().enumerate() {
            if tried >= self.mtry && best.is_some() {
                break;
            }
            if let Some(c) = self.split_on(f, samples) {
                let better = best.as_ref().map_or(true, |b| c.impurity < b.impurity);
                if c.impurity < parent - 1e-12 && better {
                    best = Some(c);
                }
            }
        }
        best
    }

    fn split_on(&self, feature: usize, samples: &[usize]) -> Option<SplitCandidate> {
        let col = &self.columns[feature];
        let mut pairs: Vec<(f64, usize)> = samples.iter().map(|&s| (col[s], self.labels[s])).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        if pairs.first().map(|p| p.0) == pairs.last().map(|p| p.0) {
            return None;
        }

        let n = pairs.len();
        let mut right = [0usize; 4];
        for &(_, l) in &pairs {
            right[l] += 1;
        }
        let mut left = [0usize; 4];
        let mut best: Option<SplitCandidate> = None;
        for i in 0..n - 1 {
            let l = pairs[i].1;
            left[l] += 1;
            right[l] -= 1;
            if pairs[i].0 == pairs[i + 1].0 {
                continue;
            }
            let nl = i + 1;
            let nr = n - nl;
            let weighted = (nl as f64 * gini(&left, nl) + nr as f64 * gini(&right, nr)) / n as f64;
            if best.as_ref().map_or(true, |b| weighted < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (pairs[i].0 + pairs[i + 1].0) / 2.0,
                    impurity: weighted,
                });
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: Vec<Category>,
    trees: Vec<Tree>,
}

impl RandomForest {
    pub fn fit(x: &[SparseVec], y: &[Category], n_features: usize, config: ForestConfig) -> Result<Self> {
        ensure_trainable(x.len(), y.len())?;

        let n = x.len();
        let mut columns = vec![vec![0.0f64; n]; n_features];
        for (i, row) in x.iter().enumerate() {
            for &(j, v) in row {
                columns[j][i] = v;
            }
        }
        let labels: Vec<usize> = y.iter().map(|c| c.index()).collect();
        let mtry = config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features.max(1));

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut trees = Vec::with_capacity(config.n_trees);
        for t in 0..config.n_trees {
            let mut tree_rng = StdRng::seed_from_u64(rng.gen());
            let bootstrap: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();
            let mut builder = TreeBuilder {
                columns: &columns,
                labels: &labels,
                config: &config,
                mtry,
                nodes: Vec::new(),
            };
            builder.build(&bootstrap, 0, &mut tree_rng);
            debug!(tree = t, nodes = builder.nodes.len(), "grew tree");
            trees.push(Tree {
                nodes: builder.nodes,
            });
        }

        Ok(Self {
            classes: classes_of(y),
            trees,
        })
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl TextModel for RandomForest {
    fn predict_proba(&self, x: &SparseVec) -> [f64; 4] {
        let mut acc = [0.0; 4];
        if self.trees.is_empty() {
            return acc;
        }
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.predict(x)) {
                *a += p;
            }
        }
        let n = self.trees.len() as f64;
        for a in &mut acc {
            *a /= n;
        }
        acc
    }
}
