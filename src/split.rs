use crate::error::{Result, TriageError};
use crate::types::Category;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Minimum examples per category for a stratified split: one for each side.
pub const MIN_PER_CATEGORY: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Test rows for `n` examples: `ceil(n * test_size)`. The epsilon keeps
/// products like `70 * 0.2` from rounding up past the exact count.
fn test_count(n: usize, test_size: f64) -> usize {
    ((n as f64 * test_size) - 1e-9).ceil().max(0.0) as usize
}

/// Spread `n_test` test rows over groups of `sizes` proportionally. Every
/// group gets at least one test row and keeps at least one training row;
/// leftovers go to the groups furthest below their exact share, first group
/// first on ties.
fn allocate(sizes: &[usize], n_test: usize) -> Vec<usize> {
    let n: usize = sizes.iter().sum();
    let exact: Vec<f64> = sizes
        .iter()
        .map(|&s| s as f64 * n_test as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = sizes
        .iter()
        .zip(&exact)
        .map(|(&s, &e)| (e.floor() as usize).clamp(1, s - 1))
        .collect();
    let deficit = |alloc: &[usize], i: usize| exact[i] - alloc[i] as f64;

    let mut assigned: usize = alloc.iter().sum();
    while assigned < n_test {
        let Some(i) = (0..sizes.len())
            .filter(|&i| alloc[i] + 1 < sizes[i])
            .min_by(|&a, &b| deficit(&alloc[..], b).total_cmp(&deficit(&alloc[..], a)))
        else {
            break;
        };
        alloc[i] += 1;
        assigned += 1;
    }
    while assigned > n_test {
        let Some(i) = (0..sizes.len())
            .filter(|&i| alloc[i] > 1)
            .min_by(|&a, &b| deficit(&alloc[..], a).total_cmp(&deficit(&alloc[..], b)))
        else {
            break;
        };
        alloc[i] -= 1;
        assigned -= 1;
    }
    alloc
}

/// Partition `labels` into train/test index sets keeping each category's
/// proportion. The test side holds exactly `ceil(n * test_size)` rows.
///
/// Fails with `DataInsufficient` when there is nothing to split, when a
/// category has fewer than [`MIN_PER_CATEGORY`] examples, or when either side
/// would be too small to hold one example of every category.
pub fn stratified_split(labels: &[Category], test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if labels.is_empty() {
        return Err(TriageError::DataInsufficient(
            "no labeled texts to split".to_string(),
        ));
    }

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); Category::ALL.len()];
    for (i, c) in labels.iter().enumerate() {
        groups[c.index()].push(i);
    }
    let present: Vec<(Category, Vec<usize>)> = Category::ALL
        .iter()
        .copied()
        .zip(groups)
        .filter(|(_, g)| !g.is_empty())
        .collect();

    for (category, group) in &present {
        if group.len() < MIN_PER_CATEGORY {
            return Err(TriageError::DataInsufficient(format!(
                "category {} has {} example(s); a stratified split needs at least {}",
                category,
                group.len(),
                MIN_PER_CATEGORY
            )));
        }
    }

    let n = labels.len();
    let n_test = test_count(n, test_size);
    let n_train = n - n_test.min(n);
    let k = present.len();
    if n_test < k || n_train < k {
        return Err(TriageError::DataInsufficient(format!(
            "a {:.0}% test split of {} texts gives {} test and {} training rows; \
             both sides need at least one row for each of the {} categories",
            test_size * 100.0,
            n,
            n_test,
            n_train,
            k
        )));
    }

    let sizes: Vec<usize> = present.iter().map(|(_, g)| g.len()).collect();
    let quotas = allocate(&sizes, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for ((_, mut group), n_test) in present.into_iter().zip(quotas) {
        group.shuffle(&mut rng);
        test.extend_from_slice(&group[..n_test]);
        train.extend_from_slice(&group[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok(TrainTestSplit { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[(Category, usize)]) -> Vec<Category> {
        counts
            .iter()
            .flat_map(|(c, n)| std::iter::repeat(*c).take(*n))
            .collect()
    }

    #[test]
    fn keeps_category_proportions() {
        let y = labels(&[(Category::Health, 50), (Category::Security, 20)]);
        let s = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(s.test.len(), 14);
        assert_eq!(s.train.len(), 56);
        let health_test = s.test.iter().filter(|&&i| y[i] == Category::Health).count();
        assert_eq!(health_test, 10);
        // Disjoint and complete.
        let mut all: Vec<usize> = s.train.iter().chain(&s.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        let y = labels(&[(Category::Education, 13), (Category::Environment, 9)]);
        assert_eq!(stratified_split(&y, 0.2, 7).unwrap(), stratified_split(&y, 0.2, 7).unwrap());
    }

    #[test]
    fn small_categories_still_get_a_test_row() {
        let y = labels(&[(Category::Health, 3), (Category::Security, 4)]);
        let s = stratified_split(&y, 0.2, 1).unwrap();
        assert_eq!(s.test.len(), 2);
        assert!(s.test.iter().any(|&i| y[i] == Category::Health));
        assert!(s.test.iter().any(|&i| y[i] == Category::Security));
    }

    #[test]
    fn test_side_matches_the_requested_share() {
        let y = labels(&[
            (Category::Health, 13),
            (Category::Education, 9),
            (Category::Security, 7),
            (Category::Environment, 4),
        ]);
        // ceil(33 * 0.2) = 7
        let s = stratified_split(&y, 0.2, 3).unwrap();
        assert_eq!(s.test.len(), 7);
        assert_eq!(s.train.len(), 26);
        for c in Category::ALL {
            assert!(s.test.iter().any(|&i| y[i] == c), "{c} missing from test");
            assert!(s.train.iter().any(|&i| y[i] == c), "{c} missing from train");
        }
    }

    #[test]
    fn too_few_test_rows_for_every_category_is_insufficient() {
        for per_category in [2, 3] {
            let y: Vec<Category> = Category::ALL
                .iter()
                .flat_map(|&c| std::iter::repeat(c).take(per_category))
                .collect();
            assert!(
                matches!(stratified_split(&y, 0.2, 42), Err(TriageError::DataInsufficient(_))),
                "{per_category} per category should not split at 20%"
            );
        }
    }

    #[test]
    fn too_few_training_rows_is_insufficient() {
        let y = labels(&[(Category::Health, 2), (Category::Security, 2)]);
        assert!(matches!(
            stratified_split(&y, 0.9, 42),
            Err(TriageError::DataInsufficient(_))
        ));
    }

    #[test]
    fn singleton_category_is_insufficient() {
        let y = labels(&[(Category::Health, 10), (Category::Environment, 1)]);
        let err = stratified_split(&y, 0.2, 42).unwrap_err();
        match err {
            TriageError::DataInsufficient(msg) => assert!(msg.contains("Medio Ambiente")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_is_insufficient() {
        assert!(matches!(
            stratified_split(&[], 0.2, 42),
            Err(TriageError::DataInsufficient(_))
        ));
    }
}
