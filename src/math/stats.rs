//! Small descriptive statistics.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

/// Count distinct values, treating values within `rel_tol` of each other as equal.
pub fn distinct_count(values: &[f64], rel_tol: f64) -> usize {
    let mut v: Vec<f64> = values.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut count = 0usize;
    let mut last: Option<f64> = None;
    for x in v {
        let same = last.is_some_and(|l| (x - l).abs() <= rel_tol * x.abs().max(l.abs()));
        if !same {
            count += 1;
            last = Some(x);
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn distinct_count_collapses_replicates() {
        assert_eq!(distinct_count(&[1.0, 1.0, 2.0, 2.0, 4.0], 1e-12), 3);
        assert_eq!(distinct_count(&[0.0, 0.0], 1e-12), 1);
        assert_eq!(distinct_count(&[], 1e-12), 0);
    }
}
