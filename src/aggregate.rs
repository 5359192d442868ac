use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::record::Record;

/// Partition `records` by `key_fn`, then reduce each partition with
/// `reduce_fn`. Output is ordered by key ascending. Members of a group are
/// handed to `reduce_fn` in no guaranteed order.
pub fn group_and_reduce<'a, K, V, KF, RF>(
    records: &'a [Record],
    key_fn: KF,
    reduce_fn: RF,
) -> Result<Vec<(K, V)>>
where
    K: Ord,
    KF: Fn(&Record) -> Result<K>,
    RF: Fn(&[&'a Record]) -> Result<V>,
{
    let mut groups: BTreeMap<K, Vec<&'a Record>> = BTreeMap::new();
    for record in records {
        groups.entry(key_fn(record)?).or_default().push(record);
    }
    groups
        .into_iter()
        .map(|(k, members)| Ok((k, reduce_fn(&members)?)))
        .collect()
}

/// Integer-valued grouping key.
pub fn by_int(field: &str) -> impl Fn(&Record) -> Result<i64> + '_ {
    move |r| r.int(field)
}

pub fn mean(field: &str) -> impl Fn(&[&Record]) -> Result<f64> + '_ {
    move |members| {
        let mut sum = 0.0;
        for r in members {
            sum += r.f64(field)?;
        }
        if members.is_empty() {
            return Err(Error::InsufficientData(format!(
                "mean of `{}` over an empty group",
                field
            )));
        }
        Ok(sum / members.len() as f64)
    }
}

/// `q`-th percentile (0..=100) of a field, interpolating linearly between
/// the two closest ranks.
pub fn percentile(field: &str, q: f64) -> impl Fn(&[&Record]) -> Result<f64> + '_ {
    move |members| {
        let mut values = members
            .iter()
            .map(|r| r.f64(field))
            .collect::<Result<Vec<_>>>()?;
        percentile_of(&mut values, q).ok_or_else(|| {
            Error::InsufficientData(format!("percentile of `{}` over an empty group", field))
        })
    }
}

pub fn concat_lists(field: &str) -> impl Fn(&[&Record]) -> Result<Vec<i64>> + '_ {
    move |members| {
        let mut all = Vec::new();
        for r in members {
            all.extend(r.int_list(field)?);
        }
        Ok(all)
    }
}

pub fn percentile_of(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (q / 100.0).max(0.0).min(1.0) * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(values[lo] + (values[hi] - values[lo]) * (rank - lo as f64))
}

/// Counts per bucket. Bucket `i` holds values in
/// `[boundaries[i], boundaries[i + 1])`; the last bucket is open-ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Histogram {
    pub boundaries: Vec<i64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn from_values(values: &[i64], boundaries: &[i64]) -> Self {
        let mut counts = vec![0; boundaries.len()];
        for &v in values {
            // Number of boundaries <= v; zero means below the first bucket.
            let idx = boundaries.iter().take_while(|&&b| b <= v).count();
            if idx > 0 {
                counts[idx - 1] += 1;
            }
        }
        Self {
            boundaries: boundaries.to_vec(),
            counts,
        }
    }

    pub fn bucket_labels(&self) -> Vec<String> {
        let n = self.boundaries.len();
        self.boundaries
            .iter()
            .enumerate()
            .map(|(i, b)| {
                if i + 1 == n {
                    format!(">={}", b)
                } else {
                    b.to_string()
                }
            })
            .collect()
    }
}
