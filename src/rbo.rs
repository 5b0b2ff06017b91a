//! Rank-biased overlap between two indefinite rankings.
//!
//! Implements the minimum, residual and extrapolated scores of
//! Webber, Moffat & Zobel (2010), "A similarity measure for indefinite rankings",
//! ACM TOIS 28(4). Uneven list lengths are handled.
//!
//! Known limitation: ties are not supported. Each list is read as a strict
//! ranking, and an identifier repeated inside one list only counts once toward
//! the prefix overlap.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Serialize;

use crate::error::{EvalError, Result};
use crate::model::MetricValue;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RboScores {
    pub rbo_min: f64,
    pub rbo_res: f64,
    pub rbo_ext: f64,
}

impl RboScores {
    pub fn as_row(&self) -> Vec<MetricValue> {
        vec![Some(self.rbo_min), Some(self.rbo_res), Some(self.rbo_ext)]
    }
}

/// Number of distinct identifiers shared by the first `depth` entries of both lists.
pub fn overlap<T: Eq + Hash>(s: &[T], t: &[T], depth: usize) -> usize {
    let left: HashSet<&T> = s.iter().take(depth).collect();
    let right: HashSet<&T> = t.iter().take(depth).collect();
    left.intersection(&right).count()
}

/// Overlap at every depth `1..=max_depth`; entry `d - 1` holds `overlap(s, t, d)`.
fn prefix_overlaps<T: Eq + Hash>(s: &[T], t: &[T], max_depth: usize) -> Vec<usize> {
    let mut seen_s = HashSet::new();
    let mut seen_t = HashSet::new();
    let mut shared = 0usize;
    let mut overlaps = Vec::with_capacity(max_depth);

    for depth in 0..max_depth {
        if let Some(id) = s.get(depth) {
            if seen_s.insert(id) && seen_t.contains(id) {
                shared += 1;
            }
        }
        if let Some(id) = t.get(depth) {
            if seen_t.insert(id) && seen_s.contains(id) {
                shared += 1;
            }
        }
        overlaps.push(shared);
    }

    overlaps
}

fn validate<T>(s: &[T], t: &[T], p: f64) -> Result<()> {
    if s.is_empty() || t.is_empty() {
        return Err(EvalError::value("rbo is undefined for an empty ranking"));
    }
    validate_persistence(p)
}

pub fn validate_persistence(p: f64) -> Result<()> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(EvalError::value(format!(
            "rbo persistence must lie strictly between 0 and 1, got {p}"
        )))
    }
}

/// Longer list first; on equal lengths `t` is treated as the longer one.
fn order_by_length<'a, T>(s: &'a [T], t: &'a [T]) -> (&'a [T], &'a [T]) {
    if s.len() > t.len() { (s, t) } else { (t, s) }
}

/// Lower bound on RBO from the visible prefixes (eq. 11).
///
/// `depth` defaults to the length of the shorter list.
pub fn rbo_min<T: Eq + Hash>(s: &[T], t: &[T], p: f64, depth: Option<usize>) -> Result<f64> {
    validate(s, t, p)?;
    let k = depth.unwrap_or_else(|| s.len().min(t.len()));
    let overlaps = prefix_overlaps(s, t, k);
    let x_k = overlaps.last().copied().unwrap_or(0) as f64;

    let mut sum = 0.0;
    for (index, x_d) in overlaps.iter().enumerate() {
        let d = index + 1;
        sum += (*x_d as f64 - x_k) * p.powi(d as i32) / d as f64;
    }

    Ok((1.0 - p) / p * (sum - x_k * (1.0 - p).ln()))
}

/// Residual RBO mass left unresolved by the visible prefixes (eq. 30).
pub fn rbo_res<T: Eq + Hash>(s: &[T], t: &[T], p: f64) -> Result<f64> {
    validate(s, t, p)?;
    let (long, short) = order_by_length(s, t);
    let l = long.len();
    let s_len = short.len();

    let x_l = overlap(long, short, l);
    let f = l + s_len - x_l;
    let weight = |d: usize| p.powi(d as i32) / d as f64;
    let sum1: f64 = (s_len + 1..=f).map(weight).sum();
    let sum2: f64 = (l + 1..=f).map(weight).sum();
    let sum3: f64 = (1..=f).map(weight).sum();

    Ok(p.powi(s_len as i32) + p.powi(l as i32)
        - p.powi(f as i32)
        - ((1.0 - p) / p
            * (s_len as f64 * sum1
                + l as f64 * sum2
                + x_l as f64 * ((1.0 / (1.0 - p)).ln() - sum3))))
}

/// Point estimate assuming agreement past the shorter list continues uniformly (eq. 32).
pub fn rbo_ext<T: Eq + Hash>(s: &[T], t: &[T], p: f64) -> Result<f64> {
    validate(s, t, p)?;
    let (long, short) = order_by_length(s, t);
    let l = long.len();
    let s_len = short.len();

    let overlaps = prefix_overlaps(long, short, l);
    let x_l = overlaps[l - 1] as f64;
    let x_s = overlaps[s_len - 1] as f64;

    let mut sum1 = 0.0;
    for (index, x_d) in overlaps.iter().enumerate() {
        let d = index + 1;
        sum1 += *x_d as f64 / d as f64 * p.powi(d as i32);
    }
    let mut sum2 = 0.0;
    for d in s_len + 1..=l {
        sum2 += x_s * (d - s_len) as f64 / (s_len * d) as f64 * p.powi(d as i32);
    }

    Ok((1.0 - p) / p * (sum1 + sum2)
        + ((x_l - x_s) / l as f64 + x_s / s_len as f64) * p.powi(l as i32))
}

/// All three scores for one pair of rankings.
pub fn rbo<T: Eq + Hash>(s: &[T], t: &[T], p: f64) -> Result<RboScores> {
    Ok(RboScores {
        rbo_min: rbo_min(s, t, p, None)?,
        rbo_res: rbo_res(s, t, p)?,
        rbo_ext: rbo_ext(s, t, p)?,
    })
}
