//! Comparison of the best hits of two conditions
//!
//! Proteins are split into those found only in condition A, only in
//! condition B, and in both. For proteins found in both, the significant and
//! total peptide match counts are compared as `B / A` ratios along with
//! their natural logarithms.
use super::*;

/// A defined `B / A` ratio and its natural logarithm
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ratio {
    pub value: f64,
    pub ln: f64,
}

impl Ratio {
    /// Ratio of two counts, or `None` when either count is zero
    pub fn between(accession: &str, numerator: f64, denominator: f64) -> Result<Option<Ratio>> {
        if numerator == 0.0 || denominator == 0.0 {
            return Ok(None);
        }
        Ratio::new(accession, numerator / denominator).map(Some)
    }

    /// Take the logarithm of a ratio, which must be positive and finite
    pub fn new(accession: &str, value: f64) -> Result<Ratio> {
        if value > 0.0 && value.is_finite() {
            Ok(Ratio {
                value,
                ln: value.ln(),
            })
        } else {
            Err(Error::LogDomain {
                accession: accession.into(),
                ratio: value,
            })
        }
    }
}

/// A protein with a surviving hit in both conditions
#[derive(Clone, Debug, PartialEq)]
pub struct Common<'a> {
    pub a: &'a Hit,
    pub b: &'a Hit,
    /// `B / A` of significant match counts
    pub significant: Option<Ratio>,
    /// `B / A` of total match counts
    pub total: Option<Ratio>,
}

impl<'a> Common<'a> {
    fn new(a: &'a Hit, b: &'a Hit) -> Result<Common<'a>> {
        let significant = Ratio::between(
            &a.accession,
            b.significant_match_count,
            a.significant_match_count,
        )?;
        let total = Ratio::between(
            &a.accession,
            b.total_match_count as f64,
            a.total_match_count as f64,
        )?;
        Ok(Common {
            a,
            b,
            significant,
            total,
        })
    }

    pub fn accession(&self) -> &'a str {
        &self.a.accession
    }
}

/// Partition of two [`BestHitMap`]s into exclusive and shared proteins
///
/// Holds references into both maps; no hit is copied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation<'a> {
    pub only_in_a: Vec<&'a Hit>,
    pub only_in_b: Vec<&'a Hit>,
    pub common: IndexMap<&'a str, Common<'a>>,
}

impl<'a> Reconciliation<'a> {
    /// Compare condition `a` against condition `b`
    ///
    /// Exclusive proteins keep the order of their own map; shared proteins
    /// follow the order of `a`.
    pub fn new(a: &'a BestHitMap, b: &'a BestHitMap) -> Result<Reconciliation<'a>> {
        let mut rec = Reconciliation::default();

        for (acc, hit_a) in a {
            match b.get(acc) {
                Some(hit_b) => {
                    if !rec.common.contains_key(acc.as_str()) {
                        rec.common.insert(acc.as_str(), Common::new(hit_a, hit_b)?);
                    }
                }
                None => rec.only_in_a.push(hit_a),
            }
        }

        rec.only_in_b = b
            .iter()
            .filter(|(acc, _)| !rec.common.contains_key(acc.as_str()))
            .map(|(_, hit)| hit)
            .collect();

        Ok(rec)
    }
}
