use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
/// Protein-level values of a peptide match that passed the quality cutoffs
pub struct Hit {
    /// 1-based protein rank within the result file
    pub hit_rank: u32,
    pub accession: String,
    pub description: String,
    pub score: f64,
    pub mass: i64,
    /// Number of peptide matches above the significance threshold
    pub significant_match_count: f64,
    pub total_match_count: i64,
}

/// Does a candidate with `score` replace the current best hit?
///
/// Only a strictly higher score replaces, so among equally scored hits the
/// first one encountered is kept.
#[inline]
pub(crate) fn replaces(current: Option<&Hit>, score: f64) -> bool {
    current.map_or(true, |best| score > best.score)
}

/// The highest scoring surviving [`Hit`] of every protein in one result file
///
/// Proteins are kept in order of their first appearance in the file.
/// Proteins without a surviving hit have no entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BestHitMap {
    pub(crate) hits: IndexMap<String, Hit>,
}

impl BestHitMap {
    /// Parse a result file and keep the best surviving hit for each protein
    pub fn load<P: AsRef<Path>>(path: P, config: &ParseConfig) -> Result<BestHitMap> {
        let parser = HitParser::open(path.as_ref(), config.clone())?;
        let map = parser.best_hits();
        debug!(
            "{}: {} proteins with a surviving hit",
            path.as_ref().display(),
            map.len()
        );
        Ok(map)
    }

    pub fn get(&self, accession: &str) -> Option<&Hit> {
        self.hits.get(accession)
    }

    pub fn contains(&self, accession: &str) -> bool {
        self.hits.contains_key(accession)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn accessions(&self) -> impl Iterator<Item = &str> {
        self.hits.keys().map(String::as_str)
    }

    pub fn hits(&self) -> impl Iterator<Item = &Hit> {
        self.hits.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Hit> {
        self.hits.iter()
    }
}

impl<'a> IntoIterator for &'a BestHitMap {
    type Item = (&'a String, &'a Hit);
    type IntoIter = indexmap::map::Iter<'a, String, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Collect already-filtered hits, keeping the best one per accession
impl FromIterator<Hit> for BestHitMap {
    fn from_iter<I: IntoIterator<Item = Hit>>(iter: I) -> Self {
        let mut hits: IndexMap<String, Hit> = IndexMap::new();
        for hit in iter {
            match hits.get_mut(&hit.accession) {
                Some(best) => {
                    if replaces(Some(best), hit.score) {
                        *best = hit;
                    }
                }
                None => {
                    hits.insert(hit.accession.clone(), hit);
                }
            }
        }
        BestHitMap { hits }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! hit {
        ($acc:expr, $score:expr) => {
            Hit {
                accession: $acc.into(),
                score: $score,
                ..Hit::default()
            }
        };
        ($acc:expr, $score:expr, $rank:expr) => {
            Hit {
                accession: $acc.into(),
                score: $score,
                hit_rank: $rank,
                ..Hit::default()
            }
        };
    }

    #[test]
    fn keeps_maximum_score() {
        let map = vec![hit!("P1", 10.0), hit!("P1", 25.5), hit!("P1", 19.0)]
            .into_iter()
            .collect::<BestHitMap>();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("P1").map(|h| h.score), Some(25.5));
    }

    #[test]
    fn ties_keep_first() {
        let map = vec![hit!("P1", 20.0, 1), hit!("P1", 20.0, 2)]
            .into_iter()
            .collect::<BestHitMap>();
        assert_eq!(map.get("P1").map(|h| h.hit_rank), Some(1));
    }

    #[test]
    fn first_appearance_order() {
        let map = vec![
            hit!("Q3", 1.0),
            hit!("Q1", 1.0),
            hit!("Q3", 5.0),
            hit!("Q2", 1.0),
        ]
        .into_iter()
        .collect::<BestHitMap>();
        assert_eq!(map.accessions().collect::<Vec<_>>(), vec!["Q3", "Q1", "Q2"]);
        assert!(map.contains("Q2"));
        assert!(!map.contains("Q4"));
    }

    #[test]
    fn replacement_rule() {
        let best = hit!("P1", 10.0);
        assert!(replaces(None, 0.0));
        assert!(replaces(Some(&best), 10.5));
        assert!(!replaces(Some(&best), 10.0));
        assert!(!replaces(Some(&best), 9.0));
    }
}
