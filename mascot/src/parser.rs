//! Structs and methods for reading Mascot protein hit exports
//!
//! The export is a delimited table (`|` by default) preceded by a preamble of
//! search parameters. A data section starts at a header row naming the
//! `prot_*` and `pep_*` columns and holds one row per peptide match, so a
//! protein spans several rows. Headers may repeat further down the file,
//! and column positions are re-resolved every time one does.
use super::*;
use memchr::{memchr, memchr_iter, Memchr};
use std::borrow::Cow;
use std::io::prelude::*;

/// Generalized wrapper around [`Memchr`] iterator for splitting `&[u8]` slices
/// by a byte.
struct Pitchfork<'a> {
    pos: usize,
    haystack: &'a [u8],
    inner: Memchr<'a>,
}

impl<'a> Pitchfork<'a> {
    pub fn new(needle: u8, haystack: &'a [u8]) -> Self {
        Self {
            pos: 0,
            haystack,
            inner: memchr_iter(needle, haystack),
        }
    }
}

impl<'a> Iterator for Pitchfork<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let end = match self.inner.next() {
            Some(e) => e,
            None => {
                if self.pos < self.haystack.len() {
                    self.haystack.len()
                } else {
                    return None;
                }
            }
        };
        let slice = &self.haystack[self.pos..end];
        self.pos = end + 1;
        Some(slice)
    }
}

/// Split a row into fields, honoring double-quoted fields
///
/// Unlike [`Pitchfork`], empty trailing fields are kept so that column
/// positions line up with the header.
fn split_fields(line: &[u8], delimiter: u8) -> Vec<Cow<'_, str>> {
    if memchr(b'"', line).is_none() {
        return line
            .split(|&b| b == delimiter)
            .map(String::from_utf8_lossy)
            .collect();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(line);
    let mut record = csv::ByteRecord::new();
    match reader.read_byte_record(&mut record) {
        Ok(true) => record
            .iter()
            .map(|field| Cow::Owned(String::from_utf8_lossy(field).into_owned()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Parser settings shared by both conditions of a comparison
#[derive(Clone, Debug, PartialEq)]
pub struct ParseConfig {
    /// Field delimiter of the export
    pub delimiter: u8,
    /// Largest `pep_expect` a match may have
    pub expectancy_cutoff: f64,
    /// Smallest `pep_score` a match may have
    pub score_cutoff: f64,
}

impl ParseConfig {
    pub const DEFAULT_DELIMITER: u8 = b'|';

    pub fn new(expectancy_cutoff: f64, score_cutoff: f64) -> Self {
        ParseConfig {
            delimiter: Self::DEFAULT_DELIMITER,
            expectancy_cutoff,
            score_cutoff,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Does a peptide match pass both quality cutoffs?
    #[inline]
    pub fn admits(&self, expectancy: f64, peptide_score: f64) -> bool {
        expectancy <= self.expectancy_cutoff && peptide_score >= self.score_cutoff
    }
}

/// Column positions resolved from a header row
#[derive(Copy, Clone, Debug, PartialEq)]
struct Columns {
    hit_rank: usize,
    accession: usize,
    description: usize,
    score: usize,
    mass: usize,
    matches: usize,
    matches_sig: usize,
    expectancy: usize,
    peptide_score: usize,
}

impl Columns {
    /// Rows naming at least two `prot_*`/`pep_*` columns are headers of
    /// some section, whether or not it is a protein hit section
    fn is_header(fields: &[Cow<'_, str>]) -> bool {
        fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| {
                (f.starts_with("prot_") || f.starts_with("pep_"))
                    && f.bytes()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
            })
            .count()
            >= 2
    }

    fn resolve(fields: &[Cow<'_, str>]) -> Option<Columns> {
        let find = |name: &str| fields.iter().position(|f| f.trim() == name);
        Some(Columns {
            hit_rank: find("prot_hit_num")?,
            accession: find("prot_acc")?,
            description: find("prot_desc")?,
            score: find("prot_score")?,
            mass: find("prot_mass")?,
            matches: find("prot_matches")?,
            matches_sig: find("prot_matches_sig")?,
            expectancy: find("pep_expect")?,
            peptide_score: find("pep_score")?,
        })
    }

    /// Minimum number of fields a data row needs
    fn width(&self) -> usize {
        [
            self.hit_rank,
            self.accession,
            self.description,
            self.score,
            self.mass,
            self.matches,
            self.matches_sig,
            self.expectancy,
            self.peptide_score,
        ]
        .iter()
        .max()
        .map_or(0, |&idx| idx + 1)
    }
}

/// Protein-level columns of a data row, kept as raw text until a
/// [`Hit`] is materialized
#[derive(Clone, Debug, Default)]
struct ProteinFields<'a> {
    hit_rank: Cow<'a, str>,
    accession: Cow<'a, str>,
    description: Cow<'a, str>,
    score: Cow<'a, str>,
    mass: Cow<'a, str>,
    matches: Cow<'a, str>,
    matches_sig: Cow<'a, str>,
}

/// One peptide match row of the export
#[derive(Clone, Debug)]
pub struct Record<'a> {
    protein: ProteinFields<'a>,
    pub expectancy: f64,
    pub peptide_score: f64,
}

impl<'a> Record<'a> {
    pub fn accession(&self) -> &str {
        self.protein.accession.trim()
    }

    /// Protein score of the match
    pub fn score(&self) -> f64 {
        coerce(&self.protein.score)
    }

    pub fn to_hit(&self) -> Hit {
        Hit {
            hit_rank: coerce(&self.protein.hit_rank),
            accession: self.accession().into(),
            description: self.protein.description.trim().into(),
            score: self.score(),
            mass: coerce(&self.protein.mass),
            significant_match_count: coerce(&self.protein.matches_sig),
            total_match_count: coerce(&self.protein.matches),
        }
    }
}

/// Iterator over every data row of an export, surviving or not
pub struct Records<'a> {
    lines: Pitchfork<'a>,
    delimiter: u8,
    columns: Option<Columns>,
    previous: Option<ProteinFields<'a>>,
    /// Rows inside a data section that could not be read
    pub skipped: usize,
}

impl<'a> Records<'a> {
    fn new(buffer: &'a [u8], delimiter: u8) -> Self {
        Records {
            lines: Pitchfork::new(b'\n', buffer),
            delimiter,
            columns: None,
            previous: None,
            skipped: 0,
        }
    }

    fn read(&mut self, line: &'a [u8]) -> Option<Record<'a>> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        let mut fields = split_fields(line, self.delimiter);
        if Columns::is_header(&fields) {
            self.columns = Columns::resolve(&fields);
            self.previous = None;
            if self.columns.is_none() && fields.iter().any(|f| f.trim() == "prot_acc") {
                warn!("Header row is missing required protein hit columns; skipping its section");
            }
            return None;
        }

        // Preamble, or a section we do not read
        let columns = self.columns?;
        if fields.len() < columns.width() {
            self.skipped += 1;
            return None;
        }

        let protein = if fields[columns.accession].trim().is_empty() {
            // Continuation row: protein columns are only written on the
            // first row of each protein
            match &self.previous {
                Some(previous) => previous.clone(),
                None => {
                    self.skipped += 1;
                    return None;
                }
            }
        } else {
            let take = |fields: &mut Vec<Cow<'a, str>>, idx: usize| std::mem::take(&mut fields[idx]);
            let protein = ProteinFields {
                hit_rank: take(&mut fields, columns.hit_rank),
                accession: take(&mut fields, columns.accession),
                description: take(&mut fields, columns.description),
                score: take(&mut fields, columns.score),
                mass: take(&mut fields, columns.mass),
                matches: take(&mut fields, columns.matches),
                matches_sig: take(&mut fields, columns.matches_sig),
            };
            self.previous = Some(protein.clone());
            protein
        };

        Some(Record {
            protein,
            expectancy: coerce(&fields[columns.expectancy]),
            peptide_score: coerce(&fields[columns.peptide_score]),
        })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            if let Some(record) = self.read(line) {
                return Some(record);
            }
        }
        None
    }
}

/// Distinct protein accessions in order of first appearance
pub struct Proteins<'a> {
    records: Records<'a>,
    seen: HashSet<String>,
}

impl<'a> Iterator for Proteins<'a> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        for record in &mut self.records {
            let acc = record.accession();
            if !self.seen.contains(acc) {
                self.seen.insert(acc.to_string());
                return Some(acc.to_string());
            }
        }
        None
    }
}

/// A Mascot export loaded into memory, bound to a pair of quality cutoffs
pub struct HitParser {
    buffer: Vec<u8>,
    config: ParseConfig,
}

impl HitParser {
    /// Read a result file into memory. Nothing is parsed until the file
    /// is iterated
    pub fn open<P: AsRef<Path>>(path: P, config: ParseConfig) -> Result<HitParser> {
        let path = path.as_ref();
        let mut buffer = Vec::new();
        fs::File::open(path)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .map_err(|source| Error::Input {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(HitParser::from_bytes(buffer, config))
    }

    pub fn from_bytes(buffer: Vec<u8>, config: ParseConfig) -> HitParser {
        HitParser { buffer, config }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Every data row, regardless of the cutoffs
    pub fn records(&self) -> Records<'_> {
        Records::new(&self.buffer, self.config.delimiter)
    }

    /// Data rows passing both cutoffs
    pub fn surviving(&self) -> impl Iterator<Item = Record<'_>> {
        let config = &self.config;
        self.records()
            .filter(move |r| config.admits(r.expectancy, r.peptide_score))
    }

    /// Lazily yield each protein accession in the file once, in order of
    /// first appearance. Every call scans the file again.
    pub fn proteins(&self) -> Proteins<'_> {
        Proteins {
            records: self.records(),
            seen: HashSet::new(),
        }
    }

    /// Highest scoring hit for `accession` among rows passing the cutoffs
    ///
    /// Equal scores keep the first row encountered.
    pub fn best_surviving_hit(&self, accession: &str) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for record in self.surviving().filter(|r| r.accession() == accession) {
            if replaces(best.as_ref(), record.score()) {
                best = Some(record.to_hit());
            }
        }
        best
    }

    /// Collect the best surviving hit of every protein in a single scan
    ///
    /// Equivalent to calling [`HitParser::best_surviving_hit`] for each
    /// accession yielded by [`HitParser::proteins`].
    pub fn best_hits(&self) -> BestHitMap {
        let mut slots: IndexMap<String, Option<Hit>> = IndexMap::new();
        let mut records = self.records();
        for record in &mut records {
            let admitted = self.config.admits(record.expectancy, record.peptide_score);
            match slots.get_mut(record.accession()) {
                Some(slot) => {
                    if admitted && replaces(slot.as_ref(), record.score()) {
                        *slot = Some(record.to_hit());
                    }
                }
                None => {
                    let hit = if admitted { Some(record.to_hit()) } else { None };
                    slots.insert(record.accession().to_string(), hit);
                }
            }
        }

        if records.skipped > 0 {
            debug!("skipped {} unreadable rows", records.skipped);
        }

        BestHitMap {
            hits: slots
                .into_iter()
                .filter_map(|(acc, hit)| Some((acc, hit?)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "prot_hit_num|prot_acc|prot_desc|prot_score|prot_mass|prot_matches|prot_matches_sig|pep_query|pep_expect|pep_score|pep_seq";

    const PREAMBLE: &str = "Header\n\
        --------------------------------------------------------\n\
        \n\
        Search title|F001738 KO-ALL\n\
        Database|SwissProt 2014_04 (545388 sequences)\n\
        Significance threshold p<|0.05\n\
        \n\
        Protein hits\n\
        --------------------------------------------------------\n\
        \n";

    fn parser(rows: &[&str], expectancy_cutoff: f64, score_cutoff: f64) -> HitParser {
        let mut body = String::from(PREAMBLE);
        body.push_str(HEADER);
        body.push('\n');
        for row in rows {
            body.push_str(row);
            body.push('\n');
        }
        HitParser::from_bytes(
            body.into_bytes(),
            ParseConfig::new(expectancy_cutoff, score_cutoff),
        )
    }

    /// Rebuild the map the slow way, one protein at a time
    fn per_protein(parser: &HitParser) -> BestHitMap {
        BestHitMap {
            hits: parser
                .proteins()
                .filter_map(|acc| {
                    let hit = parser.best_surviving_hit(&acc)?;
                    Some((acc, hit))
                })
                .collect(),
        }
    }

    #[test]
    fn pitchfork() {
        let input = "hello\nworld\nfield\n1111\n";
        let mut pitch = Pitchfork::new(b'\n', input.as_bytes());
        assert_eq!(pitch.next().unwrap(), "hello".as_bytes());
        assert_eq!(pitch.next().unwrap(), "world".as_bytes());
        assert_eq!(pitch.next().unwrap(), "field".as_bytes());
        assert_eq!(pitch.next().unwrap(), "1111".as_bytes());
        assert_eq!(pitch.next(), None);
    }

    #[test]
    fn fields() {
        assert_eq!(split_fields(b"a|b||d|", b'|'), vec!["a", "b", "", "d", ""]);
        assert_eq!(
            split_fields(br#"1,"Protein, isoform 2","""quoted"" x",4"#, b','),
            vec!["1", "Protein, isoform 2", "\"quoted\" x", "4"]
        );
        assert_eq!(
            split_fields(br#"P1|"GN=A|B"|""|"#, b'|'),
            vec!["P1", "GN=A|B", "", ""]
        );
        assert_eq!(split_fields(br#""a|b"|c"#, b'|'), vec!["a|b", "c"]);
    }

    #[test]
    fn maximum_score_wins() {
        let p = parser(
            &[
                "1|P1|Protein one GN=ONE|10.0|50000|3|2|1|0.01|40|PEPTIDEK",
                "1|P1|Protein one GN=ONE|25.5|50000|3|2|2|0.02|35|PEPTIDER",
                "1|P1|Protein one GN=ONE|19.0|50000|3|2|3|0.03|30|PEPTIDES",
            ],
            0.05,
            20.0,
        );
        let hit = p.best_surviving_hit("P1").unwrap();
        assert_eq!(hit.score, 25.5);
        assert_eq!(hit.hit_rank, 1);
        assert_eq!(hit.mass, 50000);
        assert_eq!(hit.total_match_count, 3);
        assert_eq!(hit.significant_match_count, 2.0);
        assert_eq!(hit.description, "Protein one GN=ONE");
        assert_eq!(p.best_surviving_hit("P2"), None);
    }

    #[test]
    fn cutoffs_exclude_matches() {
        let p = parser(
            &[
                // fails expectancy, even though it has the best score
                "1|P1|Protein one|50|100|4|2|1|0.5|60|AAAK",
                "1|P1|Protein one|30|100|4|2|2|0.01|40|CCCK",
                // fails peptide score
                "2|P2|Protein two|99|200|1|1|3|0.001|10|DDDK",
                // exactly on both cutoffs
                "3|P3|Protein three|12|300|1|1|4|0.05|20|EEEK",
            ],
            0.05,
            20.0,
        );
        let map = p.best_hits();
        assert_eq!(map.get("P1").map(|h| h.score), Some(30.0));
        assert!(!map.contains("P2"));
        assert!(map.contains("P3"));
        for record in p.surviving() {
            assert!(record.expectancy <= 0.05);
            assert!(record.peptide_score >= 20.0);
        }
        assert_eq!(p.surviving().count(), 2);
    }

    #[test]
    fn proteins_are_distinct_and_restartable() {
        let p = parser(
            &[
                "1|P1|one|30|1|1|1|1|0.01|40|A",
                "2|P2|two|20|1|1|1|2|9.0|40|B",
                "1|P1|one|30|1|1|1|3|0.01|40|C",
                "3|P3|three|10|1|1|1|4|0.01|40|D",
            ],
            1.0,
            0.0,
        );
        let first = p.proteins().collect::<Vec<_>>();
        assert_eq!(first, vec!["P1", "P2", "P3"]);
        assert_eq!(p.proteins().collect::<Vec<_>>(), first);
        // P2 appears in the file but has no surviving hit
        assert_eq!(
            p.best_hits().accessions().collect::<Vec<_>>(),
            vec!["P1", "P3"]
        );
    }

    #[test]
    fn single_scan_matches_per_protein_queries() {
        let p = parser(
            &[
                "2|P2|two|5|1|1|1|1|9.0|40|A",
                "1|P1|one|30|1|1|1|2|0.01|40|B",
                "2|P2|two|7|1|1|1|3|0.01|40|C",
                "1|P1|one|31|1|1|1|4|0.01|10|D",
                "3|P3|three|1|1|1|1|5|0.01|10|E",
            ],
            1.0,
            20.0,
        );
        let map = p.best_hits();
        assert_eq!(map, per_protein(&p));
        assert_eq!(map.accessions().collect::<Vec<_>>(), vec!["P2", "P1"]);
        // Idempotent: no state survives between scans
        assert_eq!(p.best_hits(), map);
    }

    #[test]
    fn repeated_and_reordered_headers() {
        let p = parser(
            &[
                "1|P1|one|30|100|4|2|1|0.01|40|AAAK",
                HEADER,
                "2|P2|two|20|200|5|2|2|0.01|40|CCCK",
                "",
                "pep_seq|pep_score|pep_expect|prot_matches_sig|prot_matches|prot_mass|prot_score|prot_desc|prot_acc|prot_hit_num",
                "DDDK|45|0.02|6|9|300|17.5|three|P3|3",
            ],
            1.0,
            0.0,
        );
        let map = p.best_hits();
        assert_eq!(map.len(), 3);
        let p3 = map.get("P3").unwrap();
        assert_eq!(p3.hit_rank, 3);
        assert_eq!(p3.score, 17.5);
        assert_eq!(p3.mass, 300);
        assert_eq!(p3.total_match_count, 9);
        assert_eq!(p3.significant_match_count, 6.0);
    }

    #[test]
    fn unread_sections_and_short_rows() {
        let p = parser(
            &[
                "1|P1|one|30|100|4|2|1|0.01|40|AAAK",
                "1|P1|truncated",
                "Peptide matches not assigned to protein hits",
                "pep_query|pep_rank|pep_exp_mz|pep_expect|pep_score|pep_seq",
                "5|1|500.2|0.001|60|XXXK",
                "7|P7|looks like a hit|99|1|1|1|1|0.001|60|YYYK",
            ],
            1.0,
            0.0,
        );
        let mut records = p.records();
        assert_eq!(records.by_ref().count(), 1);
        assert_eq!(records.skipped, 2);
        assert_eq!(p.proteins().collect::<Vec<_>>(), vec!["P1"]);
    }

    #[test]
    fn incomplete_header_disables_section() {
        let body = "prot_hit_num|prot_acc|prot_desc|pep_score\n1|P1|one|40\n";
        let p = HitParser::from_bytes(body.as_bytes().to_vec(), ParseConfig::new(1.0, 0.0));
        assert_eq!(p.records().count(), 0);
        assert!(p.best_hits().is_empty());
    }

    #[test]
    fn continuation_rows_inherit_protein() {
        let p = parser(
            &[
                "|||||||1|0.01|40|ORPHANK",
                "1|P1|one GN=ONE|30|100|4|2|2|0.01|40|AAAK",
                "|||||||3|0.001|70|CCCK",
                "2|P2|two|20|200|5|2|4|9.0|40|DDDK",
                "|||||||5|0.01|40|EEEK",
            ],
            1.0,
            0.0,
        );
        let records = p.records().collect::<Vec<_>>();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].accession(), "P1");
        assert_eq!(records[1].peptide_score, 70.0);
        assert_eq!(records[3].accession(), "P2");
        // P2's only surviving row is a continuation row
        let p2 = p.best_surviving_hit("P2").unwrap();
        assert_eq!(p2.score, 20.0);
        assert_eq!(p2.mass, 200);
    }

    #[test]
    fn malformed_numbers_default_to_zero() {
        let p = parser(
            &["x|P1|one|abc||---|n/a|1|0.01|40|AAAK", "2|P2|two|20|200|5|2|2|bad|40|BBBK"],
            1.0,
            0.0,
        );
        let map = p.best_hits();
        assert_eq!(
            map.get("P1"),
            Some(&Hit {
                hit_rank: 0,
                accession: "P1".into(),
                description: "one".into(),
                score: 0.0,
                mass: 0,
                significant_match_count: 0.0,
                total_match_count: 0,
            })
        );
        // an unreadable expectancy reads as 0.0 and passes
        assert!(map.contains("P2"));
    }

    #[test]
    fn comma_delimited_with_crlf() {
        let body = "prot_hit_num,prot_acc,prot_desc,prot_score,prot_mass,prot_matches,prot_matches_sig,pep_expect,pep_score\r\n\
                    1,P1,\"Protein, one GN=ONE\",30,100,4,2,0.01,40\r\n";
        let p = HitParser::from_bytes(
            body.as_bytes().to_vec(),
            ParseConfig::new(1.0, 0.0).delimiter(b','),
        );
        let hit = p.best_surviving_hit("P1").unwrap();
        assert_eq!(hit.description, "Protein, one GN=ONE");
        assert_eq!(hit.significant_match_count, 2.0);
    }

    #[test]
    fn empty_after_filtering() {
        let p = parser(&["1|P1|one|30|100|4|2|1|0.01|40|AAAK"], 0.001, 0.0);
        assert!(p.best_hits().is_empty());
        assert_eq!(p.proteins().count(), 1);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}\n1|P1|one|30|100|4|2|1|0.01|40|AAAK\n", HEADER).unwrap();
        let map = BestHitMap::load(file.path(), &ParseConfig::new(1.0, 0.0)).unwrap();
        assert_eq!(map.len(), 1);
        let again = BestHitMap::load(file.path(), &ParseConfig::new(1.0, 0.0)).unwrap();
        assert_eq!(map, again);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("F001747_WT-ALL_with_pipes.csv");
        let err = match HitParser::open(&path, ParseConfig::new(1.0, 0.0)) {
            Ok(_) => panic!("opened a missing file"),
            Err(e) => e,
        };
        match &err {
            Error::Input { path: p, .. } => assert_eq!(p, &path),
            e => panic!("unexpected error {:?}", e),
        }
        assert!(err.to_string().contains("F001747_WT-ALL_with_pipes.csv"));
    }
}
