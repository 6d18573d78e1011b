//! Tabular views of best hits and reconciliations, ready to be serialized
//!
//! Nothing in here knows about a file format; a writer walks the
//! [`Sheet`]s of a [`Report`] and renders each [`Cell`].
use super::*;

pub const PROTEIN_HEADER: [&str; 9] = [
    "PROT_HIT_NUM",
    "PROT_ACC",
    "UNIPROT_LINK",
    "GENENAME",
    "PROT_DESC",
    "PROT_SCORE",
    "PROT_MASS",
    "PROT_MATCH_SIG",
    "PROT_MATCH",
];

#[derive(Clone, Debug, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    /// A hyperlink, displayed as its own address
    Link(String),
    /// Formatted text computed for the report
    Label(String),
    Empty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sheet<'a> {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell<'a>>>,
}

/// One output workbook
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report<'a> {
    pub sheets: Vec<Sheet<'a>>,
}

/// Longest sheet name a workbook accepts, in characters
pub const MAX_SHEET_NAME: usize = 31;

const FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

pub fn condition_sheet(label: &str) -> String {
    format!("{} Unique Proteins", label)
}

pub fn exclusive_sheet(label: &str) -> String {
    format!("{}-only Unique Proteins", label)
}

pub fn ratio_sheet(label_a: &str, label_b: &str) -> String {
    format!("{}-{} differential expression", label_a, label_b)
}

fn check_sheet_name(name: &str) -> Result<()> {
    let reason = if name.chars().count() > MAX_SHEET_NAME {
        "longer than 31 characters"
    } else if name.contains(FORBIDDEN) {
        "contains one of []:*?/\\"
    } else if name.starts_with('\'') || name.ends_with('\'') {
        "starts or ends with an apostrophe"
    } else {
        return Ok(());
    };
    Err(Error::SheetName {
        name: name.into(),
        reason,
    })
}

/// Check every sheet name that the reports of conditions `label_a` and
/// `label_b` will use, so that bad labels fail before anything is written
pub fn check_labels(label_a: &str, label_b: &str) -> Result<()> {
    let combined = [
        exclusive_sheet(label_a),
        exclusive_sheet(label_b),
        ratio_sheet(label_a, label_b),
    ];
    for name in [condition_sheet(label_a), condition_sheet(label_b)]
        .iter()
        .chain(combined.iter())
    {
        check_sheet_name(name)?;
    }
    // Sheet names within a workbook are compared case-insensitively
    if combined[0].to_lowercase() == combined[1].to_lowercase() {
        return Err(Error::SheetName {
            name: combined[1].clone(),
            reason: "used twice in the combined report",
        });
    }
    Ok(())
}

/// Print a count as a decimal with at least one fractional digit
fn decimal(x: f64) -> String {
    // `Display` never switches to exponent notation for f64
    let s = x.to_string();
    if s.contains('.') || !x.is_finite() {
        s
    } else {
        s + ".0"
    }
}

/// `"B:A"` label of two counts
pub fn count_label(b: f64, a: f64) -> String {
    format!("{}:{}", decimal(b), decimal(a))
}

/// Columns of a single-condition protein listing
pub fn protein_row(hit: &Hit) -> Vec<Cell<'_>> {
    vec![
        Cell::Number(f64::from(hit.hit_rank)),
        Cell::Text(&hit.accession),
        Cell::Link(uniprot::link(&hit.accession)),
        Cell::Text(uniprot::gene_name(&hit.description)),
        Cell::Text(&hit.description),
        Cell::Number(hit.score),
        Cell::Number(hit.mass as f64),
        Cell::Number(hit.significant_match_count),
        Cell::Number(hit.total_match_count as f64),
    ]
}

pub fn ratio_header(label_a: &str, label_b: &str) -> Vec<String> {
    vec![
        "PROT_ACC".into(),
        "UNIPROT_LINK".into(),
        "PROT_DESC".into(),
        format!("{} PROT_HIT_NUM", label_a),
        format!("{} PROT_HIT_NUM", label_b),
        format!("{} PROT_SCORE", label_a),
        format!("{} PROT_SCORE", label_b),
        format!("{} PROT_MATCH_SIG", label_a),
        format!("{} PROT_MATCH_SIG", label_b),
        format!("PROT_MATCH_SIG {}:{}", label_b, label_a),
        format!("LOG(PROT_MATCH_SIG {}:{})", label_b, label_a),
        format!("{} PROT_MATCH", label_a),
        format!("{} PROT_MATCH", label_b),
        format!("PROT_MATCH {}:{}", label_b, label_a),
        format!("LOG(PROT_MATCH {}:{})", label_b, label_a),
    ]
}

/// Columns of a differential expression row; undefined logarithms are
/// left empty
pub fn ratio_row<'a>(common: &Common<'a>) -> Vec<Cell<'a>> {
    let (a, b) = (common.a, common.b);
    let log = |r: Option<Ratio>| r.map_or(Cell::Empty, |r| Cell::Number(r.ln));
    let total_a = a.total_match_count as f64;
    let total_b = b.total_match_count as f64;
    vec![
        Cell::Text(common.accession()),
        Cell::Link(uniprot::link(common.accession())),
        Cell::Text(&a.description),
        Cell::Number(f64::from(a.hit_rank)),
        Cell::Number(f64::from(b.hit_rank)),
        Cell::Number(a.score),
        Cell::Number(b.score),
        Cell::Number(a.significant_match_count),
        Cell::Number(b.significant_match_count),
        Cell::Label(count_label(
            b.significant_match_count,
            a.significant_match_count,
        )),
        log(common.significant),
        Cell::Number(total_a),
        Cell::Number(total_b),
        Cell::Label(count_label(total_b, total_a)),
        log(common.total),
    ]
}

impl<'a> Sheet<'a> {
    pub fn proteins<I: IntoIterator<Item = &'a Hit>>(name: String, hits: I) -> Sheet<'a> {
        Sheet {
            name,
            header: PROTEIN_HEADER.iter().map(|s| s.to_string()).collect(),
            rows: hits.into_iter().map(protein_row).collect(),
        }
    }
}

impl<'a> Report<'a> {
    /// Every protein identified in one condition
    pub fn condition(label: &str, hits: &'a BestHitMap) -> Report<'a> {
        Report {
            sheets: vec![Sheet::proteins(condition_sheet(label), hits.hits())],
        }
    }

    /// Proteins exclusive to each condition, and the differential
    /// expression of proteins shared by both
    pub fn combined(label_a: &str, label_b: &str, rec: &Reconciliation<'a>) -> Report<'a> {
        let only_a = Sheet::proteins(exclusive_sheet(label_a), rec.only_in_a.iter().copied());
        let only_b = Sheet::proteins(exclusive_sheet(label_b), rec.only_in_b.iter().copied());
        let ratios = Sheet {
            name: ratio_sheet(label_a, label_b),
            header: ratio_header(label_a, label_b),
            rows: rec.common.values().map(ratio_row).collect(),
        };
        Report {
            sheets: vec![only_a, only_b, ratios],
        }
    }
}
