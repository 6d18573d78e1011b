//! Presentation helpers for UniProtKB accessions and descriptions
//!
//! Search engines report the UniProt FASTA header as the protein description,
//! e.g. `Prostaglandin-H2 D-isomerase OS=Mus musculus OX=10090 GN=Ptgds PE=1 SV=1`.
//! The helpers here derive the values shown next to a protein in reports:
//! a link to the UniProt entry and the gene name embedded in the header.
//!
//! # Example
//!
//! ```rust
//! # use uniprot::{gene_name, link};
//! assert_eq!(link("P16086"), "http://www.uniprot.org/uniprot/P16086");
//! assert_eq!(gene_name("Spectrin alpha chain GN=Sptan1 PE=1"), "Sptan1");
//! assert_eq!(gene_name("Uncharacterized protein"), "NA");
//! ```

use memchr::memmem;

/// Base address of UniProtKB entry pages
pub const ENTRY_URL: &str = "http://www.uniprot.org/uniprot/";

/// Placeholder gene name for descriptions without a `GN=` field
pub const MISSING_GENE: &str = "NA";

const GENE_TAG: &str = "GN=";

/// Build the UniProtKB entry address for an accession
pub fn link(accession: &str) -> String {
    format!("{}{}", ENTRY_URL, accession)
}

/// Extract the gene name from a UniProt-style protein description
///
/// The gene name is the token right after the first `GN=`, up to the next
/// whitespace character. A trailing `GN=` yields an empty gene name;
/// a description without `GN=` yields [`MISSING_GENE`].
pub fn gene_name(description: &str) -> &str {
    match memmem::find(description.as_bytes(), GENE_TAG.as_bytes()) {
        Some(idx) => {
            let rest = &description[idx + GENE_TAG.len()..];
            let end = rest.find(char::is_whitespace).unwrap_or_else(|| rest.len());
            &rest[..end]
        }
        None => MISSING_GENE,
    }
}
