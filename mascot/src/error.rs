use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The result file is missing or could not be read
    #[error("Unable to read result file {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A ratio reached the natural logarithm without being strictly positive
    #[error("Logarithm undefined for ratio {ratio} of protein {accession}")]
    LogDomain { accession: String, ratio: f64 },
    /// A condition label yields a sheet name that workbooks reject
    #[error("Invalid sheet name '{name}': {reason}")]
    SheetName { name: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
