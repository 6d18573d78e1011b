//! A Rust library for comparing protein identifications between two
//! conditions of a Mascot search, e.g. a knockout against its wild type.
//!
//! This library's API is based around several types that form
//! a data analysis pipeline.
//!
//! A Mascot protein hits export is opened with a [`HitParser`], which keeps
//! only peptide matches passing an expectancy and a score cutoff. The best
//! surviving hit of each protein is collected into a [`BestHitMap`]:
//!
//! ```rust,ignore
//! # use mascot::*;
//! let config = ParseConfig::new(100.0, 30.0);
//! let ko = BestHitMap::load("./data/KO/F001738_KO-ALL_with_pipes.csv", &config)?;
//! let wt = BestHitMap::load("./data/WT/F001747_WT-ALL_with_pipes.csv", &config)?;
//! ```
//!
//! Two [`BestHitMap`]s are compared through a [`Reconciliation`], which
//! splits proteins into those unique to either condition and those
//! shared by both, along with the `B / A` ratios of their peptide match
//! counts
//!
//! ```rust,ignore
//! # use mascot::*;
//! let rec = Reconciliation::new(&ko, &wt)?;
//! for (acc, common) in &rec.common {
//!     if let Some(ratio) = common.significant {
//!         println!("{}\t{}", acc, ratio.ln);
//!     }
//! }
//! ```
//!
//! Finally, [`report::Report`] lays the results out as named sheets of
//! cells for a writer to serialize.

use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::iter::FromIterator;
use std::path::Path;

mod coerce;
mod error;
mod hit;
mod parser;
mod reconcile;
pub mod report;

pub use coerce::{coerce, Coerce};
pub use error::{Error, Result};
pub use hit::{BestHitMap, Hit};
pub use parser::{HitParser, ParseConfig, Proteins, Record, Records};
pub use reconcile::{Common, Ratio, Reconciliation};

use hit::replaces;
