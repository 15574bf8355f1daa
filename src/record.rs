//! The run log: a plain text file that every finished run appends one record to, and that the
//! results tool reads back. Records are five lines each and are read positionally.
//!
//! ```text
//! Date: Fri Oct 16 14:02:11 2026
//! Generations: 12
//! Pop size: 30
//! Max score: 18204
//!
//! ```

use crate::{scenario::RunState, Error, Result};
use chrono::Local;
use core::fmt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

const CTIME: &str = "%a %b %e %H:%M:%S %Y";

const DATE: &str = "Date: ";
const GENERATIONS: &str = "Generations: ";
const POP_SIZE: &str = "Pop size: ";
const MAX_SCORE: &str = "Max score: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub date: String,
    pub generations: usize,
    pub pop_size: usize,
    pub max_score: u64,
}

impl RunRecord {
    /// A record of `state`, dated now
    pub fn new(state: &RunState) -> Self {
        Self {
            date: Local::now().format(CTIME).to_string(),
            generations: state.generation,
            pop_size: state.pop_size,
            max_score: state.max_score,
        }
    }

    pub fn append<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.to_string().as_bytes())?;
        Ok(())
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{DATE}{}", self.date)?;
        writeln!(f, "{GENERATIONS}{}", self.generations)?;
        writeln!(f, "{POP_SIZE}{}", self.pop_size)?;
        writeln!(f, "{MAX_SCORE}{}", self.max_score)?;
        writeln!(f)
    }
}

fn field<'a>(lines: &[&'a str], base: usize, offset: usize, prefix: &str) -> Result<&'a str> {
    let line = base + offset + 1;
    lines
        .get(base + offset)
        .ok_or_else(|| Error::RunLog {
            line,
            reason: format!("record ends before {:?}", prefix.trim_end()),
        })?
        .strip_prefix(prefix)
        .map(str::trim)
        .ok_or_else(|| Error::RunLog {
            line,
            reason: format!("expected {:?}", prefix.trim_end()),
        })
}

fn number<T: core::str::FromStr>(
    lines: &[&str],
    base: usize,
    offset: usize,
    prefix: &str,
) -> Result<T> {
    let raw = field(lines, base, offset, prefix)?;
    raw.parse().map_err(|_| Error::RunLog {
        line: base + offset + 1,
        reason: format!("{raw:?} is not a number"),
    })
}

/// Parse every record of a run log. The blank line closing the last record may be missing
pub fn parse(log: &str) -> Result<Vec<RunRecord>> {
    let lines = log.lines().collect::<Vec<_>>();
    let mut records = vec![];

    for base in (0..lines.len()).step_by(5) {
        let group = &lines[base..lines.len().min(base + 5)];
        if group.iter().all(|l| l.trim().is_empty()) {
            continue;
        }

        records.push(RunRecord {
            date: field(&lines, base, 0, DATE)?.to_string(),
            generations: number(&lines, base, 1, GENERATIONS)?,
            pop_size: number(&lines, base, 2, POP_SIZE)?,
            max_score: number(&lines, base, 3, MAX_SCORE)?,
        });

        if let Some(sep) = lines.get(base + 4) {
            if !sep.trim().is_empty() {
                return Err(Error::RunLog {
                    line: base + 5,
                    reason: "expected a blank line between records".into(),
                });
            }
        }
    }

    Ok(records)
}

pub fn read<P: AsRef<Path>>(path: P) -> Result<Vec<RunRecord>> {
    parse(&fs::read_to_string(path)?)
}

#[derive(Serialize)]
struct Summary {
    generations: usize,
    pop_size: usize,
    max_score: u64,
}

/// Key records by date, in log order. A later record with the same date replaces the earlier one
/// in place.
pub fn summarize(records: &[RunRecord]) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    for record in records {
        out.insert(
            record.date.clone(),
            serde_json::to_value(Summary {
                generations: record.generations,
                pop_size: record.pop_size,
                max_score: record.max_score,
            })?,
        );
    }
    Ok(out)
}
