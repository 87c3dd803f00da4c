use crate::error::{Error, Result};
use crate::model::FaqEntry;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 3] = ["qtype", "Question", "Answer"];

#[derive(Debug, Deserialize)]
struct RawRow {
    qtype: String,
    #[serde(rename = "Question")]
    question: String,
    #[serde(rename = "Answer")]
    answer: String,
}

pub fn load_entries_csv(path: &Path) -> Result<Vec<FaqEntry>> {
    let file = File::open(path)?;
    let entries = parse_entries_csv(file)?;
    tracing::info!(path = %path.display(), entries = entries.len(), "loaded faq dataset");
    Ok(entries)
}

pub fn parse_entries_csv<R: Read>(reader: R) -> Result<Vec<FaqEntry>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    let mut entries = Vec::new();
    for row in rdr.deserialize::<RawRow>() {
        let row = row?;
        entries.push(FaqEntry {
            question: row.question,
            answer: row.answer,
            category: row.qtype,
        });
    }

    Ok(entries)
}
