//! Rendering counts as JSON, CSV or a plain text table.

use serde::{Serialize, Serializer};

use crate::counts::WordCounts;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// JSON object, most frequent word first.
    #[default]
    Json,
    /// `word,count` rows with a header.
    Csv,
    /// Aligned `word count` lines.
    Text,
}

/// Entries serialized as a JSON object in the order given.
struct Ranked<'a>(&'a [(&'a str, u32)]);

impl Serialize for Ranked<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().copied())
    }
}

/// Render `counts` in `format`, keeping only the `top` most frequent words when given.
pub fn render(counts: &WordCounts, format: Format, top: Option<usize>) -> Result<String> {
    let entries = match top {
        Some(n) => counts.top(n),
        None => counts.sorted(),
    };
    match format {
        Format::Json => {
            let mut out = serde_json::to_string_pretty(&Ranked(&entries))?;
            out.push('\n');
            Ok(out)
        }
        Format::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            wtr.write_record(["word", "count"])?;
            for (word, n) in &entries {
                wtr.write_record([*word, n.to_string().as_str()])?;
            }
            let bytes = wtr
                .into_inner()
                .map_err(|e| csv::Error::from(e.into_error()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Format::Text => Ok(entries
            .iter()
            .map(|(word, n)| format!("{:<15} {}\n", word, n))
            .collect()),
    }
}
