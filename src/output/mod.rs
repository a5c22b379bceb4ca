//! Result output
//!
//! Serializes a [`CrawlResult`] as JSON. The `wordCounts` object is emitted
//! in rank order (the order the engine produced, not alphabetical), so a
//! reader sees the most popular word first. Results are appended to the
//! output file, preserving earlier runs; with no path configured they go to
//! stdout.

use crate::crawler::CrawlResult;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

impl Serialize for CrawlResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CrawlResult", 2)?;
        state.serialize_field("wordCounts", &RankedCounts(&self.word_counts))?;
        state.serialize_field("urlsVisited", &self.urls_visited)?;
        state.end()
    }
}

/// Serializes ranked word counts as a JSON object in rank order
struct RankedCounts<'a>(&'a [(String, u64)]);

impl Serialize for RankedCounts<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (word, count) in self.0 {
            map.serialize_entry(word, count)?;
        }
        map.end()
    }
}

/// Writes the crawl result as pretty-printed JSON to the given writer
pub fn write_result(result: &CrawlResult, writer: &mut dyn Write) -> crate::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    writeln!(writer, "{}", json)?;
    Ok(())
}

/// Appends the crawl result JSON to the file at `path`
///
/// Existing content is preserved; each run adds one JSON document.
pub fn write_result_to_path(result: &CrawlResult, path: &Path) -> crate::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write_result(result, &mut file)
}
