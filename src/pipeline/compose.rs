//! Formats code-context search results into a prompt context block.

use crate::api::ContextRecord;

/// Concatenate search results into the textual context embedded in the
/// prompt. One block per record in received (relevance) order, blocks
/// separated by a single blank line. Empty input yields an empty string;
/// the analyzer decides what that means.
pub fn compose_context(records: &[ContextRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "File: {}\nRepository: {}\nLines {}-{}:\n{}",
                record.file_path,
                record.repository_name,
                record.start_line,
                record.end_line,
                record.chunk_content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
