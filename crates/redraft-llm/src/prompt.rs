//! Prompt construction for the rewrite contract.
//!
//! The system prompt carries the non-fabrication rules; the user prompt
//! carries either the whole report and the target section template, or
//! one chunk with its position in the sequence.

use redraft_text::chunking::TextChunk;

/// Non-fabrication instruction set sent with every rewrite call.
pub const REWRITE_SYSTEM_PROMPT: &str = "\
You rewrite official investigation reports. Follow these rules strictly:
1. Never add a name, role, number, date, place, or event that is not in the source text.
2. Never remove a name, case number, national id, date, or stated fact.
3. Copy every number, identifier, and date exactly as written in the source.
4. Reorganize and clean the text only. Do not summarize content away and do not interpret it.
5. Output only the rewritten document. No introductions, notes, or closing remarks.";

/// Target structure for a full-document rewrite. Sections without source
/// content are omitted by instruction, not invented.
pub const SECTION_TEMPLATE: &str = "\
1. Case data
2. Parties
3. Incident summary
4. Scene description
5. Seized items
6. Damages
7. Statements
8. Police actions
9. Withdrawal or settlement
10. Prosecution decisions
11. Custody handover
12. Key dates
13. Signatures
14. Appendices";

/// User prompt for a report that fits in a single inference call.
pub fn single_document_prompt(text: &str) -> String {
    format!(
        "Reorganize the following investigation report into this section \
         structure. Include only sections that have content in the source; \
         do not create empty sections.\n\n{SECTION_TEMPLATE}\n\nReport:\n{text}"
    )
}

/// User prompt for one chunk of a longer report. The position context
/// tells the model it is working on a fragment, so it neither opens nor
/// closes the document.
pub fn chunk_prompt(chunk: &TextChunk) -> String {
    format!(
        "This is part {part} of {total} of a long investigation report. \
         Rewrite only this part: clean and reorganize its content without \
         adding document-level headers, introductions, or conclusions. \
         Other parts are handled separately.\n\nPart {part} text:\n{text}",
        part = chunk.chunk_index + 1,
        total = chunk.total_chunks,
        text = chunk.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_prompt_embeds_report_and_template() {
        let prompt = single_document_prompt("Case 1001 details.");
        assert!(prompt.contains("Case 1001 details."));
        assert!(prompt.contains("Prosecution decisions"));
    }

    #[test]
    fn test_chunk_prompt_carries_position() {
        let chunk = TextChunk {
            text: "middle of the report".into(),
            chunk_index: 1,
            total_chunks: 3,
            start_char: 100,
            end_char: 120,
        };
        let prompt = chunk_prompt(&chunk);
        assert!(prompt.contains("part 2 of 3"));
        assert!(prompt.contains("middle of the report"));
    }
}
