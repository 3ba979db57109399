use std::fmt;

/// Boundaries tried in order inside the tail of a window
const BOUNDARIES: [&[&str]; 3] = [
    &["\n\n"],
    &["\n"],
    &[". ", "? ", "! ", "; ", ".\t", "?\t", "!\t"],
];

/// Fraction of the window (in percent) after which a boundary may be used
const BREAK_SEARCH_START_PERCENT: usize = 80;

/// One window of a segmented document
///
/// Sizes and offsets are counted in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position in the sequence
    pub index: usize,

    /// Number of chunks the document was split into
    pub total: usize,

    /// Chunk text, including the overlap copied from the predecessor
    pub content: String,

    /// Leading characters repeated from the previous chunk
    pub overlap_with_predecessor: usize,
}

impl Chunk {
    /// `content` without the characters repeated from the predecessor
    pub fn fresh_content(&self) -> &str {
        match self.content.char_indices().nth(self.overlap_with_predecessor) {
            Some((byte_idx, _)) => &self.content[byte_idx..],
            None => "",
        }
    }

    /// Length of `content` in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Short "i/n" label for logs and error messages
    pub fn label(&self) -> String {
        format!("{}/{}", self.index, self.total)
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}", self.label())
    }
}

/// Split a document into ordered, overlapping chunks
///
/// Documents that fit in one window come back as a single chunk. Longer
/// documents are cut into windows of at most `max_chunk_size` characters,
/// preferring a blank line, then a line break, then a sentence end, then any
/// whitespace found in the last fifth of the window. Each window after the
/// first starts `overlap_size` characters before its predecessor ended.
///
/// Empty input yields no chunks. The result depends only on the arguments.
pub fn segment(text: &str, max_chunk_size: usize, overlap_size: usize) -> Vec<Chunk> {
    let window = max_chunk_size.max(1);
    let overlap = overlap_size.min(window - 1);

    // Byte offset of every char boundary, plus the end of the text
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    if char_len == 0 {
        return Vec::new();
    }

    if char_len <= window {
        return vec![Chunk {
            index: 1,
            total: 1,
            content: text.to_string(),
            overlap_with_predecessor: 0,
        }];
    }

    // (start, end, overlap) in char positions
    let mut spans: Vec<(usize, usize, usize)> = Vec::new();
    let mut start = 0;
    let mut prev_end = 0;

    loop {
        let hard_end = (start + window).min(char_len);
        let end = if hard_end < char_len {
            find_break_point(text, &bounds, start, prev_end, hard_end)
        } else {
            hard_end
        };

        let shared = if spans.is_empty() { 0 } else { prev_end - start };
        spans.push((start, end, shared));

        if end >= char_len {
            break;
        }

        let next_start = end.saturating_sub(overlap);
        start = if next_start > start { next_start } else { end };
        prev_end = end;
    }

    let total = spans.len();
    spans
        .into_iter()
        .enumerate()
        .map(|(i, (start, end, shared))| Chunk {
            index: i + 1,
            total,
            content: text[bounds[start]..bounds[end]].to_string(),
            overlap_with_predecessor: shared,
        })
        .collect()
}

/// Pick the end of a window, in chars, falling back to a hard cut
///
/// The break always lands after `prev_end`, so every window adds text its
/// predecessor did not cover.
fn find_break_point(
    text: &str,
    bounds: &[usize],
    start: usize,
    prev_end: usize,
    hard_end: usize,
) -> usize {
    let search_start =
        (start + (hard_end - start) * BREAK_SEARCH_START_PERCENT / 100).max(prev_end);
    let region_offset = bounds[search_start];
    let region = &text[region_offset..bounds[hard_end]];

    let to_char_pos = |byte_pos: usize| bounds.partition_point(|&b| b < byte_pos);

    for group in BOUNDARIES {
        let best = group
            .iter()
            .filter_map(|sep| region.rfind(sep).map(|idx| idx + sep.len()))
            .max();

        if let Some(byte_end) = best {
            return to_char_pos(region_offset + byte_end);
        }
    }

    if let Some((idx, ch)) = region.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
        return to_char_pos(region_offset + idx + ch.len_utf8());
    }

    hard_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunks: &[Chunk]) -> String {
        chunks.iter().map(Chunk::fresh_content).collect()
    }

    fn assert_well_formed(chunks: &[Chunk], window: usize) {
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i + 1);
            assert_eq!(chunk.total, total);
            assert!(!chunk.content.is_empty());
            assert!(chunk.char_len() <= window, "{} exceeds window", chunk);
        }
    }

    #[test]
    fn test_segment_short_text() {
        let text = "This agreement is made between the parties.";
        let chunks = segment(text, 100, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
        assert_eq!(chunks[0].index, 1);
        assert_eq!(chunks[0].total, 1);
        assert_eq!(chunks[0].overlap_with_predecessor, 0);
    }

    #[test]
    fn test_segment_exactly_window_is_single_chunk() {
        let text = "a".repeat(50);
        assert_eq!(segment(&text, 50, 5).len(), 1);
        assert_eq!(segment(&text, 49, 5).len(), 2);
    }

    #[test]
    fn test_segment_empty_text() {
        assert!(segment("", 10, 2).is_empty());
    }

    #[test]
    fn test_segment_hard_cut_windows() {
        // No boundaries at all: every window is cut at full width
        let text = "x".repeat(200_000);
        let chunks = segment(&text, 32_000, 500);
        assert_eq!(chunks.len(), 7);
        assert_well_formed(&chunks, 32_000);
        assert_eq!(chunks[0].char_len(), 32_000);
        assert_eq!(chunks[1].overlap_with_predecessor, 500);
        assert_eq!(chunks[6].char_len(), 200_000 - 6 * 31_500);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_segment_minimum_chunk_count() {
        // Without boundaries, count is ceil((len - overlap) / (window - overlap))
        for (len, window, overlap) in [(101, 50, 10), (1000, 100, 0), (999, 100, 25), (91, 50, 10)] {
            let text = "z".repeat(len);
            let expected = (len - overlap).div_ceil(window - overlap);
            assert_eq!(
                segment(&text, window, overlap).len(),
                expected,
                "len={} window={} overlap={}",
                len,
                window,
                overlap
            );
        }
    }

    #[test]
    fn test_segment_prefers_paragraph_breaks() {
        let para = format!("{}.\n\n", "w".repeat(88));
        let text = para.repeat(10);
        let chunks = segment(&text, 100, 0);

        assert_well_formed(&chunks, 100);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.content.ends_with("\n\n"), "{:?}", chunk.content);
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_segment_prefers_line_break_over_sentence_end() {
        let text = format!("{}\n{}. {}", "a".repeat(85), "b".repeat(5), "c".repeat(50));
        let chunks = segment(&text, 100, 0);
        // the sentence end sits later, but a line break wins
        assert!(chunks[0].content.ends_with('\n'));
    }

    #[test]
    fn test_segment_breaks_on_whitespace_before_hard_cut() {
        let text = format!("{} {}", "a".repeat(90), "b".repeat(60));
        let chunks = segment(&text, 100, 0);
        assert_eq!(chunks[0].content, format!("{} ", "a".repeat(90)));
        assert_eq!(chunks[1].content, "b".repeat(60));
    }

    #[test]
    fn test_segment_overlap_repeats_predecessor_tail() {
        let text: String = (0..400).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = segment(&text, 100, 20);

        assert_well_formed(&chunks, 100);
        for pair in chunks.windows(2) {
            let prev = &pair[0].content;
            let next = &pair[1];
            let shared: String = next.content.chars().take(next.overlap_with_predecessor).collect();
            assert_eq!(next.overlap_with_predecessor, 20);
            assert!(prev.ends_with(&shared));
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_segment_counts_chars_not_bytes() {
        let text = "é".repeat(250);
        let chunks = segment(&text, 100, 10);
        assert_well_formed(&chunks, 100);
        assert_eq!(chunks[0].char_len(), 100);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_segment_is_deterministic() {
        let text = "Clause one applies.\nClause two applies. ".repeat(200);
        assert_eq!(segment(&text, 300, 40), segment(&text, 300, 40));
    }

    #[test]
    fn test_segment_keeps_short_trailing_content() {
        let text = format!("{}tail", "q".repeat(100));
        let chunks = segment(&text, 100, 0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].content, "tail");
    }

    #[test]
    fn test_segment_degenerate_policy() {
        // zero window acts as one char; overlap is clamped below the window
        let chunks = segment("abc", 0, 5);
        assert_eq!(chunks.len(), 3);
        assert_eq!(reassemble(&chunks), "abc");
    }

    #[test]
    fn test_segment_heavy_overlap_always_adds_text() {
        // Line breaks inside the shared region must not end a window early
        let text = "abcdefg\nhij\nklmnopq\nrstu\nvwxyz12\n345\n".repeat(3);
        let chunks = segment(&text, 10, 9);

        assert_well_formed(&chunks, 10);
        for chunk in chunks.iter().skip(1) {
            assert!(
                !chunk.fresh_content().is_empty(),
                "{} repeats its predecessor: {:?}",
                chunk,
                chunk.content
            );
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_chunk_label() {
        let chunk = Chunk {
            index: 2,
            total: 5,
            content: "text".to_string(),
            overlap_with_predecessor: 0,
        };
        assert_eq!(chunk.label(), "2/5");
        assert_eq!(chunk.to_string(), "chunk 2/5");
    }
}
