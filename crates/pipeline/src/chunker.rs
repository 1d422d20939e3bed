/// Split text into chunks bounded by a soft maximum character count, never
/// breaking inside a line.
///
/// Lines keep their trailing terminator, so concatenating the chunks
/// reproduces the input byte for byte. The bound is soft: a single line
/// longer than `max_chars` travels alone in an oversized chunk. Empty input
/// yields an empty list.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if !current.is_empty() && current.len() + line.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 2000).is_empty());
        assert!(chunk_text("", 1).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("a\nb\nc", 2000), vec!["a\nb\nc"]);
    }

    #[test]
    fn concatenation_is_lossless() {
        let inputs = [
            "one\ntwo\nthree\n",
            "no trailing newline",
            "\n\n\n",
            "a line that is fairly long\nshort\nanother line here\n",
        ];
        for text in inputs {
            for max in [1, 5, 10, 2000] {
                let chunks = chunk_text(text, max);
                assert_eq!(chunks.concat(), text, "lost bytes for max={max} text={text:?}");
                assert!(chunks.iter().all(|c| !c.is_empty()));
            }
        }
    }

    #[test]
    fn boundaries_never_split_a_line() {
        let text = "aaaa\nbbbb\ncccc\ndddd\n";
        for chunk in chunk_text(text, 10) {
            // Every chunk is a whole number of lines.
            assert!(chunk.ends_with('\n'));
        }
    }

    #[test]
    fn seals_before_exceeding_the_bound() {
        // Two 5-byte lines fit a 10-char chunk exactly; the third starts a new one.
        let chunks = chunk_text("aaaa\nbbbb\ncccc\n", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc\n"]);
    }

    #[test]
    fn oversized_line_travels_alone() {
        let long = "x".repeat(50);
        let text = format!("short\n{long}\nshort\n");
        let chunks = chunk_text(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], format!("{long}\n"));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn final_partial_chunk_is_emitted() {
        let chunks = chunk_text("aaaa\nbb", 5);
        assert_eq!(chunks, vec!["aaaa\n", "bb"]);
    }
}
