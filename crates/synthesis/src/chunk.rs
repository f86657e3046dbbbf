/// Split a transcript into model-sized pieces
///
/// Whitespace is normalized and words are packed greedily, so every chunk
/// holds at most `max_chars` characters and never splits a word unless the
/// word alone is longer than `max_chars`. Chunks are returned in transcript
/// order; blank input yields no chunks.
pub fn chunk_transcript(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();

        if word_chars > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }

            let pieces: Vec<char> = word.chars().collect();
            let mut pieces = pieces.chunks(max_chars).peekable();

            while let Some(piece) = pieces.next() {
                if pieces.peek().is_some() {
                    chunks.push(piece.iter().collect());
                } else {
                    current = piece.iter().collect();
                    current_chars = piece.len();
                }
            }

            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_chars = word_chars;
        } else if current_chars + 1 + word_chars <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_chars += 1 + word_chars;
        } else {
            chunks.push(std::mem::replace(&mut current, word.to_string()));
            current_chars = word_chars;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
