//! `@nick` detection over the raw inbound stream.
//!
//! Like the keep-alive responder this works byte by byte and keeps its
//! position across reads. There is no word-boundary check after the
//! nickname, so `@al` also matches inside `@alice`.

const MARKER: u8 = b'@';

#[derive(Debug, Clone)]
pub struct MentionScanner {
    nickname: Vec<u8>,
    /// Index of the next nickname byte to match, `None` outside a candidate.
    partial: Option<usize>,
}

impl MentionScanner {
    pub fn new(nickname: impl Into<Vec<u8>>) -> Self {
        Self {
            nickname: nickname.into(),
            partial: None,
        }
    }

    pub fn partial(&self) -> Option<usize> {
        self.partial
    }

    /// Advance by one byte. Returns `true` when a full `@<nickname>` ends here.
    pub fn push(&mut self, byte: u8) -> bool {
        let Some(i) = self.partial else {
            if byte == MARKER {
                self.partial = Some(0);
            }
            return false;
        };

        if self.nickname.get(i) != Some(&byte) {
            // The mismatching byte may itself open a new candidate.
            self.partial = (byte == MARKER).then_some(0);
            return false;
        }

        if i + 1 == self.nickname.len() {
            self.partial = None;
            true
        } else {
            self.partial = Some(i + 1);
            false
        }
    }

    /// Feed a chunk and return how many mentions completed in it.
    pub fn feed(&mut self, chunk: &[u8]) -> u64 {
        chunk.iter().filter(|&&b| self.push(b)).count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(nick: &str, chunks: &[&[u8]]) -> u64 {
        let mut scanner = MentionScanner::new(nick);
        chunks.iter().map(|c| scanner.feed(c)).sum()
    }

    #[test]
    fn one_event_per_occurrence() {
        assert_eq!(count("nova", &[b"hey @nova, and again x@nova\r\n"]), 2);
        assert_eq!(count("nova", &[b"nova without a marker\r\n"]), 0);
    }

    #[test]
    fn survives_any_split() {
        let line: &[u8] = b":a!b@c PRIVMSG #x :ping @nova now\r\n";
        for split in 0..=line.len() {
            let (a, b) = line.split_at(split);
            assert_eq!(count("nova", &[a, b]), 1, "split at {split}");
        }
    }

    #[test]
    fn double_marker_fires_once() {
        assert_eq!(count("nova", &[b"@@nova"]), 1);
        assert_eq!(count("nova", &[b"@", b"@", b"nova"]), 1);
    }

    #[test]
    fn mismatch_cancels_candidate() {
        let mut scanner = MentionScanner::new("nova");
        assert_eq!(scanner.feed(b"@no"), 0);
        assert_eq!(scanner.partial(), Some(2));
        assert_eq!(scanner.feed(b"pe"), 0);
        assert_eq!(scanner.partial(), None);
        assert_eq!(scanner.feed(b"va"), 0);
    }

    #[test]
    fn nickname_prefix_false_positive_is_kept() {
        assert_eq!(count("al", &[b"hi @alice"]), 1);
    }

    #[test]
    fn case_sensitive() {
        assert_eq!(count("nova", &[b"@Nova @NOVA"]), 0);
    }

    #[test]
    fn partial_index_stays_in_range() {
        let mut scanner = MentionScanner::new("ab");
        for &b in b"@a@ab@@a" {
            scanner.push(b);
            if let Some(i) = scanner.partial() {
                assert!(i <= 2);
            }
        }
    }
}
