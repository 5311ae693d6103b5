use crate::index::types::{bytes_to_trigram, Trigram};

/// Longest line a text file may contain before it is treated as generated
/// or binary content.
pub const MAX_LINE_LEN: usize = 2000;

/// Upper bound on distinct trigrams in one file; beyond this the file is
/// almost certainly not hand-written source.
pub const MAX_TEXT_TRIGRAMS: usize = 20000;

/// Why the store refused to index a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSkip {
    TooLarge,
    Binary,
    LongLine,
    TooManyTrigrams,
}

impl std::fmt::Display for ContentSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSkip::TooLarge => write!(f, "too large"),
            ContentSkip::Binary => write!(f, "binary content"),
            ContentSkip::LongLine => write!(f, "line longer than {} bytes", MAX_LINE_LEN),
            ContentSkip::TooManyTrigrams => write!(f, "more than {} trigrams", MAX_TEXT_TRIGRAMS),
        }
    }
}

/// One bit per possible 24-bit trigram (2MB).
struct TrigramBitset {
    bits: Vec<u64>,
}

impl TrigramBitset {
    fn new() -> Self {
        Self {
            bits: vec![0u64; 1 << 18],
        }
    }

    #[inline]
    fn insert(&mut self, trigram: Trigram) {
        self.bits[(trigram >> 6) as usize] |= 1u64 << (trigram & 63);
    }

    /// Set bits in ascending order
    fn into_sorted(self) -> Vec<Trigram> {
        let mut out = Vec::with_capacity(8192);
        for (word_idx, &word) in self.bits.iter().enumerate() {
            let base = (word_idx as u32) << 6;
            let mut w = word;
            while w != 0 {
                out.push(base | w.trailing_zeros());
                w &= w - 1;
            }
        }
        out
    }
}

/// Extract the distinct trigrams of a file's content, ascending.
pub fn extract_trigrams(content: &[u8]) -> Vec<Trigram> {
    if content.len() < 3 {
        return Vec::new();
    }

    // Small inputs: sort+dedup beats zeroing a 2MB bitset
    if content.len() < 1024 {
        let mut trigrams: Vec<Trigram> = content
            .windows(3)
            .map(|w| bytes_to_trigram(w[0], w[1], w[2]))
            .collect();
        trigrams.sort_unstable();
        trigrams.dedup();
        return trigrams;
    }

    let mut bitset = TrigramBitset::new();
    for w in content.windows(3) {
        bitset.insert(bytes_to_trigram(w[0], w[1], w[2]));
    }
    bitset.into_sorted()
}

/// Check if content is likely binary
pub fn is_binary(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(8192)];

    if sample.contains(&0) {
        return true;
    }

    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c))
        .count();

    control > sample.len() / 8
}

fn longest_line(content: &[u8]) -> usize {
    content.split(|&b| b == b'\n').map(<[u8]>::len).max().unwrap_or(0)
}

/// Classify file content, returning its trigrams when it is indexable.
pub fn index_content(content: &[u8], max_file_size: u64) -> Result<Vec<Trigram>, ContentSkip> {
    if content.len() as u64 > max_file_size {
        return Err(ContentSkip::TooLarge);
    }
    if is_binary(content) {
        return Err(ContentSkip::Binary);
    }
    if longest_line(content) > MAX_LINE_LEN {
        return Err(ContentSkip::LongLine);
    }

    let trigrams = extract_trigrams(content);
    if trigrams.len() > MAX_TEXT_TRIGRAMS {
        return Err(ContentSkip::TooManyTrigrams);
    }
    Ok(trigrams)
}
