use crate::models::ocr_result::OcrWord;
use std::collections::BTreeMap;

/// Default vertical bucket height in pixels
pub const DEFAULT_BUCKET_SIZE: u32 = 10;

/// Group OCR words into text lines by vertical position.
///
/// Each word lands in bucket `top / bucket_size`. Buckets are emitted top to
/// bottom and the words in a bucket are joined left to right with single
/// spaces. Words that are blank or carry no ASCII letter or digit are dropped.
/// A `bucket_size` of 0 is treated as 1.
///
/// This is a heuristic: skewed scans or multi-column layouts can merge or
/// split rows.
pub fn group_words_into_lines(words: &[OcrWord], bucket_size: u32) -> Vec<String> {
    let bucket_size = bucket_size.max(1);
    let mut buckets: BTreeMap<u32, Vec<&OcrWord>> = BTreeMap::new();

    for word in words {
        if word.text.trim().is_empty() || !word.has_alphanumeric() {
            continue;
        }
        buckets.entry(word.top / bucket_size).or_default().push(word);
    }

    buckets
        .into_values()
        .map(|mut line| {
            // Stable sort keeps OCR emission order for equal x
            line.sort_by_key(|w| w.left);
            line.iter()
                .map(|w| w.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
