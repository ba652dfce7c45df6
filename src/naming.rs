//! Display titles derived from document file names.
//!
//! Every index entry is keyed by a title computed from the file name alone,
//! so the same document always maps to the same heading:
//!
//! - `foo_bar.ipynb` → "Foo Bar"
//! - `intro_to_ggplot2.qmd` → "Intro To Ggplot2"
//! - `EDA_v2_final.ipynb` → "Eda V2 Final"
//! - `analysis.v2.ipynb` → "Analysis" (everything after the first dot is dropped)
//!
//! Casing follows title-case rules: a letter is upper-cased when the
//! character before it is not a letter, and lower-cased otherwise. Digits and
//! punctuation therefore start a new word (`2nd` → "2Nd").

use std::path::Path;

/// Title for a document path: file name up to its first `.`, underscores →
/// spaces, title-cased.
pub fn display_title(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = name.split('.').next().unwrap_or_default();
    title_case(&base.replace('_', " "))
}

/// Apply title-case: upper-case the first letter of every run of letters,
/// lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_cased = false;
    for c in text.chars() {
        let cased = c.is_uppercase() || c.is_lowercase();
        if cased && !prev_cased {
            result.extend(c.to_uppercase());
        } else if cased {
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
        prev_cased = cased;
    }
    result
}
