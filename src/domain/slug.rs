//! Utilities for turning request paths and titles into URL-safe slugs.
//!
//! ASCII slugification is handled by the `slug` crate; Chinese characters are
//! transliterated with `pinyin` first so a path like `/报表/季度` becomes
//! `bao-biao-ji-du` instead of disappearing.

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a slug from the provided text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let transliterated = transliterate_to_ascii(input);
    let candidate = slugify(&transliterated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            // slugify decides what survives
            None => output.push(ch),
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_separators_become_dashes() {
        let slug = derive_slug("/sales/q1").expect("slug");
        assert_eq!(slug, "sales-q1");
    }

    #[test]
    fn chinese_segments_are_transliterated() {
        let slug = derive_slug("/报表/季度").expect("slug");
        assert_eq!(slug, "bao-biao-ji-du");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn punctuation_only_input_is_unrepresentable() {
        let err = derive_slug("/").expect_err("no slug characters");
        assert_eq!(
            err,
            SlugError::Unrepresentable {
                input: "/".to_string()
            }
        );
    }
}
