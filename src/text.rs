//! # Text Fitting
//!
//! Truncation and line breaking against a measured width. Everything here
//! goes through [`TextMeasure`], so callers get the same answer the PDF will
//! show.

use crate::font::{StandardFont, TextMeasure};

pub const ELLIPSIS: &str = "...";

/// Shorten `text` until it fits in `available` points.
///
/// Trailing characters are dropped and `...` appended until the result fits.
/// Text that already fits comes back unchanged. When not even the ellipsis
/// fits, as many dots as fit are returned (possibly none). Never fails, and
/// the result never measures wider than `available` (for `available >= 0`).
pub fn truncate_to_width<M: TextMeasure + ?Sized>(
    text: &str,
    available: f64,
    measure: &M,
    font: StandardFont,
    font_size: f64,
) -> String {
    if measure.measure(text, font, font_size) <= available {
        return text.to_string();
    }
    if measure.measure(ELLIPSIS, font, font_size) > available {
        let mut dots = String::new();
        while dots.len() < ELLIPSIS.len() {
            dots.push('.');
            if measure.measure(&dots, font, font_size) > available {
                dots.pop();
                break;
            }
        }
        return dots;
    }

    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    while let Some(end) = boundaries.pop() {
        let candidate = format!("{}{}", text[..end].trim_end(), ELLIPSIS);
        if measure.measure(&candidate, font, font_size) <= available {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Greedy word wrap. Explicit `\n` always breaks; words wider than the line
/// are split between characters. Always returns at least one line.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    max_width: f64,
    measure: &M,
    font: StandardFont,
    font_size: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if measure.measure(&candidate, font, font_size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure.measure(word, font, font_size) <= max_width {
                current = word.to_string();
            } else {
                // hard-break an overlong word
                for ch in word.chars() {
                    current.push(ch);
                    if measure.measure(&current, font, font_size) > max_width
                        && current.chars().count() > 1
                    {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    }
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split a label into two lines at the word boundary that best balances the
/// two halves. `None` for single-word labels.
pub fn split_at_balanced_space<M: TextMeasure + ?Sized>(
    label: &str,
    measure: &M,
    font: StandardFont,
    font_size: f64,
) -> Option<(String, String)> {
    let mut best: Option<(f64, usize)> = None;
    for (idx, ch) in label.char_indices() {
        if ch != ' ' {
            continue;
        }
        let left = measure.measure(label[..idx].trim_end(), font, font_size);
        let right = measure.measure(label[idx..].trim_start(), font, font_size);
        let widest = left.max(right);
        if best.map_or(true, |(w, _)| widest < w) {
            best = Some((widest, idx));
        }
    }
    let (_, idx) = best?;
    let left = label[..idx].trim_end();
    let right = label[idx..].trim_start();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}
