//! # Page Break Decisions
//!
//! Decides whether a block of rows goes on the current page or the next.
//! Rows are never split, so the only question is where the next block
//! starts.

/// What to do with the next block before placing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Place on the current page.
    Place,
    /// Close the page and place it on a fresh one.
    NewPage,
}

/// Given the space left on a page and the heights of the rows about to be
/// placed, decide whether to break first.
///
/// `keep_together` rows at the front of `row_heights` must share a page (a
/// group heading and its first record, say). Everything after them is
/// checked row by row as it is placed, so only the kept prefix matters here.
///
/// At the top of a page the answer is always `Place`: a fresh page is as
/// good as it gets, and breaking again would only consume pages.
pub fn decide_break(
    remaining_height: f64,
    row_heights: &[f64],
    keep_together: usize,
    at_page_top: bool,
) -> BreakDecision {
    if at_page_top {
        return BreakDecision::Place;
    }

    let kept = keep_together.max(1).min(row_heights.len());
    let needed: f64 = row_heights[..kept].iter().sum();

    if needed <= remaining_height {
        BreakDecision::Place
    } else {
        BreakDecision::NewPage
    }
}
