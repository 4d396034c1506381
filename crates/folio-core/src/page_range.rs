// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-range mini-syntax: "1-3,5" style selections and "3,1,2" style orders.
//
// Parsing is forgiving: malformed parts are skipped rather than rejected, and
// page numbers outside 1..=max are clipped away. An empty selection string
// means "every page".

use std::collections::BTreeSet;

/// Parse a selection such as `"1-3, 5, 8-10"` against a document of `max`
/// pages, returning sorted, de-duplicated 1-based page numbers.
///
/// An empty or whitespace-only string selects every page. Ranges are clipped
/// to `1..=max`; a range whose start exceeds its end selects nothing.
pub fn parse_page_range(input: &str, max: u32) -> Vec<u32> {
    if input.trim().is_empty() {
        return (1..=max).collect();
    }

    let max = i64::from(max);
    let mut pages = BTreeSet::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if part.contains('-') {
            let mut bounds = part.split('-');
            let start = bounds.next().and_then(leading_int);
            let end = bounds.next().and_then(leading_int);
            if let (Some(start), Some(end)) = (start, end) {
                for page in start.max(1)..=end.min(max) {
                    pages.insert(page as u32);
                }
            }
        } else if let Some(page) = leading_int(part).filter(|p| (1..=max).contains(p)) {
            pages.insert(page as u32);
        }
    }

    pages.into_iter().collect()
}

/// Parse an explicit page order such as `"3,1,2"` for the reorder tool.
///
/// Each comma-separated part is read as a single page number; order and
/// repeats are preserved, and numbers outside `1..=max` are dropped. Ranges are
/// not expanded: `"2-4"` reads as page 2.
pub fn parse_page_order(input: &str, max: u32) -> Vec<u32> {
    let max = i64::from(max);
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(leading_int)
        .filter(|page| (1..=max).contains(page))
        .map(|page| page as u32)
        .collect()
}

/// Read the integer at the start of `s`, ignoring leading whitespace and any
/// trailing characters. Returns `None` when no digits are present.
///
/// `"12abc"` → 12, `" -3"` → -3, `"abc"` → None. Values too large for `i64`
/// saturate.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }
    let magnitude = rest[..digit_count].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
