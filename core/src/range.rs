//! Restriction of which draws the debugger considers, by prim index within a frame.
//!
//! A rule is a comma separated list of tokens, `A`, `A-B`, `!A` or `!A-B`.
//! Plain tokens add the inclusive range `[A, B]`. A negated token removes
//! `[A, B]` from what has been built so far, or, if nothing has, selects
//! everything but `[A, B]`.

use crate::config::MAX_PRIMS;
use crate::error::{Error, Result};

/// Closed interval of 1-based prim indices. `lo > hi` never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimRange {
    pub lo: i32,
    pub hi: i32,
}

impl PrimRange {
    /// Placeholder left behind when a negation removes a whole interval.
    pub const DELETED: Self = Self { lo: -1, hi: -1 };

    pub const fn new(lo: i32, hi: i32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, prim: i32) -> bool {
        *self != Self::DELETED && prim >= self.lo && prim <= self.hi
    }
}

#[derive(Debug, Default, Clone)]
pub struct PrimRangeFilter {
    ranges: Vec<PrimRange>,
    rule: String,
}

impl PrimRangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the committed ranges. On a malformed rule nothing changes.
    pub fn set_rule(&mut self, rule: Option<&str>) -> Result<()> {
        let rule = rule.unwrap_or("");
        if rule.is_empty() || rule == "*" {
            self.ranges.clear();
            self.rule.clear();
            return Ok(());
        }

        let ranges = parse_rule(rule)?;
        self.ranges = ranges;
        self.rule = rule.to_string();
        Ok(())
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn ranges(&self) -> &[PrimRange] {
        &self.ranges
    }

    pub fn is_unrestricted(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn is_eligible(&self, prim: i32) -> bool {
        self.ranges.is_empty() || self.ranges.iter().any(|r| r.contains(prim))
    }
}

/// Builds the interval list for `rule` from scratch.
pub fn parse_rule(rule: &str) -> Result<Vec<PrimRange>> {
    let mut updated: Vec<PrimRange> = Vec::new();
    for part in rule.split(',') {
        let part = part.trim();
        match part.strip_prefix('!') {
            Some(negated) if !negated.is_empty() => {
                let range = parse_range(negated)?;
                updated = if updated.is_empty() {
                    complement(range)
                } else {
                    subtract(&updated, range)
                };
            }
            _ => updated.push(parse_range(part)?),
        }
    }
    Ok(updated)
}

/// Parses `A` or `A-B` into `[A, B]`, `B` defaulting to `A`.
fn parse_range(token: &str) -> Result<PrimRange> {
    let invalid = || Error::InvalidRange(token.to_string());
    let parse_int = |s: &str| -> Result<i32> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<i32>().map_err(|_| invalid())
    };

    match token.split_once('-') {
        Some((lo, hi)) => Ok(PrimRange::new(parse_int(lo)?, parse_int(hi)?)),
        None => {
            let prim = parse_int(token)?;
            Ok(PrimRange::new(prim, prim))
        }
    }
}

/// Everything in `[0, MAX_PRIMS]` outside of `range`.
fn complement(range: PrimRange) -> Vec<PrimRange> {
    let mut out = Vec::with_capacity(2);
    if range.lo > 0 {
        out.push(PrimRange::new(0, range.lo - 1));
    }
    if range.hi < MAX_PRIMS {
        out.push(PrimRange::new(range.hi + 1, MAX_PRIMS));
    }
    out
}

/// Removes `range` from each interval of `ranges`, producing a new list.
///
/// Fully covered intervals stay in place as `PrimRange::DELETED`; an interval
/// strictly containing `range` is split, its upper half following the lower.
fn subtract(ranges: &[PrimRange], range: PrimRange) -> Vec<PrimRange> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    for &sub in ranges {
        if sub.hi < range.lo || sub.lo > range.hi {
            out.push(sub);
        } else if sub.lo >= range.lo && sub.hi <= range.hi {
            out.push(PrimRange::DELETED);
        } else if sub.lo < range.lo && sub.hi > range.hi {
            out.push(PrimRange::new(sub.lo, range.lo - 1));
            out.push(PrimRange::new(range.hi + 1, sub.hi));
        } else {
            let mut clipped = sub;
            if sub.lo < range.lo && sub.hi >= range.lo && sub.hi <= range.hi {
                clipped.hi = range.lo - 1;
            }
            if sub.lo >= range.lo && sub.lo <= range.hi && sub.hi > range.hi {
                clipped.lo = range.hi + 1;
            }
            out.push(clipped);
        }
    }
    out
}
