//! Turns raw adapter output into the canonical series contract: second
//! timestamps, finite prices, strictly increasing and evenly spaced times.

use common::{Candle, Interval, PriceSnapshot, ProviderError};

/// Timestamps above this are treated as milliseconds (10^11 s is year 5138).
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Gaps wider than this many buckets are not filled; the series restarts after them.
const MAX_GAP_FILL: i64 = 1000;

/// Convert a provider timestamp to UTC seconds.
pub fn normalize_epoch(t: i64) -> i64 {
    if t.unsigned_abs() > MILLIS_THRESHOLD as u64 {
        t / 1000
    } else {
        t
    }
}

/// Normalize raw candles for `interval` and keep the most recent `limit`.
pub fn normalize_candles(
    raw: Vec<Candle>,
    interval: Interval,
    limit: usize,
) -> Result<Vec<Candle>, ProviderError> {
    let step = interval.seconds();
    let mut candles = Vec::with_capacity(raw.len());
    for mut candle in raw {
        validate_candle(&candle)?;
        candle.time = bucket_start(normalize_epoch(candle.time), step);
        candles.push(candle);
    }

    // Stable: among rows snapped into one bucket, the later row wins below.
    candles.sort_by_key(|c| c.time);

    let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match deduped.last_mut() {
            Some(last) if last.time == candle.time => *last = candle,
            _ => deduped.push(candle),
        }
    }

    if deduped.is_empty() {
        return Err(ProviderError::Malformed("empty series".into()));
    }

    let mut filled = fill_gaps(deduped, step);
    if filled.len() > limit {
        filled.drain(..filled.len() - limit);
    }
    Ok(filled)
}

fn validate_candle(c: &Candle) -> Result<(), ProviderError> {
    let prices = [c.open, c.high, c.low, c.close];
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Err(ProviderError::Malformed(format!(
            "non-positive or non-numeric price in candle at {}",
            c.time
        )));
    }
    if !c.volume.is_finite() || c.volume < 0.0 {
        return Err(ProviderError::Malformed(format!(
            "invalid volume in candle at {}",
            c.time
        )));
    }
    Ok(())
}

/// Start of the `step`-wide bucket containing `t`.
fn bucket_start(t: i64, step: i64) -> i64 {
    t - t.rem_euclid(step)
}

/// Insert flat candles at the previous close for missing buckets. A gap too
/// wide to fill drops everything before it, keeping the contiguous tail.
/// Input times must be on the `step` grid and strictly increasing.
fn fill_gaps(candles: Vec<Candle>, step: i64) -> Vec<Candle> {
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        if let Some(prev) = out.last().copied() {
            let missing = (candle.time - prev.time) / step - 1;
            if missing > MAX_GAP_FILL {
                out.clear();
            } else {
                for k in 1..=missing {
                    out.push(Candle::flat(prev.time + k * step, prev.close, 0.0));
                }
            }
        }
        out.push(candle);
    }
    out
}

/// Reject snapshots that carry no usable price.
pub fn validate_snapshot(snapshot: &PriceSnapshot) -> Result<(), ProviderError> {
    if !snapshot.price.is_finite() || snapshot.price <= 0.0 {
        return Err(ProviderError::Malformed(format!(
            "invalid price {}",
            snapshot.price
        )));
    }
    if !snapshot.change_pct.is_finite() {
        return Err(ProviderError::Malformed("non-numeric change percent".into()));
    }
    Ok(())
}
