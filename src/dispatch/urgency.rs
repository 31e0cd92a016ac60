//! Urgency scoring and ordering of zones in need.

use chrono::NaiveDateTime;

use super::config::UrgencyWeights;
use crate::models::{Zone, ZoneId};

/// Urgency of `zone` at `now`.
///
/// `priority × priority_weight + deadline_scale / (hours_remaining + 1)`.
/// A zone without a deadline gets no deadline term; an overdue deadline
/// counts as zero hours remaining.
///
/// # Examples
///
/// ```
/// use relief_dispatch::dispatch::{urgency, UrgencyWeights};
/// use relief_dispatch::models::{parse_deadline, Zone};
///
/// let now = parse_deadline("2024-11-20 08:00:00").unwrap();
/// let zone = Zone::normal("N", 0.0, 0.0, 10)
///     .with_priority(2.0)
///     .with_deadline(parse_deadline("2024-11-20 17:00:00").unwrap());
///
/// // 2 × 100 + 1000 / (9 + 1)
/// assert_eq!(urgency(&zone, now, &UrgencyWeights::default()), 300.0);
/// ```
pub fn urgency(zone: &Zone, now: NaiveDateTime, weights: &UrgencyWeights) -> f64 {
    let decay = zone
        .hours_until_deadline(now)
        .map_or(0.0, |hours| weights.deadline_scale / (hours + 1.0));
    zone.priority() * weights.priority_weight + decay
}

/// Zones sorted by descending urgency, ties broken by ascending id.
pub fn order_by_urgency<'z>(
    zones: impl IntoIterator<Item = &'z Zone>,
    now: NaiveDateTime,
    weights: &UrgencyWeights,
) -> Vec<(ZoneId, f64)> {
    let mut ranked: Vec<(ZoneId, f64)> = zones
        .into_iter()
        .map(|zone| (zone.id().clone(), urgency(zone, now, weights)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
