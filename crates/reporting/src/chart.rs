//! Time-bucketed chart data: one entry per calendar day over a trailing
//! window, zero-filled, oldest first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use campzap_core::types::DispatchEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Display label, `dd/MM`.
    pub label: String,
    pub sent: u64,
    pub delivered: u64,
    pub read: u64,
}

fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Bucket events by the calendar day of their creation timestamp.
///
/// Buckets are pre-populated for every day in `[today - (days-1), today]`,
/// so the output always has exactly `days` entries in chronological order.
/// Each of the three timestamp columns increments its counter independently
/// (a single event may increment all three). Events whose day falls outside
/// the window are silently ignored.
pub(crate) fn bucket_events<F>(
    events: &[DispatchEvent],
    today: NaiveDate,
    days: u32,
    day_of: F,
) -> Vec<ChartPoint>
where
    F: Fn(&DispatchEvent) -> NaiveDate,
{
    let mut points: Vec<ChartPoint> = (0..days)
        .map(|i| {
            let date = today - chrono::Duration::days((days - 1 - i) as i64);
            ChartPoint {
                label: day_label(date),
                sent: 0,
                delivered: 0,
                read: 0,
            }
        })
        .collect();

    for event in events {
        let label = day_label(day_of(event));
        if let Some(point) = points.iter_mut().find(|p| p.label == label) {
            if event.sent_at.is_some() {
                point.sent += 1;
            }
            if event.delivered_at.is_some() {
                point.delivered += 1;
            }
            if event.read_at.is_some() {
                point.read += 1;
            }
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use campzap_core::types::MessageType;
    use uuid::Uuid;

    fn event_on(day: NaiveDate, sent: bool, delivered: bool, read: bool) -> DispatchEvent {
        let ts = Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap());
        DispatchEvent {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            contact_id: None,
            contact_name: None,
            contact_phone: "+5511".to_string(),
            message_type: MessageType::Text,
            sent_at: sent.then_some(ts),
            delivered_at: delivered.then_some(ts),
            read_at: read.then_some(ts),
            created_at: ts,
        }
    }

    fn utc_day(event: &DispatchEvent) -> NaiveDate {
        event.created_at.date_naive()
    }

    #[test]
    fn test_window_is_always_fully_populated() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let points = bucket_events(&[], today, 7, utc_day);

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].label, "24/08");
        assert_eq!(points[6].label, "30/08");
        assert!(points.iter().all(|p| p.sent == 0 && p.delivered == 0 && p.read == 0));
    }

    #[test]
    fn test_counters_increment_independently() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let events = vec![
            // Fully progressed: all three counters on the 29th.
            event_on(NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(), true, true, true),
            // Read set but delivered null: read counts, delivered does not.
            event_on(NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(), true, false, true),
            // Sent only, on the 30th.
            event_on(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(), true, false, false),
        ];
        let points = bucket_events(&events, today, 7, utc_day);

        let day29 = points.iter().find(|p| p.label == "29/08").unwrap();
        assert_eq!((day29.sent, day29.delivered, day29.read), (2, 1, 2));

        let day30 = points.iter().find(|p| p.label == "30/08").unwrap();
        assert_eq!((day30.sent, day30.delivered, day30.read), (1, 0, 0));
    }

    #[test]
    fn test_out_of_range_events_ignored() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let events = vec![event_on(
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            true,
            true,
            true,
        )];
        let points = bucket_events(&events, today, 7, utc_day);
        assert!(points.iter().all(|p| p.sent == 0));
    }

    #[test]
    fn test_output_order_follows_day_sequence_not_arrival() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        // Newest first in the input.
        let events = vec![
            event_on(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(), true, false, false),
            event_on(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(), true, false, false),
        ];
        let points = bucket_events(&events, today, 7, utc_day);
        assert_eq!(points[0].label, "24/08");
        assert_eq!(points[0].sent, 1);
        assert_eq!(points[6].label, "30/08");
        assert_eq!(points[6].sent, 1);
    }
}
