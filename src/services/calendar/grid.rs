//! 月历网格
//!
//! 从包含当月 1 日那一周的周日，到包含当月最后一天那一周的周六。
//! 日程按开始时间所在的本地日期归入某一天，不做跨天展开。

use std::collections::HashMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::events::{CalendarDay, CalendarEvent, CalendarMonthResponse};
use crate::utils::{PortalClock, default_slot};

/// 网格的第一天与最后一天（含）
pub fn month_span(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = reference.with_day(1).unwrap_or(reference);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);

    let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
    let end = last + Duration::days(6 - last.weekday().num_days_from_sunday() as i64);
    (start, end)
}

pub fn build_month_grid(
    reference: NaiveDate,
    today: NaiveDate,
    events: &[CalendarEvent],
    clock: &PortalClock,
) -> CalendarMonthResponse {
    let (start, end) = month_span(reference);

    // 无法解析开始时间的日程不出现在网格中
    let mut by_day: HashMap<NaiveDate, Vec<(i64, CalendarEvent)>> = HashMap::new();
    for event in events {
        if let Some(at) = clock.parse(&event.start) {
            let day = at.date_naive();
            if day >= start && day <= end {
                by_day
                    .entry(day)
                    .or_default()
                    .push((at.timestamp_millis(), event.clone()));
            }
        }
    }

    let days = start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let mut day_events = by_day.remove(&day).unwrap_or_default();
            day_events.sort_by_key(|(at, _)| *at);
            let (default_start, default_end) = default_slot(day);
            CalendarDay {
                date: day,
                in_month: day.month() == reference.month() && day.year() == reference.year(),
                is_today: day == today,
                events: day_events.into_iter().map(|(_, event)| event).collect(),
                default_start,
                default_end,
            }
        })
        .collect();

    CalendarMonthResponse {
        year: reference.year(),
        month: reference.month(),
        today,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::EventCategory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, start: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: format!("Event {id}"),
            description: String::new(),
            start: start.to_string(),
            end: start.to_string(),
            category: EventCategory::Exam,
            subject: None,
            created_by: "u-teacher-1".to_string(),
        }
    }

    #[test]
    fn test_span_covers_whole_weeks() {
        // 2024-05-01 是周三，2024-05-31 是周五
        let (start, end) = month_span(date(2024, 5, 17));
        assert_eq!(start, date(2024, 4, 28));
        assert_eq!(end, date(2024, 6, 1));
    }

    #[test]
    fn test_grid_is_whole_weeks_containing_month() {
        let clock = PortalClock::utc();
        for month in 1..=12 {
            let reference = date(2025, month, 10);
            let grid = build_month_grid(reference, reference, &[], &clock);
            assert_eq!(grid.days.len() % 7, 0);

            let first = reference.with_day(1).unwrap();
            let last = first.checked_add_months(Months::new(1)).unwrap().pred_opt().unwrap();
            assert!(grid.days.iter().any(|d| d.date == first && d.in_month));
            assert!(grid.days.iter().any(|d| d.date == last && d.in_month));
            assert_eq!(grid.days[0].date.weekday(), chrono::Weekday::Sun);
        }
    }

    #[test]
    fn test_month_starting_on_sunday() {
        // 2024-09-01 是周日
        let (start, _) = month_span(date(2024, 9, 1));
        assert_eq!(start, date(2024, 9, 1));
    }

    #[test]
    fn test_events_placed_by_local_start_date() {
        let clock = PortalClock::from_offset_minutes(-180);
        let events = vec![
            event("late", "2024-05-10T16:00"),
            event("early", "2024-05-10T08:00"),
            // UTC 02:00 在 UTC-3 是前一天
            event("shifted", "2024-05-11T02:00:00Z"),
            event("broken", "someday"),
        ];
        let grid = build_month_grid(date(2024, 5, 1), date(2024, 5, 2), &events, &clock);

        let tenth = grid.days.iter().find(|d| d.date == date(2024, 5, 10)).unwrap();
        let ids: Vec<&str> = tenth.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "shifted"]);
        assert_eq!(tenth.default_start, "2024-05-10T09:00");

        let total: usize = grid.days.iter().map(|d| d.events.len()).sum();
        assert_eq!(total, 3);
        assert!(grid.days.iter().find(|d| d.date == date(2024, 5, 2)).unwrap().is_today);
    }
}
