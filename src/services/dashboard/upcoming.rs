use chrono::NaiveDate;

use crate::models::events::CalendarEvent;
use crate::utils::PortalClock;

// 仪表盘最多展示的近期日程条数，配置值超出时按此截断
pub const MAX_UPCOMING: usize = 5;

/// 开始日期不早于今天的日程，按开始时间升序取前 limit 条（至多 MAX_UPCOMING）
///
/// 开始时间无法解析的日程被排除。
pub fn select_upcoming(
    events: &[CalendarEvent],
    today: NaiveDate,
    clock: &PortalClock,
    limit: usize,
) -> Vec<CalendarEvent> {
    let mut upcoming: Vec<(i64, &CalendarEvent)> = events
        .iter()
        .filter_map(|event| {
            let at = clock.parse(&event.start)?;
            (at.date_naive() >= today).then_some((at.timestamp_millis(), event))
        })
        .collect();

    upcoming.sort_by_key(|(at, _)| *at);
    upcoming
        .into_iter()
        .take(limit.min(MAX_UPCOMING))
        .map(|(_, event)| event.clone())
        .collect()
}

/// 按本地小时给出问候语
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}
