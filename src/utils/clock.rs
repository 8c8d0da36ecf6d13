//! 门户本地时间
//!
//! 日程的开始时间以 ISO 字符串保存，可能带时区（托管数据库返回的 timestamptz），
//! 也可能不带（表单里的 datetime-local）。不带时区的按门户本地时区解释。

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalClock {
    offset: FixedOffset,
}

impl PortalClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// 超出范围的偏移回退到 UTC
    pub fn from_offset_minutes(minutes: i32) -> Self {
        FixedOffset::east_opt(minutes.saturating_mul(60))
            .map(Self::new)
            .unwrap_or_else(Self::utc)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// 解析 ISO 时间戳，统一转换到本地时区
    pub fn parse(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&self.offset));
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })?;

        self.offset.from_local_datetime(&naive).single()
    }

    /// 时间戳所在的本地日期
    pub fn local_date(&self, value: &str) -> Option<NaiveDate> {
        self.parse(value).map(|dt| dt.date_naive())
    }
}

/// 某天新建日程的默认时段：09:00 - 10:00
pub fn default_slot(day: NaiveDate) -> (String, String) {
    (
        day.format("%Y-%m-%dT09:00").to_string(),
        day.format("%Y-%m-%dT10:00").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_naive_and_offset_forms() {
        let clock = PortalClock::utc();
        let naive = clock.parse("2024-06-01T09:00").unwrap();
        assert_eq!(naive.hour(), 9);

        let with_seconds = clock.parse("2024-06-01T14:00:00.000").unwrap();
        assert_eq!(with_seconds.hour(), 14);

        let rfc = clock.parse("2024-06-01T09:00:00+00:00").unwrap();
        assert_eq!(rfc, naive);

        let date_only = clock.parse("2024-06-03").unwrap();
        assert_eq!(date_only.hour(), 0);

        assert!(clock.parse("next tuesday").is_none());
    }

    #[test]
    fn test_local_date_uses_portal_offset() {
        // UTC-3：UTC 凌晨 01:00 仍属于前一天
        let clock = PortalClock::from_offset_minutes(-180);
        assert_eq!(
            clock.local_date("2024-06-02T01:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        // 不带时区的时间按本地时间解释
        assert_eq!(
            clock.local_date("2024-06-02T01:00"),
            NaiveDate::from_ymd_opt(2024, 6, 2)
        );
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        assert_eq!(PortalClock::from_offset_minutes(100_000), PortalClock::utc());
    }

    #[test]
    fn test_default_slot() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(
            default_slot(day),
            ("2024-06-05T09:00".to_string(), "2024-06-05T10:00".to_string())
        );
    }
}
