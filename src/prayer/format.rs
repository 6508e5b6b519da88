use chrono::{Datelike, NaiveDate, NaiveTime};

/// 24 小时制 HH:MM 转为 12 小时制 "h:mm AM"
pub fn format_prayer_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// 日期格式化为 "October 16, 2026"
pub fn format_date<D: Datelike>(date: &D) -> String {
    match NaiveDate::from_ymd_opt(date.year(), date.month(), date.day()) {
        Some(d) => d.format("%B %-d, %Y").to_string(),
        None => String::new(),
    }
}
