use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rewrites recognizable date input as `YYYY-MM-DD` relative to `today`.
/// Anything else is returned verbatim; task dates stay free-form.
pub fn normalize_date_from(input: &str, today: NaiveDate) -> String {
    match resolve_date(input, today) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => input.to_string(),
    }
}

pub fn resolve_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Some(today),
        "tomorrow" | "tom" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        "eow" => {
            // End of week (Sunday)
            let days_to_sunday = (7 - today.weekday().num_days_from_sunday()) % 7;
            return today.checked_add_signed(Duration::days(days_to_sunday as i64));
        }
        "eom" => return end_of_month(today),
        _ => {}
    }

    // 2. Relative format (+Nd, +Nw, +Nm)
    if let Some(rest) = input.strip_prefix('+') {
        return parse_relative(rest, today);
    }

    // 3. ISO date
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Some(date);
    }

    // 4. Weekday format (fri, 2:fri)
    let (count, day_str) = parse_weekday_token(input)?;
    let target = parse_weekday_str(day_str)?;
    if count < 1 {
        return None;
    }
    let mut days_needed =
        target.num_days_from_sunday() as i64 - today.weekday().num_days_from_sunday() as i64;
    if days_needed <= 0 {
        days_needed += 7;
    }
    // count = 1 means the next such day, count = 2 the one after that.
    days_needed += (count - 1) * 7;
    today.checked_add_signed(Duration::days(days_needed))
}

fn parse_relative(rest: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (unit_pos, unit) = rest.char_indices().last()?;
    let count: u32 = rest[..unit_pos].parse().ok()?;
    match unit.to_ascii_lowercase() {
        'd' => today.checked_add_signed(Duration::days(count as i64)),
        'w' => today.checked_add_signed(Duration::weeks(count as i64)),
        // Clamps to the last day of a shorter month (Jan 31 + 1m -> Feb 28).
        'm' => today.checked_add_months(Months::new(count)),
        _ => None,
    }
}

fn end_of_month(today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn parse_weekday_token(input: &str) -> Option<(i64, &str)> {
    match input.split_once(':') {
        Some((count, day)) => count.parse::<i64>().ok().map(|c| (c, day)),
        // Just "fri" means 1:fri
        None => Some((1, input)),
    }
}

fn parse_weekday_str(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
