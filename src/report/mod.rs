//! Dashboard and payroll figures, derived from the full log history on every
//! request.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    model::{
        employee::Employee,
        time_log::{Direction, TimeLog},
    },
    utils::locale,
};

const MS_PER_HOUR: f64 = 3_600_000.0;
const WEEK_MS: i64 = 7 * 24 * 3_600_000;
/// Shifts this long or longer are treated as a forgotten punch.
pub const MAX_SHIFT_HOURS: f64 = 14.0;
/// Pairs spanning this long or longer are left out of the daily chart.
pub const MAX_PAIR_HOURS: f64 = 24.0;
pub const CHART_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayHours {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(example = "seg")]
    pub label: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeWeek {
    pub employee_id: String,
    pub name: String,
    pub hours: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyTotals {
    pub hours: f64,
    pub cost: f64,
    /// Per-employee hours and cost, keyed by employee id.
    pub by_employee: HashMap<String, (f64, f64)>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub active_today: usize,
    pub total_employees: usize,
    pub inactive_today: usize,
    pub weekly_hours: f64,
    pub daily: Vec<DayHours>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayrollStats {
    #[serde(flatten)]
    pub dashboard: DashboardStats,
    pub weekly_cost: f64,
    pub employees: Vec<EmployeeWeek>,
}

fn hours_between(start_ms: i64, end_ms: i64) -> f64 {
    (end_ms - start_ms) as f64 / MS_PER_HOUR
}

/// Epoch millis of local midnight starting `date`.
fn day_start_ms<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|at| at.timestamp_millis())
}

/// Roster members with at least one punch since local midnight.
pub fn active_today<Tz: TimeZone>(
    employees: &[Employee],
    logs: &[TimeLog],
    now: &DateTime<Tz>,
) -> usize {
    let since = day_start_ms(&now.timezone(), now.date_naive()).unwrap_or(now.timestamp_millis());
    let roster: HashSet<&str> = employees
        .iter()
        .filter(|e| e.active)
        .map(|e| e.id.as_str())
        .collect();

    logs.iter()
        .filter(|log| log.timestamp >= since)
        .map(|log| log.employee_id.as_str())
        .filter(|id| roster.contains(id))
        .collect::<HashSet<_>>()
        .len()
}

/// Worked hours (and cost, where the hourly rate is known) over the last
/// seven days. Each OUT closes the employee's open IN; unmatched punches and
/// shifts of `MAX_SHIFT_HOURS` or more contribute nothing.
pub fn weekly_totals(employees: &[Employee], logs: &[TimeLog], now_ms: i64) -> WeeklyTotals {
    let cutoff = now_ms - WEEK_MS;
    let mut window: Vec<&TimeLog> = logs.iter().filter(|l| l.timestamp >= cutoff).collect();
    window.sort_by_key(|l| l.timestamp);

    let rates: HashMap<&str, f64> = employees
        .iter()
        .map(|e| (e.id.as_str(), e.hourly_rate))
        .collect();
    let mut open: HashMap<&str, i64> = HashMap::new();
    let mut totals = WeeklyTotals::default();

    for log in window {
        match log.direction {
            Direction::In => {
                open.insert(log.employee_id.as_str(), log.timestamp);
            }
            Direction::Out => {
                let Some(start) = open.remove(log.employee_id.as_str()) else {
                    continue;
                };
                let hours = hours_between(start, log.timestamp);
                if hours >= MAX_SHIFT_HOURS {
                    continue;
                }
                let cost = rates
                    .get(log.employee_id.as_str())
                    .map(|rate| hours * rate)
                    .unwrap_or(0.0);

                totals.hours += hours;
                totals.cost += cost;
                let entry = totals
                    .by_employee
                    .entry(log.employee_id.clone())
                    .or_insert((0.0, 0.0));
                entry.0 += hours;
                entry.1 += cost;
            }
        }
    }
    totals
}

/// Hours per calendar day for the last `CHART_DAYS` days, oldest first. An
/// OUT is paired with the nearest earlier IN of the same employee in log
/// order, and the hours land on the day that IN happened.
pub fn daily_hours<Tz: TimeZone>(logs: &[TimeLog], now: &DateTime<Tz>) -> Vec<DayHours> {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut days: Vec<DayHours> = (0..CHART_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DayHours {
                date,
                label: locale::weekday_short(date).to_string(),
                hours: 0.0,
            }
        })
        .collect();

    for (index, log) in logs.iter().enumerate() {
        if log.direction != Direction::Out {
            continue;
        }
        let paired_in = logs[..index]
            .iter()
            .rev()
            .find(|prev| prev.employee_id == log.employee_id && prev.direction == Direction::In);
        let Some(paired_in) = paired_in else {
            continue;
        };

        let hours = hours_between(paired_in.timestamp, log.timestamp);
        if !(0.0..MAX_PAIR_HOURS).contains(&hours) {
            continue;
        }
        let Some(started) = locale::from_millis(&tz, paired_in.timestamp) else {
            continue;
        };
        let date = started.date_naive();
        if let Some(day) = days.iter_mut().find(|d| d.date == date) {
            day.hours += hours;
        }
    }
    days
}

pub fn dashboard<Tz: TimeZone>(
    employees: &[Employee],
    logs: &[TimeLog],
    now: &DateTime<Tz>,
) -> DashboardStats {
    let active_today = active_today(employees, logs, now);
    let total_employees = employees.iter().filter(|e| e.active).count();
    let weekly = weekly_totals(employees, logs, now.timestamp_millis());

    DashboardStats {
        active_today,
        total_employees,
        inactive_today: total_employees.saturating_sub(active_today),
        weekly_hours: weekly.hours,
        daily: daily_hours(logs, now),
    }
}

/// Dashboard figures plus labor cost, broken down per roster member.
pub fn payroll<Tz: TimeZone>(
    employees: &[Employee],
    logs: &[TimeLog],
    now: &DateTime<Tz>,
) -> PayrollStats {
    let weekly = weekly_totals(employees, logs, now.timestamp_millis());
    let rows = employees
        .iter()
        .map(|e| {
            let (hours, cost) = weekly
                .by_employee
                .get(&e.id)
                .copied()
                .unwrap_or((0.0, 0.0));
            EmployeeWeek {
                employee_id: e.id.clone(),
                name: e.name.clone(),
                hours,
                cost,
            }
        })
        .collect();

    PayrollStats {
        dashboard: dashboard(employees, logs, now),
        weekly_cost: weekly.cost,
        employees: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed;
    use chrono::FixedOffset;

    const HOUR: i64 = 3_600_000;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    /// Friday 2026-10-16 15:00 local (UTC-3).
    fn now() -> DateTime<FixedOffset> {
        brt().with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap()
    }

    fn local_ms(day: u32, hour: u32) -> i64 {
        brt()
            .with_ymd_and_hms(2026, 10, day, hour, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn log(employee: &str, timestamp: i64, direction: Direction) -> TimeLog {
        TimeLog {
            id: format!("{employee}@{timestamp}"),
            employee_id: employee.into(),
            site_id: "1".into(),
            timestamp,
            direction,
            photo_snapshot: String::new(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn two_hour_shift_costs_twice_the_rate() {
        let t0 = local_ms(16, 8);
        let logs = vec![log("1", t0, Direction::In), log("1", t0 + 2 * HOUR, Direction::Out)];

        let totals = weekly_totals(&seed::employees(), &logs, now().timestamp_millis());
        assert!(close(totals.hours, 2.0));
        assert!(close(totals.cost, 2.0 * 35.0));
    }

    #[test]
    fn shift_over_sanity_limit_is_dropped() {
        let t0 = local_ms(14, 6);
        let logs = vec![log("2", t0, Direction::In), log("2", t0 + 15 * HOUR, Direction::Out)];

        let totals = weekly_totals(&seed::employees(), &logs, now().timestamp_millis());
        assert_eq!(totals.hours, 0.0);
        assert_eq!(totals.cost, 0.0);
    }

    #[test]
    fn unmatched_punches_contribute_nothing() {
        let logs = vec![
            log("1", local_ms(15, 17), Direction::Out),
            log("2", local_ms(16, 7), Direction::In),
        ];

        let totals = weekly_totals(&seed::employees(), &logs, now().timestamp_millis());
        assert_eq!(totals.hours, 0.0);
        assert!(daily_hours(&logs, &now()).iter().all(|d| d.hours == 0.0));
    }

    #[test]
    fn unknown_employee_counts_hours_but_not_cost() {
        let t0 = local_ms(15, 8);
        let logs = vec![log("77", t0, Direction::In), log("77", t0 + 3 * HOUR, Direction::Out)];

        let totals = weekly_totals(&seed::employees(), &logs, now().timestamp_millis());
        assert!(close(totals.hours, 3.0));
        assert_eq!(totals.cost, 0.0);
    }

    #[test]
    fn week_window_excludes_older_pairs_and_sorts_by_time() {
        let old = local_ms(8, 8);
        let t0 = local_ms(13, 8);
        // recorded out of order
        let logs = vec![
            log("1", old, Direction::In),
            log("1", old + HOUR, Direction::Out),
            log("2", t0 + 4 * HOUR, Direction::Out),
            log("2", t0, Direction::In),
        ];

        let totals = weekly_totals(&seed::employees(), &logs, now().timestamp_millis());
        assert!(close(totals.hours, 4.0));
        assert!(close(totals.cost, 4.0 * 85.0));
        assert_eq!(totals.by_employee.len(), 1);
    }

    #[test]
    fn active_today_counts_distinct_roster_members_since_midnight() {
        let logs = vec![
            log("1", local_ms(15, 23), Direction::In),
            log("1", local_ms(16, 1), Direction::Out),
            log("1", local_ms(16, 7), Direction::In),
            log("2", local_ms(15, 9), Direction::In),
            log("ghost", local_ms(16, 8), Direction::In),
        ];
        let employees = seed::employees();

        let active = active_today(&employees, &logs, &now());
        assert_eq!(active, 1);
        assert!(active <= employees.len());
    }

    #[test]
    fn deactivated_employee_drops_out_of_today_counts() {
        let logs = vec![
            log("1", local_ms(16, 7), Direction::In),
            log("2", local_ms(16, 8), Direction::In),
        ];
        let mut employees = seed::employees();
        employees.iter_mut().find(|e| e.id == "2").unwrap().active = false;

        let stats = dashboard(&employees, &logs, &now());
        assert_eq!(stats.active_today, 1);
        assert!(stats.active_today <= stats.total_employees);
        assert_eq!(
            stats.active_today + stats.inactive_today,
            stats.total_employees
        );
    }

    #[test]
    fn daily_series_covers_last_seven_days_and_buckets_by_in_day() {
        let logs = vec![
            // overnight shift: IN on the 14th, OUT on the 15th
            log("1", local_ms(14, 22), Direction::In),
            log("1", local_ms(15, 4), Direction::Out),
            log("2", local_ms(16, 8), Direction::In),
            log("2", local_ms(16, 10), Direction::Out),
            // 30h pair is ignored
            log("2", local_ms(10, 8), Direction::In),
            log("2", local_ms(11, 14), Direction::Out),
        ];

        let days = daily_hours(&logs, &now());
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 10).unwrap());
        assert_eq!(days[0].label, "sáb");
        assert_eq!(days[6].label, "sex");

        let by_day: Vec<f64> = days.iter().map(|d| d.hours).collect();
        assert_eq!(by_day, vec![0.0, 0.0, 0.0, 0.0, 6.0, 0.0, 2.0]);
    }

    #[test]
    fn payroll_lists_every_roster_member() {
        let t0 = local_ms(16, 7);
        let logs = vec![log("1", t0, Direction::In), log("1", t0 + 5 * HOUR, Direction::Out)];

        let stats = payroll(&seed::employees(), &logs, &now());
        assert!(close(stats.weekly_cost, 175.0));
        assert_eq!(stats.employees.len(), 2);
        assert!(close(stats.employees[0].hours, 5.0));
        assert_eq!(stats.employees[1].hours, 0.0);
        assert_eq!(stats.dashboard.active_today, 1);
        assert_eq!(stats.dashboard.inactive_today, 1);
        assert_eq!(stats.dashboard.total_employees, 2);
    }
}
