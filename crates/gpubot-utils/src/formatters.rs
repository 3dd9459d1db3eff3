use chrono::{DateTime, Duration, Utc};
use gpubot_core::Instance;

/// Days a stopped instance's resources stay reserved before the service
/// frees them.
pub const RELEASE_GRACE_DAYS: i64 = 15;

/// Format a duration as its most significant nonzero units.
pub fn format_duration(d: Duration) -> String {
    let days = d.num_days();
    let hours = d.num_hours() % 24;
    let mins = d.num_minutes() % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Render the release-time projection for one instance.
///
/// The service frees a stopped instance's reservation [`RELEASE_GRACE_DAYS`]
/// after the stop timestamp. An unparseable timestamp yields an inline
/// marker rather than an error so one bad instance cannot abort a report.
pub fn format_release(stopped_at: &str, now: DateTime<Utc>) -> String {
    let Ok(stopped) = DateTime::parse_from_rfc3339(stopped_at) else {
        return "release: parse failed".to_string();
    };

    let release_at = stopped.with_timezone(&Utc) + Duration::days(RELEASE_GRACE_DAYS);
    let remaining = release_at - now;
    if remaining > Duration::zero() {
        format!("release: in {}", format_duration(remaining))
    } else {
        "release: already released".to_string()
    }
}

/// Render the full GPU status report for a list of instances.
///
/// Instances are separated by a divider line, with none after the last.
pub fn render_status_report(instances: &[Instance], now: DateTime<Utc>) -> String {
    let mut report = String::new();
    for (i, instance) in instances.iter().enumerate() {
        report.push_str(&format!(
            "machine: {}-{}\n",
            instance.region_name, instance.machine_alias
        ));
        report.push_str(&format!("uuid: {}\n", instance.uuid));
        report.push_str(&format!(
            "gpu: {}/{}\n",
            instance.gpu_idle_num, instance.gpu_all_num
        ));
        report.push_str(&format_release(&instance.stopped_at.time, now));
        report.push('\n');
        if i < instances.len() - 1 {
            report.push_str("----------------\n");
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpubot_core::StoppedAt;

    fn instance(uuid: &str, stopped: &str) -> Instance {
        Instance {
            uuid: uuid.to_string(),
            region_name: "west-B".to_string(),
            machine_alias: "3090-box".to_string(),
            gpu_all_num: 4,
            gpu_idle_num: 2,
            stopped_at: StoppedAt {
                time: stopped.to_string(),
            },
        }
    }

    #[test]
    fn duration_uses_most_significant_units() {
        assert_eq!(format_duration(Duration::minutes(30)), "30m");
        assert_eq!(format_duration(Duration::minutes(61)), "1h 1m");
        assert_eq!(
            format_duration(Duration::days(1) + Duration::hours(1) + Duration::minutes(1)),
            "1d 1h 1m"
        );
    }

    #[test]
    fn release_elapsed_after_grace_period() {
        let now = Utc::now();
        let stopped = (now - Duration::days(20)).to_rfc3339();
        assert_eq!(format_release(&stopped, now), "release: already released");
    }

    #[test]
    fn release_pending_shows_remaining_days() {
        let now = Utc::now();
        let stopped = (now - Duration::days(10)).to_rfc3339();
        let line = format_release(&stopped, now);
        // 5 days of grace left, give or take the minute this test runs in.
        assert!(line.starts_with("release: in 4d") || line.starts_with("release: in 5d"));
    }

    #[test]
    fn release_parse_failure_is_inline() {
        let now = Utc::now();
        assert_eq!(format_release("", now), "release: parse failed");
        assert_eq!(format_release("not-a-time", now), "release: parse failed");
    }

    #[test]
    fn report_separates_instances_with_divider() {
        let now = Utc::now();
        let stopped = (now - Duration::days(1)).to_rfc3339();
        let instances = vec![instance("uuid-1", &stopped), instance("uuid-2", "")];

        let report = render_status_report(&instances, now);
        assert_eq!(report.matches("----------------").count(), 1);
        assert!(report.contains("machine: west-B-3090-box"));
        assert!(report.contains("uuid: uuid-1"));
        assert!(report.contains("gpu: 2/4"));
        // The bad timestamp only marks its own instance.
        assert!(report.contains("release: parse failed"));
        // Stopped one day ago, so exactly 14 days of grace remain.
        assert!(report.contains("release: in 14d"));
        assert!(!report.ends_with("----------------\n"));
    }

    #[test]
    fn report_for_empty_list_is_empty() {
        assert_eq!(render_status_report(&[], Utc::now()), "");
    }
}
