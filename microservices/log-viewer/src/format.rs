//! Row rendering

use chrono::{DateTime, Utc};
use logpipe_store::{ApiLogRow, SystemMetricRow};

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v))
}

pub fn api_log_line(row: &ApiLogRow) -> String {
    let method = row.method.as_deref().unwrap_or("GET");
    let endpoint = row.endpoint.as_deref().unwrap_or("-");
    let prefix = format!("#{} [{}] {} {}", row.id, timestamp(&row.timestamp), method, endpoint);

    match (&row.error, &row.error_code) {
        (Some(error), code) => format!(
            "{} -> ERROR {}: {}",
            prefix,
            code.as_deref().unwrap_or("UNKNOWN"),
            error
        ),
        (None, _) => {
            let status = row.status.map_or_else(|| "-".to_string(), |s| s.to_string());
            let time = row
                .response_time
                .map_or_else(|| "-".to_string(), |ms| format!("{:.2}ms", ms));
            format!("{} -> {} ({})", prefix, status, time)
        }
    }
}

pub fn metric_line(row: &SystemMetricRow) -> String {
    format!(
        "#{} [{}] CPU {} | Memory {} | Disk {} | Active requests {}",
        row.id,
        timestamp(&row.timestamp),
        percent(row.cpu),
        percent(row.memory),
        percent(row.disk_usage),
        row.active_requests.map_or_else(|| "-".to_string(), |n| n.to_string())
    )
}
