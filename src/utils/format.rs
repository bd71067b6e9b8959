// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// 将字节数格式化为可读字符串 (B, KB, MB, GB)
pub fn format_size(size_bytes: u64) -> String {
    if size_bytes < KIB {
        format!("{} B", size_bytes)
    } else if size_bytes < MIB {
        format!("{:.2} KB", size_bytes as f64 / KIB as f64)
    } else if size_bytes < GIB {
        format!("{:.2} MB", size_bytes as f64 / MIB as f64)
    } else {
        format!("{:.2} GB", size_bytes as f64 / GIB as f64)
    }
}

/// 将时长格式化为 时/分/秒 字符串
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs_f64();
    if seconds < 60.0 {
        return format!("{:.2}s", seconds);
    }

    let total = duration.as_secs();
    let (hours, remainder) = (total / 3600, total % 3600);
    let (minutes, secs) = (remainder / 60, remainder % 60);
    if hours == 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}h {}m {}s", hours, minutes, secs)
    }
}

/// 每秒处理速率
pub fn rate_per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * MIB + MIB / 2), "5.50 MB");
        assert_eq!(format_size(3 * GIB), "3.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 2m 3s");
    }

    #[test]
    fn test_rate_per_second() {
        assert_eq!(rate_per_second(100, Duration::from_secs(0)), 0.0);
        assert!((rate_per_second(100, Duration::from_secs(4)) - 25.0).abs() < f64::EPSILON);
    }
}
