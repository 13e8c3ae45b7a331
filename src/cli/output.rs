//! Output formatting for CLI

use crate::pipeline::TrainingResult;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a rate as a percentage
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Print the counters of a training or evaluation run
pub fn print_result(result: &TrainingResult) {
    let mut stats = vec![
        ("Environment", result.environment.clone()),
        ("Steps", format_number(result.total_steps)),
        ("Total reward", format!("{:.2}", result.total_reward)),
        ("Table entries", format_number(result.table_entries as u64)),
    ];
    if result.episodes > 0 {
        stats.extend([
            ("Games", format_number(result.episodes as u64)),
            (
                "First player wins",
                format!(
                    "{} ({})",
                    result.first_wins,
                    format_rate(result.first_win_rate)
                ),
            ),
            (
                "Second player wins",
                format!(
                    "{} ({})",
                    result.second_wins,
                    format_rate(result.second_win_rate)
                ),
            ),
            (
                "Draws",
                format!("{} ({})", result.draws, format_rate(result.draw_rate)),
            ),
        ]);
    }
    print_stats_table(&stats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.5), "50.0%");
        assert_eq!(format_rate(0.1234), "12.3%");
    }
}
