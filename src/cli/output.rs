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
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

pub fn print_result(result: &TrainingResult) {
    print_kv("Episodes", &format_number(result.episodes));
    print_kv("Total steps", &format_number(result.total_steps));
    print_kv("Mean return", &format!("{:.3}", result.mean_return));
    print_kv("Mean steps", &format!("{:.2}", result.mean_steps));
    print_kv(
        "Reached terminal",
        &format!("{:.1}%", result.terminal_rate * 100.0),
    );
    print_kv("Best / worst", &format!("{:.1} / {:.1}", result.best_return, result.worst_return));
    if result.truncated > 0 {
        print_kv("Truncated", &format_number(result.truncated));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
