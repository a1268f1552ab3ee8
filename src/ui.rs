use colored::{ColoredString, Colorize};
use declarative::ApplyResult;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Symbol for the outcome of one resource
pub fn result_symbol(result: &ApplyResult) -> ColoredString {
    match result {
        ApplyResult::NoChange => "○".dimmed(),
        ApplyResult::Created => "✓".green(),
        ApplyResult::Recreated => "↻".yellow(),
        ApplyResult::Unsupported { .. } => "⚠".yellow(),
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".dimmed(),
    }
}

/// "1 view", "3 views"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(0, "bucket"), "0 buckets");
        assert_eq!(plural(1, "view"), "1 view");
        assert_eq!(plural(12, "package"), "12 packages");
    }

    #[test]
    fn test_result_symbol() {
        colored::control::set_override(false);
        assert_eq!(result_symbol(&ApplyResult::Created).to_string(), "✓");
        assert_eq!(
            result_symbol(&ApplyResult::Failed {
                error: "HTTP 400".into()
            })
            .to_string(),
            "✗"
        );
    }
}
