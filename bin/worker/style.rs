//! Terminal styling for command output

use console::style;
use velonode_worker::JobStatus;

pub fn print_banner() {
    println!(
        "{}",
        style(
            r#"
  ██╗   ██╗███████╗██╗      ██████╗
  ██║   ██║██╔════╝██║     ██╔═══██╗
  ██║   ██║█████╗  ██║     ██║   ██║
  ╚██╗ ██╔╝██╔══╝  ██║     ██║   ██║
   ╚████╔╝ ███████╗███████╗╚██████╔╝
    ╚═══╝  ╚══════╝╚══════╝ ╚═════╝   node worker
"#
        )
        .cyan()
    );
}

pub fn print_header(title: &str) {
    println!();
    println!(
        "{} {}",
        style(title).bold().cyan(),
        style("─".repeat(50usize.saturating_sub(title.len()))).cyan()
    );
    println!();
}

pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", style(format!("{}:", key)).dim(), value);
}

pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", style("⚠").yellow(), style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), style(msg).red());
}

/// Job status padded to `width` and colored by lifecycle stage
pub fn styled_status(status: JobStatus, width: usize) -> String {
    let text = format!("{:<width$}", status.to_string(), width = width);
    match status {
        JobStatus::Open => style(text).yellow().to_string(),
        JobStatus::Assigned => style(text).cyan().to_string(),
        JobStatus::Completed => style(text).green().to_string(),
        JobStatus::Unknown => style(text).dim().to_string(),
    }
}
