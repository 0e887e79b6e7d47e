//! Terminal output utilities.

use super::planned_file_names;
use crate::models::VpnPlan;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// One line per plan field, then one per client and one per file.
pub fn plan_summary(plan: &VpnPlan) -> Vec<String> {
    let mut lines = vec![
        format!("{},{}", format_field("vpn_subnet", 16), format_field(plan.vpn_subnet, 20)),
        format!("{},{}", format_field("server", 16), format_field(plan.server_address, 20)),
        format!("{},{}", format_field("endpoint", 16), format_field(plan.endpoint_with_port(), 20)),
        format!("{},{}", format_field("device", 16), format_field(&plan.device, 20)),
        format!("{},{}", format_field("remote_network", 16), format_field(plan.remote_network, 20)),
    ];
    lines.extend(plan.client_addresses.iter().enumerate().map(|(i, addr)| {
        format!(
            "{},{}",
            format_field(format!("client{}", i + 1), 16),
            format_field(format!("{addr}/32"), 20)
        )
    }));
    lines.extend(
        planned_file_names(plan)
            .into_iter()
            .map(|name| format!("{},{}", format_field("file", 16), format_field(name, 20))),
    );
    lines
}

/// Print the plan summary to stdout.
pub fn print_plan(plan: &VpnPlan) {
    println!(
        "#{}# {} clients in {}",
        "PLAN".on_blue(),
        plan.client_count(),
        plan.vpn_subnet
    );
    for line in plan_summary(plan) {
        println!("{line}");
    }
}
