use iam_user_groups_synthesis::{Inventory, ResourcePlan, ValidationReport};
use std::io::{self, Write};
use std::path::Path;

pub(crate) fn note(msg: &str) {
    let _ = writeln!(io::stderr(), "iam-user-groups: {}", msg);
}

pub(crate) fn error(msg: &str) {
    let _ = writeln!(io::stderr(), "iam-user-groups (error): {}", msg);
}

pub(crate) fn print_plan_summary(plan: &ResourcePlan) {
    let stderr = io::stderr();
    let mut w = stderr.lock();
    let _ = writeln!(w, "IAM Users and Groups Plan");
    let _ = writeln!(w, "Users:     {}", plan.outputs.users.len());
    let _ = writeln!(w, "Groups:    {}", plan.outputs.groups.len());
    let _ = writeln!(w, "Resources: {}", plan.resources.len());
    for user in &plan.outputs.users {
        let mut credentials = Vec::new();
        if user.password.is_some() {
            credentials.push("console password");
        }
        if user.access_key_id.is_some() {
            credentials.push("access key");
        }
        if credentials.is_empty() {
            let _ = writeln!(w, "  + user  {}", user.name);
        } else {
            let _ = writeln!(w, "  + user  {} ({})", user.name, credentials.join(", "));
        }
    }
    for group in &plan.outputs.groups {
        let _ = writeln!(w, "  + group {}", group.name);
    }
    let _ = writeln!(w);
}

/// Membership warnings are already on stderr through the logger.
pub(crate) fn print_validation_report(inventory: &Inventory, report: &ValidationReport) {
    note(&format!(
        "inventory is valid: {} users ({} enabled), {} groups, {} warnings",
        inventory.users.len(),
        inventory.enabled_users().count(),
        inventory.groups.len(),
        report.warnings.len()
    ));
}

pub(crate) fn print_written(path: &Path) {
    note(&format!("wrote {}", path.display()));
}
