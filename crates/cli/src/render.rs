//! Terminal rendering.

use std::io::Write;

use tokio::sync::watch;
use vendorboard_core::{AnalysisResult, Notification, NotificationLevel, PhaseSequence};
use vendorboard_progress::{StepperSnapshot, StepperState};
use vendorboard_services::DashboardSummary;

/// Redraw a one-line progress indicator on stderr until the stepper goes
/// away.
pub async fn progress_line(mut updates: watch::Receiver<StepperSnapshot>, phases: PhaseSequence) {
    let mut stderr = std::io::stderr();
    while updates.changed().await.is_ok() {
        let line = {
            let snapshot = updates.borrow_and_update();
            let label = match snapshot.state {
                StepperState::Running { index } => {
                    phases.get(index).map_or("", |phase| phase.title.as_str())
                }
                StepperState::Finished => "Waiting for the server",
                StepperState::Idle => continue,
            };
            format!("\r[{:>3}%] {:<40}", snapshot.percent(), label)
        };
        let _ = write!(stderr, "{line}");
        let _ = stderr.flush();
    }
}

/// Clear the progress line.
pub fn clear_line() {
    eprint!("\r{:<48}\r", "");
}

/// Print notifications to stderr.
pub fn notifications(notes: &[Notification]) {
    for note in notes {
        let mark = match note.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "i",
            NotificationLevel::Error => "✗",
        };
        eprintln!("{mark} {}: {}", note.title, note.message);
    }
}

/// Print an analysis result.
pub fn analysis(result: &AnalysisResult) {
    println!("Assessment: {}", result.assessment_id);
    println!("  Success: {}", result.success);
    if !result.message.is_empty() {
        println!("  Message: {}", result.message);
    }
    if let Some(info) = &result.repository_info {
        println!("  Repository: {} ({} files)", info.summary, info.total_files);
    }
    if let Some(summary) = &result.analysis_summary {
        println!("  Items: {}", summary.total_items);
        println!(
            "  Applied: {} ({:.1}%)",
            summary.applied_count, summary.applied_percentage
        );
        println!(
            "  Partially applied: {} ({:.1}%)",
            summary.partially_applied_count, summary.partially_applied_percentage
        );
        println!(
            "  Not applied: {} ({:.1}%)",
            summary.not_applied_count, summary.not_applied_percentage
        );
        println!("  Average score: {:.1}", summary.average_score);
        println!("  Readiness: {}", summary.implementation_readiness);
    }
    println!("  Not implemented: {}", result.not_implemented_count);
}

/// Print the dashboard summary.
pub fn dashboard(summary: &DashboardSummary) {
    println!("Vendors: {}", summary.vendor_count);
    println!("Products: {} ({} approved)", summary.product_count, summary.approved_count);
    if let Some(top) = summary.top_vendor() {
        println!("Top vendor: {} ({} products)", top.name, top.products);
    }
    println!("Distribution:");
    for share in &summary.distribution {
        println!("  {:<30} {:>4} {:>6.1}%", share.name, share.products, share.share);
    }
}
