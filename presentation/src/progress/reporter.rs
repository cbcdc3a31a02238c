//! Progress reporting for diagnosis runs

use colored::Colorize;
use consilium_application::ProgressNotifier;
use consilium_domain::{Phase, Specialist};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Reports progress during a diagnosis with a progress bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: &Phase) -> &'static str {
        match phase {
            Phase::Consultation => "Phase 1: Specialist Consultation",
            Phase::Synthesis => "Phase 2: Director Synthesis",
        }
    }

    fn phase_short_name(phase: &Phase) -> &'static str {
        match phase {
            Phase::Consultation => "Phase 1",
            Phase::Synthesis => "Phase 2",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let phase_name = Self::phase_display_name(phase);

        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase_name.to_string());
        pb.set_message("Starting...");

        *lock(&self.phase_bar) = Some(pb);
    }

    fn on_specialist_complete(&self, _phase: &Phase, specialist: Specialist, success: bool) {
        if let Some(pb) = lock(&self.phase_bar).as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), specialist)
            } else {
                format!("{} {}", "x".red(), specialist)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: &Phase) {
        if let Some(pb) = lock(&self.phase_bar).take() {
            let phase_name = Self::phase_short_name(phase);
            pb.finish_with_message(format!("{} complete!", phase_name.green()));
        }
    }
}

/// Plain line-based progress on stderr, for non-interactive terminals
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let phase_name = ProgressReporter::phase_display_name(phase);
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            phase_name.bold(),
            total_tasks
        );
    }

    fn on_specialist_complete(&self, _phase: &Phase, specialist: Specialist, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), specialist.display_name());
        } else {
            eprintln!("  {} {} (unavailable)", "x".red(), specialist.display_name());
        }
    }

    fn on_phase_complete(&self, _phase: &Phase) {
        eprintln!();
    }
}
