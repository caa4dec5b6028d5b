use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use greenwave::core_types::{Candidate, OptimizationResult};
use greenwave::error::TuneResult;
use greenwave::optimizer::{ImproveStats, Population, ProgressCallback, SearchPhase, TrialOutcome};
use greenwave::oracle::EpisodeReport;
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn print_loading_bar(step: usize, total: usize) {
    let pct = if total == 0 {
        100.0
    } else {
        step as f64 * 100.0 / total as f64
    };
    print!("Loading: {:.2}%\r", pct);
    let _ = std::io::stdout().flush();
}

/// Cosmetic progress indicator; redraws only when the hundredth of a percent changes.
pub struct LoadingBar {
    enabled: bool,
    last: AtomicUsize,
}

impl LoadingBar {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn finish(&self) {
        if self.enabled {
            println!();
        }
    }
}

impl ProgressCallback for LoadingBar {
    fn on_progress(&self, _phase: SearchPhase, step: usize, total: usize, _worst: f64) {
        if !self.enabled || total == 0 {
            return;
        }
        let bucket = step * 10_000 / total;
        if self.last.swap(bucket, Ordering::Relaxed) != bucket {
            print_loading_bar(step, total);
        }
    }
}

pub fn print_population(title: &str, population: &Population) {
    println!("\n=== {} ===", title);
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Slot").add_attribute(Attribute::Bold),
        Cell::new("Offsets"),
        Cell::new("Mean Travel").fg(Color::Cyan),
        Cell::new(""),
    ]);
    if let Some(col) = table.column_mut(2) {
        col.set_cell_alignment(CellAlignment::Right);
    }

    let best_score = population.best().map(|c| c.score);
    for (i, c) in population.candidates().iter().enumerate() {
        let tag = if Some(c.score) == best_score {
            Cell::new("best").fg(Color::Green)
        } else if i == population.worst_index() {
            Cell::new("worst").fg(Color::Red)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(i),
            Cell::new(c.configuration.to_string()),
            Cell::new(format!("{:.3}", c.score)),
            tag,
        ]);
    }
    println!("{}", table);
}

pub fn print_stats(stats: &ImproveStats) {
    println!(
        "Iterations: {} | Accepted: {} | Not better: {} | Duplicate: {}",
        stats.iterations, stats.accepted, stats.rejected_not_better, stats.rejected_duplicate
    );
}

pub fn print_trial_summary(trials: &[TrialOutcome]) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec!["Trial", "Seed", "Best", "Offsets", "Accepted"]);

    for t in trials {
        let (score, offsets) = match t.outcome.best() {
            Some(c) => (format!("{:.3}", c.score), c.configuration.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            Cell::new(t.trial),
            Cell::new(t.seed.map_or("random".to_string(), |s| s.to_string())),
            Cell::new(score),
            Cell::new(offsets),
            Cell::new(t.outcome.stats.accepted),
        ]);
    }
    println!("\n=== TRIALS ===");
    println!("{}", table);
}

pub fn print_best(candidate: &Candidate) {
    println!("Best: {} {:.3}", candidate.configuration, candidate.score);
}

pub fn print_worst(population: &Population) {
    if let Some(c) = population.get(population.worst_index()) {
        println!("Worst: {} {:.3}", c.configuration, c.score);
    }
}

pub fn print_episode(report: &EpisodeReport) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec!["Ticks", "Injected", "Arrived", "In flight", "Mean Travel"]);
    table.add_row(vec![
        Cell::new(report.ticks),
        Cell::new(report.injected),
        Cell::new(report.completed),
        Cell::new(report.in_flight()),
        Cell::new(format!("{:.3}", report.mean_travel_time)).fg(Color::Cyan),
    ]);
    println!("{}", table);
}

pub fn write_json(path: &str, result: &OptimizationResult) -> TuneResult<()> {
    let json = serde_json::to_string_pretty(result)?;
    fs::write(path, json)?;
    Ok(())
}
