//! Terminal rendering of each lifecycle state.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;

use buildscan::model::{JobListing, ResultRecord};
use buildscan::{ControllerView, Endpoints, Progress, Summary};

const NOTES_WIDTH: usize = 48;

pub fn upload_spinner(file_name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    pb.set_message(format!("Uploading {}", file_name));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn progress_bar(total: u32) -> ProgressBar {
    let pb = ProgressBar::new(u64::from(total));
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} addresses {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn update_progress(pb: &ProgressBar, progress: &Progress) {
    pb.set_length(u64::from(progress.total));
    pb.set_position(u64::from(progress.processed));

    let eta = if progress.remaining == 0 {
        "finishing".to_string()
    } else {
        format!("~{} min left", progress.estimated_minutes_remaining)
    };
    match &progress.current_item {
        Some(item) => pb.set_message(format!("{}% ({}) {}", progress.percent, eta, item)),
        None => pb.set_message(format!("{}% ({})", progress.percent, eta)),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn row(record: &ResultRecord) -> String {
    let category = record
        .category
        .as_ref()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let ratio = record
        .ratio_estimate
        .map(|r| format!("{:.0}%", r))
        .unwrap_or_else(|| "-".to_string());
    let confidence = record
        .confidence
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let address = match record.locality() {
        Some(locality) => format!("{} ({}, {})", record.street_line(), locality, record.zip_code),
        None => format!("{} ({})", record.street_line(), record.zip_code),
    };

    format!(
        "{:<44} {:<21} {:>5} {:<10} {}",
        truncate(&address, 44),
        category,
        ratio,
        confidence,
        truncate(record.notes().unwrap_or(""), NOTES_WIDTH)
    )
}

fn print_summary(summary: &Summary) {
    println!();
    println!("Total buildings:  {}", summary.total);
    println!("Residential:      {}", summary.residential);
    println!("Commercial:       {}", summary.commercial);
    println!("Mixed use:        {}", summary.mixed);
    if summary.unclassified > 0 || summary.unrecognized > 0 {
        println!(
            "Unclassified:     {} ({} unrecognized labels)",
            summary.unclassified + summary.unrecognized,
            summary.unrecognized
        );
    }
    if summary.ratio_samples > 0 {
        println!(
            "Average WWR:      {}% over {} buildings",
            summary.rounded_average(),
            summary.ratio_samples
        );
    } else {
        println!("Average WWR:      -");
    }
}

/// Prints the completed view: results table, summary and download links.
pub fn print_report(view: &ControllerView, endpoints: &Endpoints, finished_at: DateTime<Utc>) {
    let Some(job_id) = view.job_id.as_deref() else {
        return;
    };

    println!(
        "Job {} completed at {}",
        job_id,
        finished_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    println!();
    println!(
        "{:<44} {:<21} {:>5} {:<10} {}",
        "Address", "Type", "WWR", "Confidence", "Notes"
    );
    if let Some(results) = &view.results {
        for record in results.iter() {
            println!("{}", row(record));
        }
    }

    if let Some(summary) = &view.summary {
        print_summary(summary);
    }

    println!();
    println!("CSV:  {}", endpoints.csv_export(job_id));
    println!("ZIP:  {}", endpoints.zip_export(job_id));
}

fn job_line(job: &JobListing) -> String {
    format!(
        "{:<12} {:<11} {:>6}/{:<6}",
        job.job_id,
        job.status.as_str(),
        job.processed,
        job.total
    )
}

pub fn print_jobs(jobs: &[JobListing]) {
    println!("{:<12} {:<11} {:>13}", "Job", "Status", "Processed");
    for job in jobs {
        println!("{}", job_line(job));
    }
}

/// Machine-readable form of a completed scan.
#[derive(Serialize)]
pub struct ScanReport<'a> {
    pub job_id: &'a str,
    pub finished_at: DateTime<Utc>,
    pub summary: Option<&'a Summary>,
    pub results: &'a [ResultRecord],
    pub csv_url: String,
    pub zip_url: String,
    pub image_urls: Vec<Vec<String>>,
}

impl<'a> ScanReport<'a> {
    pub fn new(
        view: &'a ControllerView,
        endpoints: &Endpoints,
        finished_at: DateTime<Utc>,
    ) -> Option<Self> {
        let job_id = view.job_id.as_deref()?;
        let results = view.results.as_deref().map(Vec::as_slice).unwrap_or(&[]);
        Some(Self {
            job_id,
            finished_at,
            summary: view.summary.as_ref(),
            results,
            csv_url: endpoints.csv_export(job_id),
            zip_url: endpoints.zip_export(job_id),
            image_urls: results
                .iter()
                .map(|r| {
                    r.image_set
                        .as_ref()
                        .map(|set| endpoints.image_urls(set))
                        .unwrap_or_default()
                })
                .collect(),
        })
    }
}
