//! CLI-specific progress handling for butterfly-grid
//!
//! Provides the progress bar shown while routes are being confirmed.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar counting confirmed routes out of `total`
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} routes ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Progress manager for a route search
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total: u64, message: &str) -> Self {
        let pb = create_progress_bar(total);

        // Print initial message to stderr
        eprintln!("{message}");

        Self { pb }
    }

    /// Callback for `find_routes_with_progress`
    pub fn tracker(&self) -> impl FnMut(usize, usize) + '_ {
        move |found, _k| self.pb.set_position(found as u64)
    }

    /// Stop the bar, leaving a final message
    pub fn finish(&self, found: usize) {
        self.pb
            .finish_with_message(format!("✅ {found} route(s) confirmed"));
    }
}
