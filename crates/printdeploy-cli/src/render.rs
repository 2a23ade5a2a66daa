use std::io::{self, BufRead, Write};

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};
use printdeploy_bootstrap::{DownloadProgress, RuntimePrompt};
use printdeploy_core::{StepRecord, StepStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

impl OutputStyle {
    pub(crate) fn detect() -> Self {
        let plain_requested = std::env::var_os("NO_COLOR").is_some()
            || std::env::var_os("PRINTDEPLOY_PLAIN").is_some();
        if plain_requested {
            Self::Plain
        } else {
            Self::Rich
        }
    }
}

pub(crate) fn print_status(style: OutputStyle, status: &str, message: &str) {
    println!("{}", render_status_line(style, status, message));
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("[{status}] {message}"),
        OutputStyle::Rich => format!("{} {message}", colorize(status_style(), &format!("[{status}]"))),
    }
}

pub(crate) fn print_step_record(style: OutputStyle, record: &StepRecord) {
    let line = format!("{}: {}", record.step, record.message);
    match style {
        OutputStyle::Plain => println!("[{}] {line}", record.status.as_str()),
        OutputStyle::Rich => println!(
            "{} {line}",
            colorize(
                step_status_style(record.status),
                &format!("[{}]", record.status.as_str())
            )
        ),
    }
}

fn status_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn step_status_style(status: StepStatus) -> Style {
    let color = match status {
        StepStatus::Succeeded => AnsiColor::BrightGreen,
        StepStatus::Failed => AnsiColor::BrightRed,
        StepStatus::Skipped => AnsiColor::BrightBlack,
    };
    Style::new().fg_color(Some(color.into()))
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) struct AssumeYesPrompt;

impl RuntimePrompt for AssumeYesPrompt {
    fn confirm_runtime_install(&mut self) -> bool {
        true
    }
}

pub(crate) struct ConsolePrompt;

impl RuntimePrompt for ConsolePrompt {
    fn confirm_runtime_install(&mut self) -> bool {
        print!("Python runtime not found. Download and install it now? [y/N] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "s" | "sim")
    }
}

pub(crate) struct DownloadBar {
    label: String,
    progress_bar: Option<ProgressBar>,
}

impl DownloadBar {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            progress_bar: None,
        }
    }
}

impl DownloadProgress for DownloadBar {
    fn on_progress(&mut self, received: u64, total: Option<u64>) {
        let progress_bar = self.progress_bar.get_or_insert_with(|| {
            let progress_bar = ProgressBar::new(total.unwrap_or(0).max(1));
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.cyan.bold} {msg:<18} [{bar:20.cyan/blue}] {bytes}/{total_bytes}",
            ) {
                progress_bar.set_style(style.progress_chars("=>-"));
            }
            progress_bar.set_message(self.label.clone());
            progress_bar
        });

        if let Some(total) = total {
            progress_bar.set_length(total.max(1));
        }
        progress_bar.set_position(received);
    }
}

impl Drop for DownloadBar {
    fn drop(&mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
    }
}
