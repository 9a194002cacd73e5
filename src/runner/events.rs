use super::state::{TestResult, TestSummary};

/// Run progress events, emitted in execution order
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        session_id: String,
        title: String,
        base_url: String,
        started_at: String,
    },
    AreaStarted {
        banner: String,
    },
    AreaFinished,
    CheckStarted {
        name: String,
        request: String,
    },
    ResultRecorded(TestResult),
    RunFinished {
        summary: TestSummary,
        failures: Vec<TestResult>,
        finished_at: String,
    },
}

/// Consumer of run events
pub trait EventListener: Send {
    fn on_event(&mut self, event: &RunEvent);
}

/// Fans events out to registered listeners
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn emit(&mut self, event: RunEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration as StdDuration;

const RULE_WIDTH: usize = 80;
const SUB_RULE_WIDTH: usize = 40;

/// Console event listener for printing the run report
pub struct ConsoleEventListener {
    interactive: bool,
    spinner: Option<ProgressBar>,
}

impl Default for ConsoleEventListener {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleEventListener {
    pub fn new() -> Self {
        Self {
            // Spinners only when stdout is a TTY, to keep piped output clean
            interactive: std::io::stdout().is_terminal(),
            spinner: None,
        }
    }

    fn start_spinner(&mut self, name: &str, request: &str) {
        if !self.interactive {
            return;
        }
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("{} {}", name, request.dimmed()));
        pb.enable_steady_tick(StdDuration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn print_result(result: &TestResult) {
        let status = if result.success {
            "✅ PASS".green().bold()
        } else {
            "❌ FAIL".red().bold()
        };
        println!("{} {}: {}", status, result.test, result.message);
        if let Some(details) = &result.details {
            println!("   Details: {}", details.dimmed());
        }
    }

    fn print_summary(summary: &TestSummary, failures: &[TestResult], finished_at: &str) {
        println!("{}", "=".repeat(RULE_WIDTH));
        println!("{}", "TEST SUMMARY".bold());
        println!("{}", "=".repeat(RULE_WIDTH));
        println!("Total Tests: {}", summary.total);
        println!("Passed: {} ✅", summary.passed.to_string().green());
        println!("Failed: {} ❌", summary.failed.to_string().red());
        println!("Success Rate: {:.1}%", summary.success_rate());
        println!();

        if !failures.is_empty() {
            println!("{}", "FAILED TESTS:".red().bold());
            println!("{}", "-".repeat(SUB_RULE_WIDTH));
            for result in failures {
                println!("❌ {}: {}", result.test, result.message);
                if let Some(details) = &result.details {
                    println!("   {}", details);
                }
            }
            println!();
        }

        println!("Test completed at: {}", finished_at);
        println!("{}", "=".repeat(RULE_WIDTH));
    }
}

impl EventListener for ConsoleEventListener {
    fn on_event(&mut self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted {
                title,
                base_url,
                started_at,
                session_id,
            } => {
                println!("{}", "=".repeat(RULE_WIDTH));
                println!("{}", title.bold());
                println!("{}", "=".repeat(RULE_WIDTH));
                println!("Base URL: {}", base_url.cyan());
                println!("Session: {}", session_id.dimmed());
                println!("Test started at: {}", started_at);
                println!();
            }

            RunEvent::AreaStarted { banner } => {
                println!("{}", banner.bold());
                println!("{}", "-".repeat(SUB_RULE_WIDTH));
            }

            RunEvent::AreaFinished => {
                self.clear_spinner();
                println!();
            }

            RunEvent::CheckStarted { name, request } => {
                self.start_spinner(name, request);
            }

            RunEvent::ResultRecorded(result) => {
                self.clear_spinner();
                Self::print_result(result);
            }

            RunEvent::RunFinished {
                summary,
                failures,
                finished_at,
            } => {
                self.clear_spinner();
                Self::print_summary(summary, failures, finished_at);
            }
        }
    }
}
