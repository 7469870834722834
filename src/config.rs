use serde::Serialize;

pub const DEFAULT_MULTIPLIER_TOLERANCE: f64 = 0.1;
pub const DEFAULT_PERCENT_TOLERANCE: f64 = 0.5;

/// Comparison slack for the tolerance-bounded checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerances {
    /// Allowed gap between a stated surge multiplier and its recomputation.
    pub multiplier: f64,
    /// Allowed distance from 100 for percentage sums that are not exact.
    pub percent: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER_TOLERANCE,
            percent: DEFAULT_PERCENT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` validates the built-in dataset.
    pub dataset_path: Option<String>,
    pub format: OutputFormat,
    pub tolerances: Tolerances,
    pub fail_on_warnings: bool,
    pub show_help: bool,
}

pub const USAGE: &str = "usage: vajra-validate [PATH] [--json|--text] [--builtin]

Validates the internal consistency of a dashboard dataset document.
Without PATH (or with --builtin) the dataset compiled into the binary is used.

environment:
  DATASET_PATH    dataset document to validate
  REPORT_FORMAT   text | json (default text)
  MULTIPLIER_TOL  surge multiplier tolerance (default 0.1)
  PERCENT_TOL     percentage-sum tolerance (default 0.5)
  FAIL_ON_WARN    1 to exit non-zero on warnings
  LOG_LEVEL       trace | debug | info | warn | error | fatal
  LOG_DOMAINS     comma-separated: load,check,report,system,profile
  LOG_DIR         also write JSONL logs under LOG_DIR/RUN_ID";

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            dataset_path: var("DATASET_PATH").filter(|v| !v.is_empty()),
            format: var("REPORT_FORMAT").and_then(|v| OutputFormat::parse(&v)).unwrap_or(OutputFormat::Text),
            tolerances: Tolerances {
                multiplier: var("MULTIPLIER_TOL").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_MULTIPLIER_TOLERANCE),
                percent: var("PERCENT_TOL").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PERCENT_TOLERANCE),
            },
            fail_on_warnings: var("FAIL_ON_WARN").map(|v| v == "1").unwrap_or(false),
            show_help: false,
        }
    }

    /// Apply command-line arguments on top of the environment.
    pub fn with_args<I>(mut self, args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut builtin = false;
        let mut path_arg = false;
        for arg in args {
            match arg.as_str() {
                "--json" => self.format = OutputFormat::Json,
                "--text" => self.format = OutputFormat::Text,
                "--builtin" => builtin = true,
                "-h" | "--help" => self.show_help = true,
                flag if flag.starts_with('-') => return Err(format!("unknown flag: {}", flag)),
                path => {
                    self.dataset_path = Some(path.to_string());
                    path_arg = true;
                }
            }
        }
        if builtin {
            if path_arg {
                return Err("--builtin conflicts with a dataset path".to_string());
            }
            self.dataset_path = None;
        }
        if !(self.tolerances.multiplier >= 0.0 && self.tolerances.percent >= 0.0) {
            return Err(format!(
                "tolerances must be non-negative: multiplier={} percent={}",
                self.tolerances.multiplier, self.tolerances.percent
            ));
        }
        Ok(self)
    }
}
