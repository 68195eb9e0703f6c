use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ouflow_rs::config::Overrides;
use ouflow_rs::engine::signal::SignalNormalization;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NormalizationCli {
    Raw,
    MeanNu,
}

impl From<NormalizationCli> for SignalNormalization {
    fn from(n: NormalizationCli) -> Self {
        match n {
            NormalizationCli::Raw => SignalNormalization::Raw,
            NormalizationCli::MeanNu => SignalNormalization::MeanNu,
        }
    }
}

/// Order-book liquidity OU trader
#[derive(Debug, Parser)]
#[clap(name = "ouflow", version)]
pub struct Cli {
    /// Settings file (toml, yaml or json)
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Replay recorded depth payloads from a file instead of the live feed
    #[clap(long)]
    pub replay: Option<PathBuf>,

    #[clap(long)]
    pub symbol: Option<String>,

    /// Samples per side before estimation fires
    #[clap(long)]
    pub window: Option<usize>,

    /// Signal magnitude needed to open a position
    #[clap(long)]
    pub threshold: Option<f64>,

    #[clap(long)]
    pub dt: Option<f64>,

    #[clap(long)]
    pub theta: Option<f64>,

    /// Fixed order size
    #[clap(long)]
    pub qty: Option<f64>,

    #[clap(long, value_enum)]
    pub normalization: Option<NormalizationCli>,

    #[clap(long)]
    pub ws_url: Option<String>,

    /// tracing filter, e.g. "info,ouflow_rs=debug"
    #[clap(long)]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            symbol: self.symbol.clone(),
            // saturate so an oversized value reaches validation instead of wrapping negative
            window: self.window.map(|w| i64::try_from(w).unwrap_or(i64::MAX)),
            threshold: self.threshold,
            dt: self.dt,
            theta: self.theta,
            qty: self.qty,
            normalization: self.normalization.map(Into::into),
            ws_url: self.ws_url.clone(),
            log_filter: self.log_filter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_override_does_not_wrap() {
        let cli = Cli::parse_from(["ouflow", "--window", &usize::MAX.to_string()]);
        assert_eq!(cli.overrides().window, Some(i64::MAX));

        let cli = Cli::parse_from(["ouflow", "--window", "120", "--normalization", "mean-nu"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.window, Some(120));
        assert_eq!(overrides.normalization, Some(SignalNormalization::MeanNu));
    }
}
