//! Backtest engine: replays strategy signals over a price series.
//!
//! Two states, flat or holding one position. Per bar, every signal whose
//! timestamp equals the bar's is applied in the order the strategy produced it:
//!
//! - entry while flat opens at `close * (1 + slippage)`; entries while holding are ignored
//! - exit matching the open direction closes at `close * (1 - slippage)`;
//!   non-matching exits and exits while flat are ignored
//! - net return = directional return - 2 * commission, sized against
//!   `equity * position_size` at the moment of exit
//!
//! Equity is recorded for every bar during the walk. A position still open after
//! the last bar is closed at the last close without slippage (commission still
//! applies); that trade is recorded and reflected in `final_equity`, but the
//! equity curve and the metrics computed from it stay as walked.

use chrono::NaiveDateTime;
use tracing::{debug, info, trace, warn};

use super::error::BarsmithError;
use super::metrics::Metrics;
use super::position::{ExitReason, Position, Trade};
use super::price_series::PriceSeries;
use super::signal::Signal;
use crate::ports::strategy_port::Strategy;

pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;
pub const DEFAULT_SLIPPAGE_RATE: f64 = 0.001;
pub const DEFAULT_POSITION_SIZE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Per-side commission as a fraction of traded value.
    pub commission_rate: f64,
    pub slippage_rate: f64,
    /// Fraction of current equity committed per trade, in `(0, 1]`.
    pub position_size: f64,
    /// Annual risk-free rate used by the Sharpe ratio.
    pub risk_free_rate: f64,
}

impl BacktestConfig {
    pub fn new(initial_capital: f64) -> Self {
        BacktestConfig {
            initial_capital,
            commission_rate: DEFAULT_COMMISSION_RATE,
            slippage_rate: DEFAULT_SLIPPAGE_RATE,
            position_size: DEFAULT_POSITION_SIZE,
            risk_free_rate: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), BarsmithError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(BarsmithError::invalid_parameter(
                "initial_capital",
                format!("must be a positive number, got {}", self.initial_capital),
            ));
        }
        if !self.commission_rate.is_finite() || self.commission_rate < 0.0 {
            return Err(BarsmithError::invalid_parameter(
                "commission_rate",
                format!("must be non-negative, got {}", self.commission_rate),
            ));
        }
        if !(0.0..1.0).contains(&self.slippage_rate) {
            return Err(BarsmithError::invalid_parameter(
                "slippage_rate",
                format!("must be in [0, 1), got {}", self.slippage_rate),
            ));
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(BarsmithError::invalid_parameter(
                "position_size",
                format!("must be in (0, 1], got {}", self.position_size),
            ));
        }
        if !(0.0..1.0).contains(&self.risk_free_rate) {
            return Err(BarsmithError::invalid_parameter(
                "risk_free_rate",
                format!("must be in [0, 1), got {}", self.risk_free_rate),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// One point per input bar, as recorded during the walk.
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
    pub initial_capital: f64,
    /// Account equity after every trade, including an end-of-data close.
    pub final_equity: f64,
}

/// A validated configuration, ready to run strategies.
#[derive(Debug, Clone)]
pub struct Backtester {
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Result<Self, BarsmithError> {
        config.validate()?;
        Ok(Backtester { config })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn with_commission_rate(self, commission_rate: f64) -> Result<Self, BarsmithError> {
        Backtester::new(BacktestConfig {
            commission_rate,
            ..self.config
        })
    }

    pub fn with_slippage_rate(self, slippage_rate: f64) -> Result<Self, BarsmithError> {
        Backtester::new(BacktestConfig {
            slippage_rate,
            ..self.config
        })
    }

    pub fn with_position_size(self, position_size: f64) -> Result<Self, BarsmithError> {
        Backtester::new(BacktestConfig {
            position_size,
            ..self.config
        })
    }

    pub fn with_risk_free_rate(self, risk_free_rate: f64) -> Result<Self, BarsmithError> {
        Backtester::new(BacktestConfig {
            risk_free_rate,
            ..self.config
        })
    }

    /// `None` when `series` is empty.
    pub fn run(&self, strategy: &dyn Strategy, series: &PriceSeries) -> Option<BacktestResult> {
        if series.is_empty() {
            debug!(strategy = strategy.name(), "empty series, nothing to backtest");
            return None;
        }

        let signals = strategy.analyze(series);
        debug!(
            strategy = strategy.name(),
            signals = signals.len(),
            bars = series.len(),
            "starting backtest"
        );
        warn_unmatched_signals(&signals, series);

        let mut state = RunState {
            config: &self.config,
            equity: self.config.initial_capital,
            position: None,
            trades: Vec::new(),
        };
        let mut equity_curve = Vec::with_capacity(series.len());

        // Signals sorted by time for a single forward pass; stable sort keeps
        // production order within one timestamp.
        let mut ordered: Vec<&Signal> = signals.iter().collect();
        ordered.sort_by_key(|s| s.timestamp);
        let mut pending = ordered.into_iter().peekable();

        for bar in series {
            while pending
                .peek()
                .is_some_and(|s| s.timestamp < bar.timestamp)
            {
                pending.next();
            }
            while let Some(signal) = pending.next_if(|s| s.timestamp == bar.timestamp) {
                state.apply(signal, bar.close);
            }

            equity_curve.push(EquityPoint {
                timestamp: bar.timestamp,
                equity: state.equity,
            });
        }

        if let (Some(position), Some(last_bar)) = (state.position.take(), series.last()) {
            let trade = state.close(position, last_bar.timestamp, last_bar.close, ExitReason::EndOfData);
            debug!(
                direction = %trade.direction,
                exit_price = trade.exit_price,
                profit = trade.profit,
                "forced close at end of data"
            );
        }

        let metrics = Metrics::compute(
            self.config.initial_capital,
            &equity_curve,
            &state.trades,
            self.config.risk_free_rate,
        );

        info!(
            strategy = strategy.name(),
            trades = metrics.total_trades,
            total_return = metrics.total_return,
            "backtest finished"
        );

        Some(BacktestResult {
            trades: state.trades,
            equity_curve,
            metrics,
            initial_capital: self.config.initial_capital,
            final_equity: state.equity,
        })
    }
}

/// One-shot form: validate `config` and run `strategy` over `series`.
pub fn run_backtest(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<Option<BacktestResult>, BarsmithError> {
    let backtester = Backtester::new(config.clone())?;
    Ok(backtester.run(strategy, series))
}

struct RunState<'a> {
    config: &'a BacktestConfig,
    equity: f64,
    position: Option<Position>,
    trades: Vec<Trade>,
}

impl RunState<'_> {
    fn apply(&mut self, signal: &Signal, close: f64) {
        let slippage = self.config.slippage_rate;
        match (&self.position, signal.is_entry) {
            (None, true) => {
                let entry_price = close * (1.0 + slippage);
                debug!(
                    direction = %signal.direction,
                    entry_price,
                    time = %signal.timestamp,
                    "opening position"
                );
                self.position = Some(Position {
                    direction: signal.direction,
                    entry_time: signal.timestamp,
                    entry_price,
                });
            }
            (Some(open), false) if open.direction == signal.direction => {
                if let Some(position) = self.position.take() {
                    let trade = self.close(
                        position,
                        signal.timestamp,
                        close * (1.0 - slippage),
                        ExitReason::Signal,
                    );
                    debug!(
                        direction = %trade.direction,
                        exit_price = trade.exit_price,
                        profit = trade.profit,
                        "closing position"
                    );
                }
            }
            _ => {
                trace!(
                    time = %signal.timestamp,
                    entry = signal.is_entry,
                    direction = %signal.direction,
                    "ignoring signal"
                );
            }
        }
    }

    fn close(
        &mut self,
        position: Position,
        exit_time: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> &Trade {
        let net_return = position.gross_return(exit_price) - 2.0 * self.config.commission_rate;
        let profit = net_return * self.equity * self.config.position_size;
        self.equity += profit;

        self.trades.push(Trade {
            entry_time: position.entry_time,
            exit_time,
            direction: position.direction,
            entry_price: position.entry_price,
            exit_price,
            profit,
            profit_pct: net_return * 100.0,
            exit_reason,
        });
        &self.trades[self.trades.len() - 1]
    }
}

fn warn_unmatched_signals(signals: &[Signal], series: &PriceSeries) {
    let bars = series.bars();
    let unmatched = signals
        .iter()
        .filter(|s| {
            bars.binary_search_by_key(&s.timestamp, |b| b.timestamp)
                .is_err()
        })
        .count();
    if unmatched > 0 {
        warn!(unmatched, "signals with no matching bar were ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;
    use crate::domain::signal::Direction;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    struct Scripted {
        signals: Vec<Signal>,
    }

    impl Strategy for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn analyze(&self, _series: &PriceSeries) -> Vec<Signal> {
            self.signals.clone()
        }
    }

    fn day(i: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(i)
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(day(i as i64), c, c, c, c, 1000.0))
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn frictionless(capital: f64) -> BacktestConfig {
        BacktestConfig {
            commission_rate: 0.0,
            slippage_rate: 0.0,
            ..BacktestConfig::new(capital)
        }
    }

    fn entry(i: i64, dir: Direction) -> Signal {
        Signal::entry(day(i), 0.0, dir, 1.0)
    }

    fn exit(i: i64, dir: Direction) -> Signal {
        Signal::exit(day(i), 0.0, dir, 1.0)
    }

    #[test]
    fn config_defaults() {
        let c = BacktestConfig::new(10_000.0);
        assert_eq!(c.commission_rate, 0.001);
        assert_eq!(c.slippage_rate, 0.001);
        assert_eq!(c.position_size, 1.0);
        assert_eq!(c.risk_free_rate, 0.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn config_rejects_position_size_out_of_range() {
        for size in [0.0, -0.5, 1.01, f64::NAN] {
            let c = BacktestConfig {
                position_size: size,
                ..BacktestConfig::new(1000.0)
            };
            assert!(
                matches!(c.validate(), Err(BarsmithError::InvalidParameter { ref name, .. }) if name == "position_size"),
                "size {} accepted",
                size
            );
        }
    }

    #[test]
    fn config_rejects_bad_capital_and_rates() {
        assert!(BacktestConfig::new(0.0).validate().is_err());
        assert!(BacktestConfig::new(f64::INFINITY).validate().is_err());
        let c = BacktestConfig {
            commission_rate: -0.1,
            ..BacktestConfig::new(1000.0)
        };
        assert!(c.validate().is_err());
        let c = BacktestConfig {
            slippage_rate: 1.0,
            ..BacktestConfig::new(1000.0)
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn builder_setters_validate() {
        let bt = Backtester::new(BacktestConfig::new(1000.0)).unwrap();
        assert!(bt.clone().with_position_size(1.5).is_err());
        let bt = bt.with_position_size(0.5).unwrap();
        assert_eq!(bt.config().position_size, 0.5);
        assert!(bt.clone().with_slippage_rate(-0.1).is_err());
        assert!(bt.clone().with_commission_rate(0.002).is_ok());
        assert!(bt.with_risk_free_rate(0.03).is_ok());
    }

    #[test]
    fn empty_series_yields_none() {
        let bt = Backtester::new(frictionless(1000.0)).unwrap();
        let strategy = Scripted { signals: vec![] };
        assert!(bt.run(&strategy, &PriceSeries::empty()).is_none());
    }

    #[test]
    fn literal_long_scenario() {
        let strategy = Scripted {
            signals: vec![entry(0, Direction::Long), exit(2, Direction::Long)],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 110.0, 90.0]), &frictionless(1000.0))
            .unwrap()
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_relative_eq!(trade.entry_price, 100.0);
        assert_relative_eq!(trade.exit_price, 90.0);
        assert_relative_eq!(trade.profit_pct, -10.0);
        assert_relative_eq!(trade.profit, -100.0);
        assert_eq!(trade.exit_reason, ExitReason::Signal);
        assert_relative_eq!(result.final_equity, 900.0);
        let equity: Vec<f64> = result.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equity, vec![1000.0, 1000.0, 900.0]);
    }

    #[test]
    fn short_trade_profits_from_decline() {
        let strategy = Scripted {
            signals: vec![entry(0, Direction::Short), exit(1, Direction::Short)],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 80.0]), &frictionless(1000.0))
            .unwrap()
            .unwrap();
        assert_relative_eq!(result.trades[0].profit, 200.0);
        assert_relative_eq!(result.final_equity, 1200.0);
    }

    #[test]
    fn slippage_and_commission() {
        let config = BacktestConfig {
            commission_rate: 0.01,
            slippage_rate: 0.1,
            ..BacktestConfig::new(1000.0)
        };
        let strategy = Scripted {
            signals: vec![entry(0, Direction::Long), exit(1, Direction::Long)],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 100.0]), &config)
            .unwrap()
            .unwrap();

        let trade = &result.trades[0];
        assert_relative_eq!(trade.entry_price, 110.0);
        assert_relative_eq!(trade.exit_price, 90.0);
        let expected = (90.0 - 110.0) / 110.0 - 0.02;
        assert_relative_eq!(trade.profit_pct, expected * 100.0, epsilon = 1e-9);
        assert_relative_eq!(trade.profit, expected * 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn position_size_scales_profit() {
        let config = BacktestConfig {
            position_size: 0.5,
            ..frictionless(1000.0)
        };
        let strategy = Scripted {
            signals: vec![entry(0, Direction::Long), exit(1, Direction::Long)],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 120.0]), &config)
            .unwrap()
            .unwrap();
        assert_relative_eq!(result.trades[0].profit, 100.0);
    }

    #[test]
    fn forced_close_without_slippage() {
        let config = BacktestConfig {
            commission_rate: 0.005,
            slippage_rate: 0.01,
            ..BacktestConfig::new(1000.0)
        };
        let strategy = Scripted {
            signals: vec![entry(0, Direction::Long)],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 105.0, 120.0]), &config)
            .unwrap()
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::EndOfData);
        assert_eq!(trade.exit_time, day(2));
        assert_relative_eq!(trade.exit_price, 120.0);
        let expected = (120.0 - 101.0) / 101.0 - 0.01;
        assert_relative_eq!(trade.profit, expected * 1000.0, epsilon = 1e-9);

        // the forced close reaches final_equity but not the walked curve
        assert_relative_eq!(result.final_equity, 1000.0 + trade.profit, epsilon = 1e-9);
        assert!(result.equity_curve.iter().all(|p| p.equity == 1000.0));
        assert_eq!(result.metrics.total_profit, 0.0);
        assert_eq!(result.metrics.max_drawdown, 0.0);
    }

    #[test]
    fn second_entry_and_mismatched_exit_ignored() {
        let strategy = Scripted {
            signals: vec![
                entry(0, Direction::Long),
                entry(1, Direction::Short),
                exit(1, Direction::Short),
                exit(2, Direction::Long),
            ],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 105.0, 110.0]), &frictionless(1000.0))
            .unwrap()
            .unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].direction, Direction::Long);
        assert_relative_eq!(result.trades[0].exit_price, 110.0);
    }

    #[test]
    fn exit_while_flat_ignored() {
        let strategy = Scripted {
            signals: vec![exit(0, Direction::Long)],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 101.0]), &frictionless(1000.0))
            .unwrap()
            .unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve.len(), 2);
    }

    #[test]
    fn same_bar_signals_in_production_order() {
        // exit then re-entry on bar 1
        let strategy = Scripted {
            signals: vec![
                entry(0, Direction::Long),
                exit(1, Direction::Long),
                entry(1, Direction::Short),
                exit(2, Direction::Short),
            ],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 110.0, 99.0]), &frictionless(1000.0))
            .unwrap()
            .unwrap();
        assert_eq!(result.trades.len(), 2);
        assert_relative_eq!(result.trades[0].profit, 100.0);
        // short sized against equity after the first trade
        assert_relative_eq!(result.trades[1].profit, 0.1 * 1100.0, epsilon = 1e-9);
    }

    #[test]
    fn unordered_signals_still_matched_by_timestamp() {
        let strategy = Scripted {
            signals: vec![exit(2, Direction::Long), entry(0, Direction::Long)],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 105.0, 110.0]), &frictionless(1000.0))
            .unwrap()
            .unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason, ExitReason::Signal);
    }

    #[test]
    fn signals_without_matching_bar_ignored() {
        let strategy = Scripted {
            signals: vec![Signal::entry(
                day(0) + Duration::hours(1),
                0.0,
                Direction::Long,
                1.0,
            )],
        };
        let result = run_backtest(&strategy, &series(&[100.0, 101.0]), &frictionless(1000.0))
            .unwrap()
            .unwrap();
        assert!(result.trades.is_empty());
    }
}
