//! Aggregate performance statistics over an equity curve and trade list.
//!
//! Percent-valued fields (`total_return`, `win_rate`, `max_drawdown`,
//! `peak_drawdown`) are expressed in percent, not fractions.

use super::backtest::EquityPoint;
use super::position::Trade;
use super::signal::Direction;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Per-direction breakdown of closed trades.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionSummary {
    pub trades: usize,
    pub winners: usize,
    pub total_profit: f64,
    pub avg_profit: f64,
    pub win_rate: f64,
}

impl DirectionSummary {
    fn from_trades<'a>(trades: impl Iterator<Item = &'a Trade>) -> Self {
        let mut summary = DirectionSummary::default();
        for trade in trades {
            summary.trades += 1;
            summary.total_profit += trade.profit;
            if trade.is_win() {
                summary.winners += 1;
            }
        }
        if summary.trades > 0 {
            summary.avg_profit = summary.total_profit / summary.trades as f64;
            summary.win_rate = summary.winners as f64 / summary.trades as f64 * 100.0;
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub total_profit: f64,
    pub total_return: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    /// Mean profit of losing trades; zero or negative.
    pub avg_loss: f64,
    /// `|sum(wins) / sum(losses)|`, 0 when there are no losses.
    pub profit_factor: f64,
    /// `(max equity - min equity) / max equity`, extremes seeded by the initial capital.
    pub max_drawdown: f64,
    /// Largest running peak-to-current decline, peak seeded by the initial capital.
    pub peak_drawdown: f64,
    pub max_equity: f64,
    pub min_equity: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub sharpe_ratio: f64,
    pub avg_trade_duration_secs: f64,
    pub long: DirectionSummary,
    pub short: DirectionSummary,
}

impl Metrics {
    pub fn compute(
        initial_capital: f64,
        equity_curve: &[EquityPoint],
        trades: &[Trade],
        risk_free_rate: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_profit = final_equity - initial_capital;
        let total_return = if initial_capital > 0.0 {
            total_profit / initial_capital * 100.0
        } else {
            0.0
        };

        let (max_equity, min_equity) = equity_extremes(initial_capital, equity_curve);
        let max_drawdown = if max_equity > 0.0 {
            (max_equity - min_equity) / max_equity * 100.0
        } else {
            0.0
        };
        let peak_drawdown = running_drawdown(initial_capital, equity_curve) * 100.0;

        let sharpe_ratio =
            compute_sharpe(equity_curve, risk_free_rate / TRADING_DAYS_PER_YEAR);

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration_secs = 0i64;

        for trade in trades {
            let profit = trade.profit;
            if trade.is_win() {
                winning_trades += 1;
                total_wins += profit;
                largest_win = largest_win.max(profit);
            } else {
                losing_trades += 1;
                total_losses += profit;
                largest_loss = largest_loss.min(profit);
            }
            total_duration_secs += trade.duration().num_seconds();
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses != 0.0 {
            (total_wins / total_losses).abs()
        } else {
            0.0
        };

        let avg_trade_duration_secs = if total_trades > 0 {
            total_duration_secs as f64 / total_trades as f64
        } else {
            0.0
        };

        Metrics {
            total_trades,
            winning_trades,
            losing_trades,
            total_profit,
            total_return,
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
            max_drawdown,
            peak_drawdown,
            max_equity,
            min_equity,
            largest_win,
            largest_loss,
            sharpe_ratio,
            avg_trade_duration_secs,
            long: DirectionSummary::from_trades(
                trades.iter().filter(|t| t.direction == Direction::Long),
            ),
            short: DirectionSummary::from_trades(
                trades.iter().filter(|t| t.direction == Direction::Short),
            ),
        }
    }
}

fn equity_extremes(initial_capital: f64, equity_curve: &[EquityPoint]) -> (f64, f64) {
    equity_curve
        .iter()
        .fold((initial_capital, initial_capital), |(hi, lo), p| {
            (hi.max(p.equity), lo.min(p.equity))
        })
}

/// Largest `(peak - equity) / peak` seen while walking the curve, as a fraction.
fn running_drawdown(initial_capital: f64, equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_sharpe(equity_curve: &[EquityPoint], per_bar_rf: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean - per_bar_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
