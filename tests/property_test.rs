//! Property tests for indicator invariants and backtest accounting.

mod common;

use barsmith::domain::align::align_to_common_tail;
use barsmith::domain::backtest::run_backtest;
use barsmith::domain::indicator::{
    calculate_adx, calculate_atr, ema_values, macd_values, rsi_values, sma_values, wma_values,
};
use barsmith::domain::ohlcv::Bar;
use barsmith::domain::position::ExitReason;
use barsmith::domain::price_series::PriceSeries;
use barsmith::domain::signal::{Direction, Signal};
use common::*;
use proptest::prelude::*;

fn closes_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, min..max)
}

fn bars_from(closes: &[f64], spreads: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .zip(spreads.iter().cycle())
        .enumerate()
        .map(|(i, (&c, &s))| Bar::new(day(i as i64), c, c + s, c - s.min(c / 2.0), c, 100.0))
        .collect();
    PriceSeries::new(bars).unwrap()
}

proptest! {
    #[test]
    fn sma_length_and_last_value(closes in closes_strategy(1, 80), period in 1usize..20) {
        let out = sma_values(&closes, period);
        if closes.len() < period {
            prop_assert!(out.is_empty());
        } else {
            prop_assert_eq!(out.len(), closes.len() - period + 1);
            let tail = &closes[closes.len() - period..];
            let mean = tail.iter().sum::<f64>() / period as f64;
            let last = out[out.len() - 1];
            prop_assert!((last - mean).abs() < 1e-6 * mean.max(1.0));
        }
    }

    #[test]
    fn moving_averages_stay_within_input_range(closes in closes_strategy(1, 80), period in 1usize..20) {
        let lo = closes.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for v in sma_values(&closes, period)
            .into_iter()
            .chain(ema_values(&closes, period))
            .chain(wma_values(&closes, period))
        {
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }

    #[test]
    fn ema_seed_is_sma(closes in closes_strategy(1, 80), period in 1usize..20) {
        let ema = ema_values(&closes, period);
        let sma = sma_values(&closes, period);
        prop_assert_eq!(ema.len(), sma.len());
        if let (Some(e), Some(s)) = (ema.first(), sma.first()) {
            prop_assert!((e - s).abs() < 1e-9 * s.max(1.0));
        }
    }

    #[test]
    fn ema_is_deterministic(closes in closes_strategy(1, 80), period in 1usize..20) {
        prop_assert_eq!(ema_values(&closes, period), ema_values(&closes, period));
    }

    #[test]
    fn rsi_of_rising_series_is_100(start in 1.0f64..100.0, len in 2usize..50, period in 1usize..10) {
        let closes: Vec<f64> = (0..len).map(|i| start + i as f64).collect();
        for v in rsi_values(&closes, period) {
            prop_assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn rsi_is_bounded(closes in closes_strategy(2, 80), period in 1usize..20) {
        let out = rsi_values(&closes, period);
        prop_assert_eq!(out.len(), closes.len().saturating_sub(period));
        for v in out {
            prop_assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn atr_and_adx_are_non_negative(
        closes in closes_strategy(2, 80),
        spreads in prop::collection::vec(0.0f64..20.0, 1..10),
        period in 1usize..10,
    ) {
        let series = bars_from(&closes, &spreads);
        let atr = calculate_atr(&series, period);
        prop_assert_eq!(atr.values.len(), closes.len().saturating_sub(period));
        prop_assert!(atr.values.iter().all(|v| *v >= 0.0));

        match calculate_adx(&series, period) {
            Some(adx) => {
                prop_assert!(closes.len() > 2 * period);
                prop_assert_eq!(adx.adx.len(), closes.len() - 2 * period);
                for v in adx.adx.iter().chain(&adx.plus_di).chain(&adx.minus_di) {
                    prop_assert!(*v >= 0.0 && *v <= 100.0 + 1e-9);
                }
            }
            None => prop_assert!(closes.len() <= 2 * period),
        }
    }

    #[test]
    fn macd_histogram_is_line_difference(closes in closes_strategy(1, 120)) {
        if let Some(macd) = macd_values(&closes, 5, 13, 4) {
            prop_assert_eq!(macd.macd_line.len(), macd.signal_line.len());
            prop_assert_eq!(macd.histogram.len(), macd.macd_line.len());
            for i in 0..macd.histogram.len() {
                let diff = macd.macd_line[i] - macd.signal_line[i];
                prop_assert!((macd.histogram[i] - diff).abs() < 1e-9);
            }
        } else {
            prop_assert!(closes.len() < 13 + 4 - 1);
        }
    }

    #[test]
    fn alignment_keeps_tails(
        a in prop::collection::vec(-10.0f64..10.0, 0..30),
        b in prop::collection::vec(-10.0f64..10.0, 0..30),
    ) {
        let aligned = align_to_common_tail(&[&a, &b]);
        let len = a.len().min(b.len());
        prop_assert_eq!(aligned[0].len(), len);
        prop_assert_eq!(aligned[1].len(), len);
        prop_assert_eq!(aligned[0], &a[a.len() - len..]);
        prop_assert_eq!(aligned[1], &b[b.len() - len..]);
    }

    #[test]
    fn backtest_accounting(
        closes in closes_strategy(1, 60),
        raw_signals in prop::collection::vec((0usize..60, any::<bool>(), any::<bool>()), 0..30),
    ) {
        let series = make_series(&closes);
        let signals: Vec<Signal> = raw_signals
            .iter()
            .filter(|(i, _, _)| *i < closes.len())
            .map(|&(i, is_entry, long)| {
                let direction = if long { Direction::Long } else { Direction::Short };
                if is_entry {
                    Signal::entry(day(i as i64), closes[i], direction, 0.5)
                } else {
                    Signal::exit(day(i as i64), closes[i], direction, 0.5)
                }
            })
            .collect();
        let entries = signals.iter().filter(|s| s.is_entry).count();
        let signal_count = signals.len();
        let strategy = ScriptedStrategy::new(signals);

        let result = run_backtest(&strategy, &series, &frictionless_config(1000.0))
            .unwrap()
            .unwrap();

        prop_assert_eq!(result.equity_curve.len(), closes.len());
        prop_assert!(result.trades.len() <= entries);
        prop_assert!(result.trades.len() <= signal_count / 2 + 1);
        for trade in &result.trades {
            prop_assert!(trade.exit_time >= trade.entry_time);
        }
        for pair in result.trades.windows(2) {
            prop_assert!(pair[0].exit_time <= pair[1].entry_time);
        }

        let profit: f64 = result.trades.iter().map(|t| t.profit).sum();
        let scale = result
            .equity_curve
            .iter()
            .map(|p| p.equity.abs())
            .fold(1000.0, f64::max);
        prop_assert!((1000.0 + profit - result.final_equity).abs() < 1e-9 * scale);

        // the walked curve excludes only an end-of-data close
        let forced: f64 = result
            .trades
            .iter()
            .filter(|t| t.exit_reason == ExitReason::EndOfData)
            .map(|t| t.profit)
            .sum();
        let walked = result.equity_curve[result.equity_curve.len() - 1].equity;
        prop_assert!((walked + forced - result.final_equity).abs() < 1e-9 * scale);
        prop_assert_eq!(
            result.metrics.winning_trades + result.metrics.losing_trades,
            result.trades.len()
        );
    }
}
