#[cfg(test)]
mod planner_tests {
    use crate::models::*;
    use crate::plan::*;
    use crate::sizing::target_returns;
    use crate::targets::*;
    use analysis_core::{AnalysisError, Decision, TrendPrediction};
    use proptest::prelude::*;
    use technical_analysis::SrZone;

    fn planner() -> PriceTargetPlanner {
        PriceTargetPlanner::new()
    }

    fn buy_side_levels() -> PlannerLevels {
        PlannerLevels {
            support: Some(95.0),
            resistance: Some(108.0),
            long_support: Some(92.0),
            long_resistance: Some(110.0),
            bb_upper: Some(104.0),
            bb_lower: Some(96.0),
            ..Default::default()
        }
    }

    #[test]
    fn sideways_targets_follow_tiers() {
        let targets = planner()
            .targets(100.0, 2.0, &PlannerLevels::default(), TrendPrediction::Sideways)
            .unwrap();
        assert_eq!(targets.up, vec![102.0, 105.0]);
        assert_eq!(targets.down, vec![98.0, 95.0]);

        // volatility below the base tier changes nothing
        let calm = planner()
            .targets(100.0, 0.5, &buy_side_levels(), TrendPrediction::PossibleUptrend)
            .unwrap();
        assert_eq!(calm, targets);
    }

    #[test]
    fn tiers_scale_with_volatility() {
        let tiers = Tiers::from_volatility(4.0);
        assert!((tiers.pct1 - 0.04).abs() < 1e-12);
        assert!((tiers.pct2 - 0.07).abs() < 1e-12);
        assert!((tiers.pct3 - 0.12).abs() < 1e-12);
    }

    #[test]
    fn priority_candidates_win_over_nearer_levels() {
        let pool = CandidatePool::new()
            .with_priority("Short_Resistance", Some(104.0))
            .with_level("BB_Upper", Some(103.0));
        assert_eq!(select_level(&pool, 102.0, Direction::Up), Some(104.0));

        let pool = CandidatePool::new()
            .with_priority("Short_Resistance", Some(101.0))
            .with_level("BB_Upper", Some(106.0))
            .with_level("Resistance", Some(103.0));
        assert_eq!(select_level(&pool, 102.0, Direction::Up), Some(103.0));
        assert_eq!(select_level(&pool, 107.0, Direction::Up), None);

        let down = CandidatePool::new()
            .with_level("Support", Some(94.0))
            .with_level("BB_Lower", Some(97.0))
            .with_level("S2", None);
        assert_eq!(select_level(&down, 98.0, Direction::Down), Some(97.0));
        assert_eq!(down.len(), 2);
    }

    #[test]
    fn strong_uptrend_looks_up_levels() {
        let levels = PlannerLevels {
            short_resistance: Some(103.0),
            long_resistance: Some(108.0),
            bb_upper: Some(104.0),
            ..Default::default()
        };
        let targets = planner()
            .targets(100.0, 2.0, &levels, TrendPrediction::StrongUptrend)
            .unwrap();
        assert_eq!(targets.up, vec![102.0, 103.0, 108.0]);
        // no support-side levels, so the tiers are used as is
        assert_eq!(targets.down, vec![98.0, 95.0, 90.0]);
    }

    #[test]
    fn fallback_behind_previous_target_is_pushed_out() {
        let levels = PlannerLevels {
            short_resistance: Some(120.0),
            ..Default::default()
        };
        let targets = planner()
            .targets(100.0, 2.0, &levels, TrendPrediction::StrongDowntrend)
            .unwrap();
        assert_eq!(targets.up, vec![102.0, 120.0, 126.0]);
    }

    #[test]
    fn level_equal_to_previous_target_is_skipped() {
        let levels = PlannerLevels {
            short_support: Some(98.0),
            ..Default::default()
        };
        let targets = planner()
            .targets(100.0, 2.0, &levels, TrendPrediction::StrongDowntrend)
            .unwrap();
        assert_eq!(targets.down, vec![98.0, 95.0, 90.0]);
    }

    #[test]
    fn zone_bounds_join_the_pools() {
        let levels = PlannerLevels {
            zones: vec![
                SrZone { low: 90.0, high: 92.0 },
                SrZone { low: 95.0, high: 97.0 },
                SrZone { low: 103.0, high: 105.0 },
            ],
            ..Default::default()
        };
        let up = levels.up_candidates(100.0);
        let values: Vec<f64> = up.rest.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![103.0, 105.0]);
        assert_eq!(levels.down_candidates(100.0).rest.len(), 4);

        assert_eq!(levels.zone_floor_below(100.0), Some(95.0));
        assert_eq!(levels.zone_ceiling_above(100.0), Some(105.0));
        assert_eq!(levels.zone_high_above(100.0), Some(105.0));
        assert_eq!(levels.zone_low_below(100.0), Some(95.0));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let err = planner()
            .targets(0.0, 2.0, &PlannerLevels::default(), TrendPrediction::Sideways)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CalculationError(_)));
    }

    #[test]
    fn buy_plan_uses_nearest_levels() {
        let plan = planner()
            .plan(Decision::Buy, TrendPrediction::Sideways, 100.0, 2.0, &buy_side_levels())
            .unwrap();
        assert_eq!(plan.entry_point, 96.0);
        assert_eq!(plan.exit_point, 104.0);
        assert_eq!(plan.stop_loss, 91.2);
        assert_eq!(plan.reward_to_risk, Some(1.67));
        assert_eq!(plan.up_targets, vec![102.0, 105.0]);
    }

    #[test]
    fn sell_plan_mirrors_buy() {
        let plan = planner()
            .plan(Decision::StrongSell, TrendPrediction::Sideways, 100.0, 2.0, &buy_side_levels())
            .unwrap();
        assert_eq!(plan.entry_point, 104.0);
        assert_eq!(plan.exit_point, 96.0);
        assert_eq!(plan.stop_loss, 109.2);
        assert_eq!(plan.reward_to_risk, Some(1.54));
    }

    #[test]
    fn hold_plan_exits_at_current_price() {
        let plan = planner()
            .plan(Decision::Hold, TrendPrediction::Sideways, 100.004, 2.0, &buy_side_levels())
            .unwrap();
        assert_eq!(plan.entry_point, 96.0);
        assert_eq!(plan.exit_point, 100.0);
        assert_eq!(plan.stop_loss, 91.2);
        assert_eq!(plan.reward_to_risk, None);
    }

    #[test]
    fn plan_without_levels_falls_back_to_price() {
        let plan = planner()
            .plan(Decision::Buy, TrendPrediction::Sideways, 100.0, 2.0, &PlannerLevels::default())
            .unwrap();
        assert_eq!(plan.entry_point, 100.0);
        assert_eq!(plan.exit_point, 105.0);
        assert_eq!(plan.stop_loss, 95.0);
        assert_eq!(plan.reward_to_risk, Some(1.0));
    }

    #[test]
    fn exit_stays_above_an_entry_over_the_price() {
        let levels = PlannerLevels {
            support: Some(150.0),
            ..Default::default()
        };
        let plan = planner()
            .plan(Decision::Buy, TrendPrediction::Sideways, 100.0, 2.0, &levels)
            .unwrap();
        assert_eq!(plan.entry_point, 150.0);
        assert_eq!(plan.exit_point, 157.5);
        assert!(plan.stop_loss < plan.entry_point);
    }

    #[test]
    fn reward_to_risk_undefined_on_losing_side() {
        assert_eq!(reward_to_risk(Decision::Buy, 100.0, 95.0, 95.0), None);
        assert_eq!(reward_to_risk(Decision::Sell, 100.0, 104.0, 105.0), None);
        assert_eq!(reward_to_risk(Decision::Hold, 100.0, 110.0, 95.0), None);
        assert_eq!(reward_to_risk(Decision::Sell, 100.0, 90.0, 105.0), Some(2.0));
    }

    #[test]
    fn position_sizing_and_returns() {
        let sizing = PositionSizing::for_investment(10_000.0, 150.0);
        assert_eq!(sizing.shares, 66);
        assert_eq!(sizing.invested, 9900.0);
        assert_eq!(sizing.remaining_cash, 100.0);
        assert_eq!(PositionSizing::for_investment(10_000.0, 0.0).shares, 0);

        let targets = PriceTargets {
            up: vec![102.0, 105.0],
            down: vec![98.0],
        };
        let rows = target_returns(100.0, 10, &targets);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].label, "Upward - Target 1 (+2.0%)");
        assert_eq!(rows[0].profit_loss, 20.0);
        assert_eq!(rows[1].direction, Direction::Up);
        assert_eq!(rows[2].label, "Downward - Target 1 (-2.0%)");
        assert_eq!(rows[2].profit_loss, -20.0);
    }

    #[test]
    fn sub_dollar_buy_plan_keeps_points_apart() {
        let levels = PlannerLevels {
            support: Some(0.0485),
            resistance: Some(0.0515),
            ..Default::default()
        };
        let plan = planner()
            .plan(Decision::Buy, TrendPrediction::Sideways, 0.05, 2.0, &levels)
            .unwrap();
        assert_eq!(plan.entry_point, 0.0485);
        assert_eq!(plan.exit_point, 0.0515);
        assert!(plan.stop_loss < plan.entry_point);
        assert!((plan.stop_loss - 0.0485 * 0.95).abs() < 1e-5);
        assert!(plan.reward_to_risk.is_some_and(|rr| rr > 1.0));
        assert_eq!(plan.up_targets, vec![0.051, 0.0525]);
    }

    #[test]
    fn penny_prices_without_levels_use_fallbacks() {
        let buy = planner()
            .plan(Decision::Buy, TrendPrediction::Sideways, 0.004, 2.0, &PlannerLevels::default())
            .unwrap();
        assert_eq!(buy.entry_point, 0.004);
        assert_eq!(buy.exit_point, 0.0042);
        assert_eq!(buy.stop_loss, 0.0038);
        assert_eq!(buy.reward_to_risk, Some(1.0));

        let sell = planner()
            .plan(Decision::Sell, TrendPrediction::Sideways, 0.004, 2.0, &PlannerLevels::default())
            .unwrap();
        assert_eq!(sell.exit_point, 0.0038);
        assert_eq!(sell.stop_loss, 0.0042);
    }

    #[test]
    fn stop_and_exit_stay_a_tick_off_the_entry() {
        assert_eq!(stop_loss(Decision::Buy, 0.01), 0.0095);
        assert!(stop_loss(Decision::Buy, 1.0) < 1.0);
        assert!(stop_loss(Decision::Sell, 1.0) > 1.0);

        // no level clears an entry above the price
        let targets = PriceTargets { up: vec![1.0001], down: vec![0.9999] };
        let exit = exit_point(Decision::Buy, 1.0, 1.05, &targets, &PlannerLevels::default());
        assert!(exit > 1.05);
    }

    #[test]
    fn only_strong_trends_look_up_levels() {
        assert_eq!(TargetMode::for_prediction(TrendPrediction::StrongUptrend), TargetMode::LevelLookup);
        assert_eq!(TargetMode::for_prediction(TrendPrediction::StrongDowntrend), TargetMode::LevelLookup);
        assert_eq!(TargetMode::for_prediction(TrendPrediction::PossibleDowntrend), TargetMode::Sideways);
    }

    fn level(price: f64) -> impl Strategy<Value = Option<f64>> {
        prop::option::of(0.5..1.5_f64).prop_map(move |f| f.map(|f| f * price))
    }

    fn arb_levels(price: f64) -> impl Strategy<Value = PlannerLevels> {
        (
            (level(price), level(price), level(price), level(price)),
            (level(price), level(price), level(price), level(price)),
            prop::collection::vec((0.5..1.5_f64, 0.0..0.05_f64), 0..4),
        )
            .prop_map(move |((s, r, ss, sr), (ls, lr, bu, bl), zones)| PlannerLevels {
                support: s,
                resistance: r,
                short_support: ss,
                short_resistance: sr,
                long_support: ls,
                long_resistance: lr,
                bb_upper: bu,
                bb_lower: bl,
                fibonacci: None,
                pivot: None,
                zones: zones
                    .into_iter()
                    .map(|(lo, width)| SrZone {
                        low: lo * price,
                        high: (lo + width) * price,
                    })
                    .collect(),
            })
    }

    fn arb_case() -> impl Strategy<Value = (f64, f64, PlannerLevels)> {
        let price = prop_oneof![0.004..1.0_f64, 1.0..1000.0_f64];
        (price, 0.0..15.0_f64).prop_flat_map(|(price, vol)| (Just(price), Just(vol), arb_levels(price)))
    }

    fn arb_prediction() -> impl Strategy<Value = TrendPrediction> {
        prop_oneof![
            Just(TrendPrediction::StrongUptrend),
            Just(TrendPrediction::StrongDowntrend),
            Just(TrendPrediction::Sideways),
            Just(TrendPrediction::PossibleUptrend),
        ]
    }

    fn arb_decision() -> impl Strategy<Value = Decision> {
        prop_oneof![
            Just(Decision::StrongBuy),
            Just(Decision::Buy),
            Just(Decision::Hold),
            Just(Decision::Sell),
            Just(Decision::StrongSell),
        ]
    }

    proptest! {
        #[test]
        fn targets_move_strictly_away_from_price(
            (price, vol, levels) in arb_case(),
            prediction in arb_prediction(),
        ) {
            let targets = planner().targets(price, vol, &levels, prediction).unwrap();
            let expected_len = match TargetMode::for_prediction(prediction) {
                TargetMode::LevelLookup => 3,
                TargetMode::Sideways => 2,
            };
            prop_assert_eq!(targets.up.len(), expected_len);
            prop_assert_eq!(targets.down.len(), expected_len);

            prop_assert!(targets.up[0] > price);
            prop_assert!(targets.down[0] < price);
            for pair in targets.up.windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
            for pair in targets.down.windows(2) {
                prop_assert!(pair[1] < pair[0]);
            }
        }

        #[test]
        fn plan_points_are_ordered(
            (price, vol, levels) in arb_case(),
            prediction in arb_prediction(),
            decision in arb_decision(),
        ) {
            let plan = planner().plan(decision, prediction, price, vol, &levels).unwrap();
            if decision.is_buy() {
                prop_assert!(plan.stop_loss < plan.entry_point);
                prop_assert!(plan.entry_point < plan.exit_point);
            } else if decision.is_sell() {
                prop_assert!(plan.exit_point < plan.entry_point);
                prop_assert!(plan.entry_point < plan.stop_loss);
            } else {
                prop_assert_eq!(plan.reward_to_risk, None);
            }
            if let Some(rr) = plan.reward_to_risk {
                prop_assert!(rr >= 0.0);
            }
        }
    }
}
