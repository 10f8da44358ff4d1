#[cfg(test)]
mod profile_tests {
    use crate::*;
    use screener_core::{Comparator, ConfigError, Metric, MetricSnapshot, Tristate};

    fn names(result: &screener_core::EvaluationResult) -> Vec<&str> {
        result.criteria.iter().map(|c| c.name.as_str()).collect()
    }

    /// Every base metric set to a value that keeps derived metrics defined.
    fn fully_populated() -> MetricSnapshot {
        let pairs: Vec<(Metric, f64)> = Metric::BASE
            .iter()
            .map(|m| {
                let value = match m {
                    Metric::ForwardPe => 12.0,
                    _ => 0.25,
                };
                (*m, value)
            })
            .collect();
        MetricSnapshot::from_pairs("FULL", &pairs)
    }

    #[test]
    fn test_builtin_thresholds_in_range() {
        for profile in builtin_profiles().unwrap() {
            assert!(profile.min_passing() <= profile.criteria().len());
        }
        let counts: Vec<(usize, usize)> = builtin_profiles()
            .unwrap()
            .iter()
            .map(|p| (p.min_passing(), p.criteria().len()))
            .collect();
        assert_eq!(counts, vec![(4, 6), (3, 5), (6, 10)]);
    }

    #[test]
    fn test_buffett_all_pass() {
        let snapshot = MetricSnapshot::from_pairs(
            "KO",
            &[
                (Metric::ReturnOnEquity, 0.18),
                (Metric::DebtToEquity, 0.4),
                (Metric::ProfitMargin, 0.12),
                (Metric::EpsGrowth, 0.11),
                (Metric::ForwardPe, 14.0),
                (Metric::PayoutRatio, 0.3),
            ],
        );

        let result = buffett().unwrap().evaluate(&snapshot);

        assert_eq!(result.profile, "Buffett");
        assert_eq!(result.ticker, "KO");
        assert_eq!(result.pass_count(), 6);
        assert!(result.criteria.iter().all(|c| c.outcome == Tristate::Pass));
        assert!(result.passes);
    }

    #[test]
    fn test_buffett_sparse_data() {
        let snapshot = MetricSnapshot::from_pairs("KO", &[(Metric::ReturnOnEquity, 0.10)]);

        let result = buffett().unwrap().evaluate(&snapshot);

        assert_eq!(result.outcome("roe"), Some(Tristate::Fail));
        for name in ["debt_to_equity", "profit_margin", "eps_growth", "forward_pe", "sgr"] {
            assert_eq!(result.outcome(name), Some(Tristate::Unknown), "{name}");
        }
        assert_eq!(result.pass_count(), 0);
        assert!(!result.passes);
    }

    #[test]
    fn test_lynch_pegy_unknown_when_forward_pe_zero() {
        let snapshot = MetricSnapshot::from_pairs(
            "T",
            &[
                (Metric::EpsGrowth, 0.15),
                (Metric::DividendYield, 0.05),
                (Metric::ForwardPe, 0.0),
            ],
        );

        let result = peter_lynch().unwrap().evaluate(&snapshot);

        assert_eq!(result.outcome("peg_y"), Some(Tristate::Unknown));
        assert_eq!(result.outcome("eps_stability"), Some(Tristate::Pass));
        assert_eq!(result.outcome("dividend_yield"), Some(Tristate::Pass));
    }

    #[test]
    fn test_lynch_threshold_is_inclusive() {
        let snapshot = MetricSnapshot::from_pairs(
            "WMT",
            &[
                (Metric::FiveYearAvgDividendYield, 0.12),
                (Metric::EpsGrowth, 0.15),
                (Metric::PegRatio, 0.8),
                (Metric::ForwardPe, 20.0),
                (Metric::DebtToEquity, 0.3),
                (Metric::NetCashPerShare, 2.0),
                (Metric::DividendYield, 0.03),
                (Metric::PayoutRatio, 0.7),
                (Metric::InventoryGrowth, 0.10),
                (Metric::RevenueGrowth, 0.05),
                (Metric::InventoryTurnover, 4.0),
            ],
        );

        let result = peter_lynch().unwrap().evaluate(&snapshot);

        assert_eq!(result.pass_count(), 6);
        assert_eq!(result.unknown_count(), 0);
        assert_eq!(result.total() - result.pass_count(), 4);
        assert!(result.passes);
        assert_eq!(result.outcome("peg_y"), Some(Tristate::Fail));
        assert_eq!(result.outcome("inventory_growth_vs_sales_growth"), Some(Tristate::Fail));
    }

    #[test]
    fn test_lynch_eps_proxy_reads_yahoo_percent() {
        // Yahoo publishes the five-year average yield in percent (0.62 = 0.62%)
        let snapshot = MetricSnapshot::from_pairs(
            "AAPL",
            &[(Metric::FiveYearAvgDividendYield, 0.62)],
        );
        let result = peter_lynch().unwrap().evaluate(&snapshot);
        assert_eq!(result.outcome("eps_growth"), Some(Tristate::Pass));

        let snapshot = MetricSnapshot::from_pairs(
            "TSLA",
            &[(Metric::FiveYearAvgDividendYield, 0.0)],
        );
        let result = peter_lynch().unwrap().evaluate(&snapshot);
        assert_eq!(result.outcome("eps_growth"), Some(Tristate::Fail));
    }

    #[test]
    fn test_munger_zero_free_cash_flow_is_evaluated() {
        let snapshot = MetricSnapshot::from_pairs("F", &[(Metric::FreeCashFlow, 0.0)]);

        let result = munger().unwrap().evaluate(&snapshot);

        assert_eq!(result.outcome("free_cash_flow"), Some(Tristate::Fail));
        assert_eq!(result.outcome("roe"), Some(Tristate::Unknown));
    }

    #[test]
    fn test_cross_field_needs_both_sides() {
        let rule = CriterionRule::cross_field("inv", Metric::InventoryGrowth, Comparator::Below, Metric::RevenueGrowth);

        let only_left = MetricSnapshot::from_pairs("X", &[(Metric::InventoryGrowth, -0.1)]);
        assert_eq!(rule.evaluate(&only_left), Tristate::Unknown);

        let both = MetricSnapshot::from_pairs(
            "X",
            &[(Metric::InventoryGrowth, -0.1), (Metric::RevenueGrowth, 0.0)],
        );
        assert_eq!(rule.evaluate(&both), Tristate::Pass);
        assert_eq!(rule.metrics(), vec![Metric::InventoryGrowth, Metric::RevenueGrowth]);
    }

    #[test]
    fn test_empty_snapshot_is_all_unknown() {
        let empty = MetricSnapshot::from_pairs("EMPTY", &[]);
        for profile in builtin_profiles().unwrap() {
            let result = profile.evaluate(&empty);
            assert_eq!(result.unknown_count(), result.total(), "{}", profile.name());
            assert!(!result.passes);
        }
    }

    #[test]
    fn test_fully_populated_has_no_unknowns() {
        let snapshot = fully_populated();
        for profile in builtin_profiles().unwrap() {
            let result = profile.evaluate(&snapshot);
            assert_eq!(result.unknown_count(), 0, "{}", profile.name());
            assert_eq!(result.passes, result.pass_count() >= profile.min_passing());
        }
    }

    #[test]
    fn test_order_and_idempotence() {
        let snapshot = fully_populated();
        for profile in builtin_profiles().unwrap() {
            let first = profile.evaluate(&snapshot);
            let second = profile.evaluate(&snapshot);
            assert_eq!(first, second);

            let declared: Vec<&str> = profile.criteria().iter().map(|r| r.name()).collect();
            assert_eq!(names(&first), declared);
        }
    }

    #[test]
    fn test_custom_profile() {
        fn positive_cash(snapshot: &MetricSnapshot) -> Tristate {
            Tristate::from_check(snapshot.get(Metric::NetCashPerShare).map(|v| v > 0.0))
        }

        let profile = InvestorProfile::new(
            "Cash Hoarder",
            vec![
                CriterionRule::custom("net_cash", positive_cash),
                CriterionRule::threshold("pb", Metric::PriceToBook, Comparator::AtMost, 1.0),
            ],
            1,
        )
        .unwrap();

        let snapshot = MetricSnapshot::from_pairs("X", &[(Metric::NetCashPerShare, 3.0)]);
        let result = profile.evaluate(&snapshot);

        assert_eq!(result.outcome("net_cash"), Some(Tristate::Pass));
        assert_eq!(result.outcome("pb"), Some(Tristate::Unknown));
        assert!(result.passes);
    }

    #[test]
    fn test_min_passing_out_of_range_rejected() {
        let err = InvestorProfile::new(
            "Greedy",
            vec![CriterionRule::threshold("roe", Metric::ReturnOnEquity, Comparator::AtLeast, 0.1)],
            2,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::MinPassingOutOfRange {
                profile: "Greedy".to_string(),
                min_passing: 2,
                rules: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_criterion_rejected() {
        let err = InvestorProfile::new(
            "Twice",
            vec![
                CriterionRule::threshold("roe", Metric::ReturnOnEquity, Comparator::AtLeast, 0.1),
                CriterionRule::threshold("roe", Metric::ReturnOnEquity, Comparator::AtLeast, 0.2),
            ],
            1,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::DuplicateCriterion { .. }));
    }

    #[test]
    fn test_duplicate_criterion_ignores_padding() {
        let err = InvestorProfile::new(
            "Padded",
            vec![
                CriterionRule::threshold("roe", Metric::ReturnOnEquity, Comparator::AtLeast, 0.1),
                CriterionRule::threshold("roe ", Metric::ReturnOnEquity, Comparator::AtLeast, 0.2),
            ],
            1,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::DuplicateCriterion {
                profile: "Padded".to_string(),
                criterion: "roe".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_names_rejected() {
        assert_eq!(
            InvestorProfile::new("  ", Vec::new(), 0).unwrap_err(),
            ConfigError::EmptyProfileName
        );
        let err = InvestorProfile::new(
            "Blank",
            vec![CriterionRule::threshold("", Metric::PegRatio, Comparator::Below, 1.0)],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCriterionName { .. }));
    }

    #[test]
    fn test_registry_lookup_and_selection() {
        let registry = ProfileRegistry::with_builtins().unwrap();

        assert_eq!(registry.names(), vec!["Buffett", "Munger", "Peter Lynch"]);
        assert!(registry.get("peter_lynch").is_some());
        assert!(registry.get("PETERLYNCH").is_some());
        assert!(registry.get("Graham").is_none());

        let selected = registry.select(&["munger", "Munger", "buffett"]).unwrap();
        let selected_names: Vec<&str> = selected.iter().map(|p| p.name()).collect();
        assert_eq!(selected_names, vec!["Munger", "Buffett"]);

        assert_eq!(registry.select(&["All"]).unwrap().len(), 3);
        assert_eq!(registry.select::<&str>(&[]).unwrap().len(), 3);
        assert_eq!(
            registry.select(&["Graham"]).unwrap_err(),
            ConfigError::UnknownProfile("Graham".to_string())
        );
    }

    #[test]
    fn test_registry_rejects_duplicate_profile() {
        let mut registry = ProfileRegistry::with_builtins().unwrap();
        let err = registry.register(buffett().unwrap()).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateProfile("Buffett".to_string()));
        assert_eq!(registry.len(), 3);
    }

    const GRAHAM: &str = r#"{
        "profiles": [
            {
                "name": "Graham",
                "min_passing": 1,
                "criteria": [
                    { "name": "pb", "metric": "priceToBook", "comparator": "<=", "value": 1.5 },
                    { "name": "inventory", "metric": "inventoryGrowth", "comparator": "<", "other": "revenueGrowth" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_profile_file() {
        let profiles = parse_profiles(GRAHAM).unwrap();
        assert_eq!(profiles.len(), 1);

        let graham = &profiles[0];
        assert_eq!(graham.name(), "Graham");
        assert_eq!(graham.min_passing(), 1);

        let snapshot = MetricSnapshot::from_pairs("X", &[(Metric::PriceToBook, 1.2)]);
        let result = graham.evaluate(&snapshot);
        assert_eq!(result.outcome("pb"), Some(Tristate::Pass));
        assert_eq!(result.outcome("inventory"), Some(Tristate::Unknown));
        assert!(result.passes);

        let mut registry = ProfileRegistry::with_builtins().unwrap();
        registry.register_all(profiles).unwrap();
        assert_eq!(registry.names().last().map(String::as_str), Some("Graham"));
    }

    #[test]
    fn test_parse_profile_file_rejects_ambiguous_criterion() {
        let json = r#"{ "profiles": [ { "name": "Bad", "min_passing": 0, "criteria": [
            { "name": "x", "metric": "pegRatio", "comparator": "<", "value": 1.0, "other": "forwardPE" }
        ] } ] }"#;
        assert!(matches!(parse_profiles(json), Err(ConfigError::InvalidProfileFile(_))));

        let unknown_metric = r#"{ "profiles": [ { "name": "Bad", "min_passing": 0, "criteria": [
            { "name": "x", "metric": "marketCap", "comparator": "<", "value": 1.0 }
        ] } ] }"#;
        assert!(matches!(parse_profiles(unknown_metric), Err(ConfigError::InvalidProfileFile(_))));
    }

    #[test]
    fn test_parse_profile_file_validates_threshold() {
        let json = r#"{ "profiles": [ { "name": "Bad", "min_passing": 3, "criteria": [
            { "name": "x", "metric": "pegRatio", "comparator": "<", "value": 1.0 }
        ] } ] }"#;
        assert!(matches!(parse_profiles(json), Err(ConfigError::MinPassingOutOfRange { .. })));
    }

    #[test]
    fn test_load_profiles_from_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GRAHAM.as_bytes()).unwrap();
        assert_eq!(load_profiles(file.path()).unwrap().len(), 1);

        let missing = load_profiles(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::InvalidProfileFile(_))));
    }
}
