use finsim_core::engine::model::{BreakEven, YearInput, YearState};
use finsim_core::engine::year::{calculate_year, simulate_years};
use finsim_core::params::SimulationParameters;
use finsim_core::simulation::report::build_final_report;
use finsim_core::simulation::state::SimulationState;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn classroom_input() -> YearInput {
    YearInput {
        units_sold: dec!(1000),
        unit_price: dec!(20),
        unit_variable_cost: dec!(10),
        fixed_costs: dec!(5000),
        new_investment: dec!(0),
        new_loans: dec!(0),
        new_equity: dec!(0),
        collection_days: dec!(30),
        payment_days: dec!(30),
    }
}

fn year_one(input: &YearInput) -> YearState {
    calculate_year(input, 1, None, &SimulationParameters::default()).unwrap()
}

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_classroom_year_one_reference_figures() {
    let s = year_one(&classroom_input());

    assert_eq!(s.year, 1);
    assert_eq!(s.revenue, dec!(20000));
    assert_eq!(s.total_variable_costs, dec!(10000));
    assert_eq!(s.ebit, dec!(5000));
    assert_eq!(s.interest, dec!(0));
    assert_eq!(s.ebt, dec!(5000));
    assert_eq!(s.tax, dec!(1250));
    assert_eq!(s.net_income, dec!(3750));
    assert_eq!(s.break_even_units, BreakEven::Finite(dec!(500)));
    assert_eq!(s.break_even_revenue, BreakEven::Finite(dec!(10000)));
    // Without investment the valuation cash flow is just net income
    assert_eq!(s.cash_flow, dec!(3750));
}

// ===========================================================================
// Balance identity
// ===========================================================================

#[test]
fn test_identity_holds_across_a_multi_year_run() {
    let inputs = vec![
        YearInput {
            new_investment: dec!(4000),
            new_loans: dec!(3000),
            ..classroom_input()
        },
        YearInput {
            units_sold: dec!(1250),
            new_equity: dec!(2000),
            collection_days: dec!(45),
            payment_days: dec!(60),
            ..classroom_input()
        },
        YearInput {
            units_sold: dec!(1400),
            unit_price: dec!(21.5),
            new_investment: dec!(1000),
            ..classroom_input()
        },
    ];
    let history = simulate_years(&inputs, &SimulationParameters::default()).unwrap();

    for s in &history {
        let bs = &s.balance_sheet;
        assert!(bs.assets.cash >= Decimal::ZERO);
        assert_eq!(
            bs.assets.total,
            bs.liabilities.total + bs.equity.total,
            "year {} unbalanced",
            s.year
        );
    }
}

#[test]
fn test_identity_breaks_when_cash_would_be_negative() {
    let s = year_one(&YearInput {
        new_investment: dec!(40000),
        ..classroom_input()
    });
    let bs = &s.balance_sheet;

    let plug = (bs.equity.total + bs.liabilities.total) - (bs.assets.fixed + bs.assets.receivables);
    assert!(plug < Decimal::ZERO);
    assert_eq!(bs.assets.cash, Decimal::ZERO);
    assert!(bs.assets.total != bs.liabilities.total + bs.equity.total);
    // Assets now exceed funding by exactly the missing cash
    assert_eq!(bs.imbalance(), plug);
}

// ===========================================================================
// Break-even sentinel
// ===========================================================================

#[test]
fn test_price_equal_to_variable_cost_is_infinite_break_even() {
    let s = year_one(&YearInput {
        unit_price: dec!(10),
        unit_variable_cost: dec!(10),
        ..classroom_input()
    });

    assert!(s.break_even_units.is_infinite());
    assert!(s.break_even_revenue.is_infinite());
    assert_eq!(s.break_even_units.finite(), None);

    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["break_even_units"], "Infinity");
    assert_eq!(json["break_even_revenue"], "Infinity");
}

#[test]
fn test_zero_price_with_zero_margin_stays_infinite() {
    let s = year_one(&YearInput {
        unit_price: dec!(0),
        unit_variable_cost: dec!(0),
        ..classroom_input()
    });
    assert_eq!(s.break_even_revenue, BreakEven::Unreachable);
}

// ===========================================================================
// Carry-forward
// ===========================================================================

#[test]
fn test_loans_accumulate_and_interest_uses_total() {
    let params = SimulationParameters::default();
    let y1 = calculate_year(
        &YearInput {
            new_loans: dec!(8000),
            ..classroom_input()
        },
        1,
        None,
        &params,
    )
    .unwrap();
    assert_eq!(y1.balance_sheet.liabilities.loans, dec!(8000));

    let y2 = calculate_year(
        &YearInput {
            new_loans: dec!(2000),
            ..classroom_input()
        },
        2,
        Some(&y1),
        &params,
    )
    .unwrap();

    assert_eq!(y2.balance_sheet.liabilities.loans, dec!(10000));
    // 4% on 8000 + 2000, not on 2000
    assert_eq!(y2.interest, dec!(400));
}

#[test]
fn test_state_round_trips_through_json_as_previous_year() {
    let params = SimulationParameters::default();
    let y1 = year_one(&YearInput {
        new_loans: dec!(1000),
        new_investment: dec!(500),
        ..classroom_input()
    });

    let json = serde_json::to_string(&y1).unwrap();
    let restored: YearState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, y1);

    let direct = calculate_year(&classroom_input(), 2, Some(&y1), &params).unwrap();
    let via_json = calculate_year(&classroom_input(), 2, Some(&restored), &params).unwrap();
    assert_eq!(direct, via_json);
}

// ===========================================================================
// Driver
// ===========================================================================

#[test]
fn test_driver_run_matches_batch_projection() {
    let params = SimulationParameters::default();
    let inputs = vec![
        classroom_input(),
        YearInput {
            units_sold: dec!(1500),
            ..classroom_input()
        },
        YearInput {
            new_loans: dec!(5000),
            ..classroom_input()
        },
    ];

    let mut state = SimulationState::start(3).unwrap();
    for input in &inputs {
        state = state.advance(input.clone(), &params).unwrap();
    }

    assert!(state.config.is_finished);
    assert_eq!(state.results, simulate_years(&inputs, &params).unwrap());

    let report = build_final_report(&state.results, &params).unwrap();
    assert_eq!(report.result.npv, state.npv(&params).unwrap());
    assert_eq!(report.result.years.len(), 3);
}
