//! Pipeline aggregation.
//!
//! Every function here is a pure fold over a (possibly pre-filtered) slice
//! of opportunities, recomputed from scratch on each call. Nothing is cached
//! and nothing reads the clock; period bucketing takes `today` explicitly.
//!
//! Empty denominators resolve to 0.0 rather than NaN so downstream sums
//! stay finite.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::model::{ForecastCategory, Opportunity, OpportunityStage};

/// Sum of an arbitrary numeric field over a collection.
pub fn sum_by<T, F>(records: &[T], field: F) -> f64
where
    F: Fn(&T) -> f64,
{
    records.iter().map(field).sum()
}

/// Unweighted sum of deal amounts.
pub fn total_amount(opportunities: &[Opportunity]) -> f64 {
    sum_by(opportunities, |o| o.amount)
}

/// Probability-weighted sum over pipeline-eligible deals.
///
/// Lost deals are excluded; everything else (including won deals, whose
/// probability is typically 100) still counts toward the projection.
pub fn pipeline_value(opportunities: &[Opportunity]) -> f64 {
    opportunities
        .iter()
        .filter(|o| o.stage != OpportunityStage::ClosedLost)
        .map(|o| o.weighted_amount())
        .sum()
}

/// Won deals as a percentage of all closed deals, 0.0 when nothing closed.
pub fn win_rate(opportunities: &[Opportunity]) -> f64 {
    let won = opportunities
        .iter()
        .filter(|o| o.stage == OpportunityStage::ClosedWon)
        .count();
    let closed = opportunities.iter().filter(|o| o.stage.is_closed()).count();
    ratio_pct(won, closed)
}

fn ratio_pct(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Whole-collection snapshot for the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    pub deal_count: usize,
    pub open_count: usize,
    pub total_amount: f64,
    pub pipeline_value: f64,
    pub win_rate: f64,
    pub commit_count: usize,
    pub best_case_count: usize,
    pub pipeline_count: usize,
}

/// Computes the full summary in one pass over the slice.
pub fn summarize(opportunities: &[Opportunity]) -> PipelineSummary {
    let mut summary = PipelineSummary {
        deal_count: opportunities.len(),
        total_amount: total_amount(opportunities),
        pipeline_value: pipeline_value(opportunities),
        win_rate: win_rate(opportunities),
        ..Default::default()
    };

    for opp in opportunities {
        if opp.stage.is_closed() {
            continue;
        }
        summary.open_count += 1;
        match opp.forecast_category() {
            ForecastCategory::Commit => summary.commit_count += 1,
            ForecastCategory::BestCase => summary.best_case_count += 1,
            ForecastCategory::Pipeline => summary.pipeline_count += 1,
        }
    }

    summary
}

/// Per-owner rollup of the deals they own.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub owner: String,
    pub deal_count: usize,
    pub total_amount: f64,
    pub weighted_amount: f64,
    pub avg_probability: f64,
    pub win_rate: f64,
}

/// Groups deals by owner, sorted descending by weighted amount.
///
/// Ties keep first-seen order (stable sort over insertion-ordered groups).
pub fn group_by_owner(opportunities: &[Opportunity]) -> Vec<OwnerSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&Opportunity>> = HashMap::new();

    for opp in opportunities {
        if !groups.contains_key(&opp.owner) {
            order.push(opp.owner.clone());
        }
        groups.entry(opp.owner.clone()).or_default().push(opp);
    }

    let mut summaries: Vec<OwnerSummary> = order
        .into_iter()
        .map(|owner| {
            let deals = groups.remove(&owner).unwrap_or_default();
            let count = deals.len();
            let prob_sum: f64 = deals.iter().map(|o| f64::from(o.probability)).sum();
            let won = deals
                .iter()
                .filter(|o| o.stage == OpportunityStage::ClosedWon)
                .count();
            let closed = deals.iter().filter(|o| o.stage.is_closed()).count();

            OwnerSummary {
                owner,
                deal_count: count,
                total_amount: deals.iter().map(|o| o.amount).sum(),
                weighted_amount: deals
                    .iter()
                    .filter(|o| o.stage != OpportunityStage::ClosedLost)
                    .map(|o| o.weighted_amount())
                    .sum(),
                avg_probability: if count == 0 {
                    0.0
                } else {
                    prob_sum / count as f64
                },
                win_rate: ratio_pct(won, closed),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.weighted_amount
            .partial_cmp(&a.weighted_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

/// Calendar bucket for close-date reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Quarter,
    Year,
}

impl std::str::FromStr for Period {
    type Err = crate::error::FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(crate::error::FunnelError::Api(format!(
                "Unknown period: {}",
                other
            ))),
        }
    }
}

/// Calendar-aligned inclusive `[start, end]` bounds containing `today`.
pub fn period_bounds(period: Period, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (start_month, len_months) = match period {
        Period::Month => (today.month(), 1),
        Period::Quarter => ((today.month0() / 3) * 3 + 1, 3),
        Period::Year => (1, 12),
    };
    let start = NaiveDate::from_ymd_opt(today.year(), start_month, 1).unwrap_or(today);
    let end = start
        .checked_add_months(Months::new(len_months))
        .and_then(|d| d.pred_opt())
        .unwrap_or(start);
    (start, end)
}

/// Deals whose expected close date falls inside the current period and that
/// are still winnable (stage ≠ Closed Lost). Deals with no close date never
/// match.
pub fn closing_in_period(
    opportunities: &[Opportunity],
    period: Period,
    today: NaiveDate,
) -> Vec<Opportunity> {
    let (start, end) = period_bounds(period, today);
    opportunities
        .iter()
        .filter(|o| o.stage != OpportunityStage::ClosedLost)
        .filter(|o| match o.expected_close_date {
            Some(date) => date >= start && date <= end,
            None => false,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opp(name: &str, amount: f64, probability: u8, stage: OpportunityStage) -> Opportunity {
        let mut o = Opportunity::new(name, amount, probability);
        o.stage = stage;
        o
    }

    fn owned(owner: &str, amount: f64, probability: u8, stage: OpportunityStage) -> Opportunity {
        let mut o = opp("deal", amount, probability, stage);
        o.owner = owner.into();
        o
    }

    #[test]
    fn weighted_sum_matches_hand_computation() {
        let opps = vec![
            opp("a", 100_000.0, 80, OpportunityStage::Qualification),
            opp("b", 50_000.0, 50, OpportunityStage::Proposal),
            opp("c", 25_000.0, 20, OpportunityStage::Negotiation),
        ];
        assert_eq!(pipeline_value(&opps), 110_000.0);
        assert_eq!(total_amount(&opps), 175_000.0);
    }

    #[test]
    fn pipeline_value_excludes_lost_deals() {
        let opps = vec![
            opp("live", 10_000.0, 50, OpportunityStage::Proposal),
            opp("dead", 90_000.0, 50, OpportunityStage::ClosedLost),
        ];
        assert_eq!(pipeline_value(&opps), 5_000.0);
        // The unweighted total still counts everything.
        assert_eq!(total_amount(&opps), 100_000.0);
    }

    #[test]
    fn win_rate_is_bounded_and_defined_on_empty() {
        assert_eq!(win_rate(&[]), 0.0);

        let no_closed = vec![opp("open", 1.0, 50, OpportunityStage::Proposal)];
        assert_eq!(win_rate(&no_closed), 0.0);

        let opps = vec![
            opp("w1", 1.0, 100, OpportunityStage::ClosedWon),
            opp("w2", 1.0, 100, OpportunityStage::ClosedWon),
            opp("l1", 1.0, 0, OpportunityStage::ClosedLost),
            opp("open", 1.0, 50, OpportunityStage::Proposal),
        ];
        let rate = win_rate(&opps);
        assert!((rate - 66.666).abs() < 0.01);
        assert!((0.0..=100.0).contains(&rate));
    }

    #[test]
    fn summarize_buckets_open_deals_by_category() {
        let opps = vec![
            opp("commit", 1.0, 90, OpportunityStage::Negotiation),
            opp("best", 1.0, 50, OpportunityStage::Proposal),
            opp("pipe", 1.0, 10, OpportunityStage::Qualification),
            opp("won", 1.0, 100, OpportunityStage::ClosedWon),
            opp("lost", 1.0, 0, OpportunityStage::ClosedLost),
        ];
        let summary = summarize(&opps);
        assert_eq!(summary.deal_count, 5);
        assert_eq!(summary.open_count, 3);
        assert_eq!(summary.commit_count, 1);
        assert_eq!(summary.best_case_count, 1);
        assert_eq!(summary.pipeline_count, 1);
        assert_eq!(summary.win_rate, 50.0);
    }

    #[test]
    fn owners_sorted_by_weighted_amount_descending() {
        let opps = vec![
            owned("lee", 10_000.0, 10, OpportunityStage::Qualification),
            owned("dana", 100_000.0, 80, OpportunityStage::Proposal),
            owned("lee", 20_000.0, 50, OpportunityStage::Proposal),
        ];

        let groups = group_by_owner(&opps);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].owner, "dana");
        assert_eq!(groups[0].weighted_amount, 80_000.0);
        assert_eq!(groups[1].owner, "lee");
        assert_eq!(groups[1].weighted_amount, 11_000.0);
        assert_eq!(groups[1].deal_count, 2);
        assert_eq!(groups[1].avg_probability, 30.0);
    }

    #[test]
    fn owner_ties_keep_first_seen_order() {
        let opps = vec![
            owned("alpha", 1_000.0, 50, OpportunityStage::Proposal),
            owned("beta", 1_000.0, 50, OpportunityStage::Proposal),
            owned("gamma", 1_000.0, 50, OpportunityStage::Proposal),
        ];
        let groups = group_by_owner(&opps);
        let owners: Vec<_> = groups.iter().map(|g| g.owner.as_str()).collect();
        assert_eq!(owners, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn owner_win_rate_counts_only_that_owners_deals() {
        let opps = vec![
            owned("dana", 1.0, 100, OpportunityStage::ClosedWon),
            owned("dana", 1.0, 0, OpportunityStage::ClosedLost),
            owned("lee", 1.0, 100, OpportunityStage::ClosedWon),
        ];
        let groups = group_by_owner(&opps);
        let dana = groups.iter().find(|g| g.owner == "dana").unwrap();
        let lee = groups.iter().find(|g| g.owner == "lee").unwrap();
        assert_eq!(dana.win_rate, 50.0);
        assert_eq!(lee.win_rate, 100.0);
    }

    #[test]
    fn period_bounds_are_calendar_aligned() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        let (ms, me) = period_bounds(Period::Month, today);
        assert_eq!(ms, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(me, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());

        let (qs, qe) = period_bounds(Period::Quarter, today);
        assert_eq!(qs, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        assert_eq!(qe, NaiveDate::from_ymd_opt(2026, 9, 30).unwrap());

        let (ys, ye) = period_bounds(Period::Year, today);
        assert_eq!(ys, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(ye, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn period_bounds_handle_year_edges() {
        let december = NaiveDate::from_ymd_opt(2026, 12, 15).unwrap();
        let (start, end) = period_bounds(Period::Quarter, december);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());

        let february = NaiveDate::from_ymd_opt(2028, 2, 10).unwrap();
        let (ms, me) = period_bounds(Period::Month, february);
        assert_eq!(ms, NaiveDate::from_ymd_opt(2028, 2, 1).unwrap());
        // 2028 is a leap year.
        assert_eq!(me, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
    }

    #[test]
    fn closing_in_period_filters_by_date_and_stage() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let mut in_month = opp("near", 1.0, 50, OpportunityStage::Proposal);
        in_month.expected_close_date = NaiveDate::from_ymd_opt(2026, 8, 20);
        let mut next_month = opp("far", 1.0, 50, OpportunityStage::Proposal);
        next_month.expected_close_date = NaiveDate::from_ymd_opt(2026, 9, 2);
        let mut lost = opp("lost", 1.0, 0, OpportunityStage::ClosedLost);
        lost.expected_close_date = NaiveDate::from_ymd_opt(2026, 8, 10);
        let dateless = opp("tbd", 1.0, 50, OpportunityStage::Proposal);

        let opps = vec![in_month.clone(), next_month.clone(), lost, dateless];

        let month = closing_in_period(&opps, Period::Month, today);
        assert_eq!(month.len(), 1);
        assert_eq!(month[0].name, "near");

        let quarter = closing_in_period(&opps, Period::Quarter, today);
        let names: Vec<_> = quarter.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["near", "far"]);
    }
}
