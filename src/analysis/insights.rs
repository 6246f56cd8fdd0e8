//! Rule-based business insights and the executive summary report.

use crate::config::PipelineConfig;
use crate::kpi::{KpiCatalog, Measure};
use crate::schema::FactRow;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

const RAIN_OPPORTUNITY_MULTIPLIER: f64 = 1.5;
const SURGE_DRIVER_PERCENT: f64 = 30.0;
const SATISFACTION_TARGET: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BusinessInsights {
    pub revenue_insights: Vec<String>,
    pub operational_insights: Vec<String>,
    pub strategic_recommendations: Vec<String>,
    pub weather_strategy: Vec<String>,
    pub time_optimization: Vec<String>,
}

impl BusinessInsights {
    pub fn generate(kpis: &KpiCatalog, config: &PipelineConfig) -> Self {
        let mut insights = BusinessInsights::default();
        let revenue = &kpis.revenue;

        insights.revenue_insights.push(format!(
            "Total revenue: ₹{}",
            thousands(revenue.total_revenue)
        ));
        if let Measure::Value(share) = revenue.surge_contribution_percent {
            insights
                .revenue_insights
                .push(format!("Surge pricing contributes {share:.1}% of total revenue"));
        }
        let distribution: Vec<String> = kpis
            .strategic
            .revenue_diversification
            .iter()
            .map(|(vehicle, share)| format!("{vehicle} {share:.1}%"))
            .collect();
        insights.revenue_insights.push(format!(
            "Vehicle revenue distribution: {}",
            distribution.join(", ")
        ));

        let temporal = &kpis.temporal;
        insights.time_optimization.push(
            if temporal.evening_rush_demand > temporal.morning_rush_demand {
                "Evening rush (17:00-19:00) shows higher demand than morning rush"
            } else {
                "Morning rush (08:00-10:00) shows higher demand than evening rush"
            }
            .to_string(),
        );
        if let Measure::Value(premium) = temporal.rush_hour_premium {
            insights
                .time_optimization
                .push(format!("Rush hour premium: {premium:.1}% higher pricing"));
        }

        if let Measure::Value(multiplier) = kpis.weather.rain_vs_clear_multiplier
            && multiplier > RAIN_OPPORTUNITY_MULTIPLIER
        {
            insights.weather_strategy.push(format!(
                "Rain creates {multiplier:.1}x higher surge pricing opportunity"
            ));
        }

        if let Measure::Value(wait) = kpis.operational.avg_waiting_time {
            insights.operational_insights.push(if wait > config.wait_threshold_minutes {
                format!("Average waiting time ({wait:.1} min) needs improvement")
            } else {
                format!("Good service quality with {wait:.1} min average wait time")
            });
        }

        let poi = &kpis.geographic.poi_performance;
        if let Measure::Value(share) = poi.revenue_share_percent {
            insights.strategic_recommendations.push(format!(
                "{} routes contribute {share:.1}% of total revenue",
                poi.point_of_interest
            ));
        }
        if revenue
            .surge_contribution_percent
            .value()
            .is_some_and(|share| share > SURGE_DRIVER_PERCENT)
        {
            insights.strategic_recommendations.push(
                "Focus on surge pricing optimization, it is a major revenue driver".to_string(),
            );
        }
        if kpis
            .strategic
            .customer_satisfaction_proxy
            .value()
            .is_some_and(|score| score < SATISFACTION_TARGET)
        {
            insights.strategic_recommendations.push(
                "Customer satisfaction needs attention: optimize wait times and pricing"
                    .to_string(),
            );
        }

        insights
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub total_rides: usize,
    pub total_revenue: f64,
    pub avg_revenue_per_ride: Measure,
    pub data_period: Option<DataPeriod>,
    pub surge_contribution_percent: Measure,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ExecutiveSummary {
    pub fn new(fact: &[FactRow], kpis: &KpiCatalog) -> Self {
        let start = fact.iter().map(|r| r.date).min();
        let end = fact.iter().map(|r| r.date).max();

        ExecutiveSummary {
            total_rides: fact.len(),
            total_revenue: kpis.revenue.total_revenue,
            avg_revenue_per_ride: kpis.revenue.avg_revenue_per_ride,
            data_period: start.zip(end).map(|(start, end)| DataPeriod { start, end }),
            surge_contribution_percent: kpis.revenue.surge_contribution_percent,
        }
    }
}

/// Executive summary, the full KPI catalog and the derived insights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport<'a> {
    pub executive_summary: ExecutiveSummary,
    pub key_performance_indicators: &'a KpiCatalog,
    pub business_insights: BusinessInsights,
}

impl<'a> SummaryReport<'a> {
    pub fn new(fact: &[FactRow], kpis: &'a KpiCatalog, config: &PipelineConfig) -> Self {
        SummaryReport {
            executive_summary: ExecutiveSummary::new(fact, kpis),
            key_performance_indicators: kpis,
            business_insights: BusinessInsights::generate(kpis, config),
        }
    }

    /// Renders the summary and insights as a Markdown document.
    pub fn to_markdown(&self) -> String {
        let summary = &self.executive_summary;
        let mut md = String::from("# Ride Analytics Summary\n\n## Executive Summary\n\n");

        let _ = writeln!(md, "| Metric | Value |");
        let _ = writeln!(md, "|--------|-------|");
        let _ = writeln!(md, "| Total rides | {} |", summary.total_rides);
        let _ = writeln!(md, "| Total revenue | ₹{} |", thousands(summary.total_revenue));
        let _ = writeln!(md, "| Avg revenue per ride | {} |", summary.avg_revenue_per_ride);
        if let Some(period) = summary.data_period {
            let _ = writeln!(md, "| Data period | {} to {} |", period.start, period.end);
        }
        let _ = writeln!(md, "| Surge contribution | {}% |", summary.surge_contribution_percent);

        let insights = &self.business_insights;
        let sections = [
            ("Revenue", &insights.revenue_insights),
            ("Time Optimization", &insights.time_optimization),
            ("Weather Strategy", &insights.weather_strategy),
            ("Operations", &insights.operational_insights),
            ("Strategic Recommendations", &insights.strategic_recommendations),
        ];
        for (title, lines) in sections {
            if lines.is_empty() {
                continue;
            }
            let _ = write!(md, "\n## {title}\n\n");
            for line in lines {
                let _ = writeln!(md, "- {line}");
            }
        }

        md
    }
}

/// Two-decimal amount with comma thousands separators.
fn thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::test_support::*;

    fn report_inputs() -> (Vec<FactRow>, KpiCatalog) {
        let fact = three_rides();
        let kpis = KpiCatalog::compute(&fact, &PipelineConfig::default());
        (fact, kpis)
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(310.0), "310.00");
        assert_eq!(thousands(1234567.891), "1,234,567.89");
        assert_eq!(thousands(-1000.0), "-1,000.00");
    }

    #[test]
    fn test_insights_for_three_rides() {
        let (_, kpis) = report_inputs();
        let insights = BusinessInsights::generate(&kpis, &PipelineConfig::default());

        assert_eq!(insights.revenue_insights[0], "Total revenue: ₹310.00");
        assert_eq!(
            insights.revenue_insights[1],
            "Surge pricing contributes 19.4% of total revenue"
        );
        assert_eq!(
            insights.revenue_insights[2],
            "Vehicle revenue distribution: bike 100.0%"
        );
        assert!(insights.weather_strategy.is_empty());
        assert!(insights.operational_insights[0].starts_with("Good service quality"));
        assert!(insights.strategic_recommendations[0].starts_with("VIT routes contribute 100.0%"));
    }

    #[test]
    fn test_executive_summary() {
        let (fact, kpis) = report_inputs();
        let summary = ExecutiveSummary::new(&fact, &kpis);

        assert_eq!(summary.total_rides, 3);
        assert_eq!(summary.total_revenue, 310.0);
        let period = summary.data_period.unwrap();
        assert_eq!(period.start, period.end);
    }

    #[test]
    fn test_markdown_lists_sections() {
        let (fact, kpis) = report_inputs();
        let md = SummaryReport::new(&fact, &kpis, &PipelineConfig::default()).to_markdown();

        assert!(md.starts_with("# Ride Analytics Summary"));
        assert!(md.contains("| Total rides | 3 |"));
        assert!(md.contains("## Revenue"));
        assert!(!md.contains("## Weather Strategy"));
    }

    #[test]
    fn test_report_embeds_flat_kpis() {
        let (fact, kpis) = report_inputs();
        let report = SummaryReport::new(&fact, &kpis, &PipelineConfig::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["key_performance_indicators"]["total_revenue"], 310.0);
        assert_eq!(json["executive_summary"]["data_period"]["start"], "2024-03-11");
    }
}
