use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::error;

use super::{PageContext, PageController};
use crate::{assets::fetch_json, error::ShellError, models::StatisticsData};

pub const STATISTICS_RESOURCE: &str = "data/statistics.json";
pub const VISITOR_CHART: &str = "visitorChart";
pub const ENGAGEMENT_CHART: &str = "engagementChart";
pub const STATISTICS_FAILED: &str = "Unable to load statistics at this time.";

const ENGAGEMENT_LABELS: [&str; 3] = ["Events", "Opportunities", "News"];

/// Line chart of monthly visitors.
pub fn visitor_chart(data: &StatisticsData) -> Value {
    json!({
        "type": "line",
        "data": {
            "labels": data.months,
            "datasets": [{
                "label": "Monthly Visitors",
                "data": data.visitors,
                "borderColor": "rgba(75, 192, 192, 1)",
                "fill": false,
            }],
        },
        "options": { "responsive": true },
    })
}

/// Doughnut chart of the engagement split.
pub fn engagement_chart(data: &StatisticsData) -> Value {
    json!({
        "type": "doughnut",
        "data": {
            "labels": ENGAGEMENT_LABELS,
            "datasets": [{
                "data": data.engagement,
                "backgroundColor": ["#FF6384", "#36A2EB", "#FFCE56"],
            }],
        },
        "options": { "responsive": true },
    })
}

/// StatisticsPage
///
/// Protected. Emits chart configurations for the page script to hand to its chart
/// library.
#[derive(Debug, Default)]
pub struct StatisticsPage;

#[async_trait]
impl PageController for StatisticsPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        match fetch_json::<StatisticsData>(ctx.assets.as_ref(), STATISTICS_RESOURCE).await {
            Ok(data) => {
                ctx.host
                    .set_region_markup(VISITOR_CHART, &visitor_chart(&data).to_string())?;
                ctx.host
                    .set_region_markup(ENGAGEMENT_CHART, &engagement_chart(&data).to_string())
            }
            Err(e) => {
                error!(error = %e, "error loading statistics");
                let placeholder = format!("<p>{STATISTICS_FAILED}</p>");
                ctx.host.set_region_markup(VISITOR_CHART, &placeholder)?;
                ctx.host.set_region_markup(ENGAGEMENT_CHART, &placeholder)
            }
        }
    }
}
