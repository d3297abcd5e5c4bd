use crate::domain::model::{AuditedSeries, FareClass, YearMonth};
use plotly::common::{Line, Marker, MarkerSymbol, Mode, Title};
use plotly::layout::{Axis, GridPattern, HoverMode, LayoutGrid, RowOrder};
use plotly::{Layout, Plot, Scatter};
use serde::Serialize;

pub const DEFAULT_CHART_TITLE: &str =
    "Australian Domestic Aviation: Fare Index Trend & Revenue Leakage Audit";

const CHART_HEIGHT: usize = 900;
const MARKER_COLOR: &str = "red";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub month: YearMonth,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub hover_label: String,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMarker {
    pub month: YearMonth,
    pub value: f64,
    pub label: String,
    pub high_priority: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPane {
    pub title: String,
    pub y_axis_title: String,
    pub series: Vec<ChartSeries>,
    pub markers: Vec<ChartMarker>,
}

/// Renderer-neutral chart description: two panes sharing the month axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub x_axis_title: String,
    pub panes: Vec<ChartPane>,
}

fn color_for(class: FareClass) -> &'static str {
    match class {
        FareClass::BusinessClass => "#4169e1",
        FareClass::RestrictedEconomy => "#ff7f50",
        FareClass::BestDiscount => "#228b22",
    }
}

fn series_for(audited: &AuditedSeries, class: FareClass) -> ChartSeries {
    ChartSeries {
        name: class.label().to_string(),
        hover_label: class.short_label().to_string(),
        color: color_for(class).to_string(),
        points: audited
            .records
            .iter()
            .map(|r| ChartPoint {
                month: r.record.month,
                value: r.record.value(class),
                note: r.annotation.historical_note.clone(),
            })
            .collect(),
    }
}

impl ChartData {
    pub fn from_audit(audited: &AuditedSeries, title: &str) -> Self {
        let markers = audited
            .leakage_events()
            .filter_map(|r| {
                r.record.restricted_economy.map(|value| ChartMarker {
                    month: r.record.month,
                    value,
                    label: crate::render::report::finding_label(r).to_string(),
                    high_priority: r.annotation.is_high_priority,
                    note: r.annotation.historical_note.clone(),
                })
            })
            .collect();

        let top = ChartPane {
            title: "Corporate Yield Audit".to_string(),
            y_axis_title: "Fare Index (Real)".to_string(),
            series: vec![
                series_for(audited, FareClass::BusinessClass),
                series_for(audited, FareClass::RestrictedEconomy),
            ],
            markers,
        };

        let mut bottom_series = vec![series_for(audited, FareClass::RestrictedEconomy)];
        if audited.located.contains(&FareClass::BestDiscount) {
            bottom_series.push(series_for(audited, FareClass::BestDiscount));
        }
        let bottom = ChartPane {
            title: "Market Competition Audit".to_string(),
            y_axis_title: "Fare Index (Real)".to_string(),
            series: bottom_series,
            markers: Vec::new(),
        };

        Self {
            title: title.to_string(),
            x_axis_title: "Audit Timeline".to_string(),
            panes: vec![top, bottom],
        }
    }
}

/// Plotly renders titles, names and hover text as markup.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn hover_notes(notes: impl Iterator<Item = Option<String>>) -> Vec<String> {
    notes
        .map(|n| n.map(|n| format!("<br>Note: {}", escape_html(&n))).unwrap_or_default())
        .collect()
}

fn series_trace(series: &ChartSeries, y_axis: &str) -> Box<Scatter<String, Option<f64>>> {
    let months = series.points.iter().map(|p| p.month.to_string()).collect();
    let values = series.points.iter().map(|p| p.value).collect();
    let notes = hover_notes(series.points.iter().map(|p| p.note.clone()));

    Scatter::new(months, values)
        .name(&escape_html(&series.name))
        .mode(Mode::Lines)
        .y_axis(y_axis)
        .connect_gaps(false)
        .line(Line::new().color(series.color.clone()).width(2.0))
        .hover_text_array(notes)
        .hover_template(&format!(
            "{}: %{{y:.2f}}%{{hovertext}}<extra></extra>",
            escape_html(&series.hover_label)
        ))
}

fn marker_trace(markers: &[ChartMarker], y_axis: &str) -> Box<Scatter<String, f64>> {
    let months = markers.iter().map(|m| m.month.to_string()).collect();
    let values = markers.iter().map(|m| m.value).collect();
    let labels = markers
        .iter()
        .zip(hover_notes(markers.iter().map(|m| m.note.clone())))
        .map(|(m, note)| format!("{}{}", m.label, note))
        .collect();

    Scatter::new(months, values)
        .name("REVENUE_LEAKAGE")
        .mode(Mode::Markers)
        .y_axis(y_axis)
        .marker(
            Marker::new()
                .symbol(MarkerSymbol::X)
                .size(12)
                .color(MARKER_COLOR),
        )
        .hover_text_array(labels)
        .hover_template("%{hovertext}<extra></extra>")
}

fn pane_axis(pane: &ChartPane) -> Axis {
    Axis::new().title(Title::with_text(&format!(
        "<b>{}</b><br>{}",
        escape_html(&pane.title),
        escape_html(&pane.y_axis_title)
    )))
}

/// Builds the plotly figure: one row per pane, all rows on one month axis.
pub fn build_plot(chart: &ChartData) -> Plot {
    let mut plot = Plot::new();
    let mut layout = Layout::new()
        .title(Title::with_text(&escape_html(&chart.title)))
        .height(CHART_HEIGHT)
        .hover_mode(HoverMode::XUnified)
        .grid(
            LayoutGrid::new()
                .rows(chart.panes.len().max(1))
                .columns(1)
                .pattern(GridPattern::Coupled)
                .row_order(RowOrder::TopToBottom),
        )
        .x_axis(Axis::new().title(Title::with_text(&escape_html(&chart.x_axis_title))));

    for (idx, pane) in chart.panes.iter().enumerate() {
        let y_axis = if idx == 0 {
            "y".to_string()
        } else {
            format!("y{}", idx + 1)
        };
        for series in &pane.series {
            plot.add_trace(series_trace(series, &y_axis));
        }
        if !pane.markers.is_empty() {
            plot.add_trace(marker_trace(&pane.markers, &y_axis));
        }
        layout = match idx {
            0 => layout.y_axis(pane_axis(pane)),
            _ => layout.y_axis2(pane_axis(pane)),
        };
    }

    plot.set_layout(layout);
    // plotly 0.12 with `plotly_embed_js` inlines plotly.js by default (former `use_local_plotly()`).
    plot
}

/// Self-contained HTML page with plotly.js inlined.
pub fn render_html(chart: &ChartData) -> String {
    build_plot(chart).to_html()
}
