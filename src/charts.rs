use crate::errors::ChartError;
use crate::format::format_short_date;
use crate::models::{Emotion, EmotionCounts, EmotionCountsOverTime};
use serde::Serialize;

pub const LINE_THICKNESS: u32 = 6;
pub const END_FILL_COLOR: &str = "#ffffff";

pub fn emotion_color(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy => "#7CFB79",
        Emotion::Neutral => "#FBE76F",
        Emotion::Sad => "#8FDEFF",
        Emotion::Angry => "#F45569",
        Emotion::Surprised => "#EE9AFC",
        Emotion::Scared => "#FF8F8F",
        Emotion::Disgusted => "#549B75",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarItem {
    pub value: u32,
    pub front_color: &'static str,
    pub label: Emotion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetItem {
    pub data: Vec<LinePoint>,
    pub start_fill_color: &'static str,
    pub color: &'static str,
    pub thickness: u32,
    pub data_point_color: &'static str,
    pub end_fill_color: &'static str,
    pub key: Emotion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChartData {
    pub data_set: Vec<DataSetItem>,
    pub x_axis_labels: Vec<String>,
    pub max_value: u32,
    pub no_of_sections: u32,
    pub step_value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisScale {
    pub max_value: u32,
    pub no_of_sections: u32,
    pub step_value: u32,
}

/// One bar per emotion, in the order the counts arrived.
pub fn build_bars(counts: &EmotionCounts) -> Vec<BarItem> {
    counts
        .iter()
        .map(|(emotion, count)| BarItem {
            value: *count,
            front_color: emotion_color(*emotion),
            label: *emotion,
        })
        .collect()
}

pub fn build_line_chart_data(data: &EmotionCountsOverTime) -> Result<LineChartData, ChartError> {
    let Some(first_series) = data.values().next() else {
        return Err(ChartError::NoData);
    };

    let data_set = data
        .iter()
        .map(|(emotion, series)| {
            let color = emotion_color(*emotion);
            DataSetItem {
                data: series
                    .iter()
                    .map(|point| LinePoint { value: point.count })
                    .collect(),
                start_fill_color: color,
                color,
                thickness: LINE_THICKNESS,
                data_point_color: color,
                end_fill_color: END_FILL_COLOR,
                key: *emotion,
            }
        })
        .collect();

    // Every series shares the first one's dates.
    let x_axis_labels = first_series
        .iter()
        .map(|point| format_short_date(point.date))
        .collect();

    let highest = data
        .values()
        .flatten()
        .map(|point| point.count)
        .max()
        .unwrap_or(0);
    let scale = axis_scale(highest);

    Ok(LineChartData {
        data_set,
        x_axis_labels,
        max_value: scale.max_value,
        no_of_sections: scale.no_of_sections,
        step_value: scale.step_value,
    })
}

/// Y-axis bounds for a chart whose tallest point is `highest`.
pub fn axis_scale(highest: u32) -> AxisScale {
    let max_value = if highest < 4 { 4 } else { highest.saturating_add(1) };
    let no_of_sections = match max_value {
        0..=10 => max_value,
        11..=20 => 10,
        21..=40 => 12,
        41..=50 => 14,
        _ => max_value / 4,
    };
    AxisScale {
        max_value,
        no_of_sections,
        step_value: max_value / no_of_sections,
    }
}
