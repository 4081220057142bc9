//! Plotly 트리맵 출력.
//!
//! 뷰 모델을 Plotly `treemap` trace로 직렬화하고 CDN 스크립트를 포함한 단일
//! HTML 파일로 저장합니다. `Decimal` 값은 여기서 `f64`로 바뀝니다.

use anyhow::{Context, Result};
use heatmap_core::{ChartConfig, TreemapViewModel};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::Path;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const HOVER_TEMPLATE: &str =
    "<b>%{label}</b><br>시가총액: %{value:.2f}조 원<br>등락률: %{customdata:.2f}%<extra></extra>";

fn to_f64(values: Vec<Decimal>) -> Vec<f64> {
    values
        .into_iter()
        .map(|v| v.to_f64().unwrap_or(0.0))
        .collect()
}

/// Plotly figure(JSON)를 만듭니다.
pub fn plotly_figure(view: &TreemapViewModel, chart: &ChartConfig) -> Value {
    let scale = &chart.color_scale;
    let colorscale: Vec<Value> = scale
        .stops()
        .iter()
        .map(|(pos, color)| json!([pos, color]))
        .collect();

    let trace = json!({
        "type": "treemap",
        "ids": view.ids(),
        "labels": view.labels(),
        "parents": view.parents(),
        "values": to_f64(view.values()),
        "branchvalues": "total",
        "maxdepth": chart.max_depth,
        "marker": {
            "colors": to_f64(view.colors()),
            "colorscale": colorscale,
            "cmin": scale.min.to_f64(),
            "cmid": scale.mid.to_f64(),
            "cmax": scale.max.to_f64(),
            "colorbar": { "title": { "text": "등락률(%)" } }
        },
        "customdata": to_f64(view.custom_data()),
        "texttemplate": view.text_templates(),
        "hovertemplate": HOVER_TEMPLATE,
        "textposition": "middle center"
    });

    json!({
        "data": [trace],
        "layout": {
            "title": { "text": view.title },
            "margin": { "t": 50, "l": 10, "r": 10, "b": 10 },
            "font": { "family": "Malgun Gothic, AppleSDGothicNeo, sans-serif", "size": 15 }
        }
    })
}

/// 단일 HTML 문서를 만듭니다.
pub fn render_html(view: &TreemapViewModel, chart: &ChartConfig) -> Result<String> {
    let figure = serde_json::to_string(&plotly_figure(view, chart))
        .context("트리맵 직렬화 실패")?;
    // 라벨에 "</script>"가 있어도 스크립트 블록이 닫히지 않도록
    let figure = figure.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
<style>html, body, #heatmap {{ width: 100%; height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="heatmap"></div>
<script>
const figure = {figure};
Plotly.newPlot("heatmap", figure.data, figure.layout, {{ responsive: true }});
</script>
</body>
</html>
"#,
        title = html_escape::encode_text(&view.title),
        cdn = PLOTLY_CDN,
        figure = figure,
    ))
}

/// 트리맵 HTML을 파일로 씁니다.
pub fn write_html(path: &Path, view: &TreemapViewModel, chart: &ChartConfig) -> Result<()> {
    let html = render_html(view, chart)?;
    std::fs::write(path, html).with_context(|| format!("HTML 저장 실패: {}", path.display()))?;
    Ok(())
}

/// 노드 목록을 JSON으로 씁니다.
pub fn write_nodes_json(path: &Path, view: &TreemapViewModel) -> Result<()> {
    let json = serde_json::to_string_pretty(view).context("노드 직렬화 실패")?;
    std::fs::write(path, json).with_context(|| format!("JSON 저장 실패: {}", path.display()))?;
    Ok(())
}
