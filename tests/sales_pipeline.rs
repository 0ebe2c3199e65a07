use agata_retail_lib::analytics::{aggregate, top_n, BucketKind, Rank, ReduceKind};
use agata_retail_lib::config::{AppConfig, CleanupConfig, DelimiterSetting, EncodingSetting};
use agata_retail_lib::data::derive::{derive, Metric};
use agata_retail_lib::data::loader::{load, LoadOptions, SourceSchema};
use agata_retail_lib::data::models::{Category, DatasetKind, Measure};
use agata_retail_lib::error::Result;
use agata_retail_lib::report::{dispatch, ChartKind, ChartRenderer, ChartRequest, JsonRenderer};
use agata_retail_lib::services::{CleanupService, DaySellService, PredictionService, ProductSalesService};
use agata_retail_lib::state::Session;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn latin1() -> LoadOptions {
    LoadOptions {
        delimiter: DelimiterSetting::Auto,
        encoding: EncodingSetting::Latin1,
        has_header: true,
    }
}

#[derive(Default)]
struct CountingRenderer {
    calls: usize,
    last: Option<ChartRequest>,
}

impl ChartRenderer for CountingRenderer {
    fn render(&mut self, request: &ChartRequest) -> Result<()> {
        self.calls += 1;
        self.last = Some(request.clone());
        Ok(())
    }
}

#[test]
fn day_sell_export_drops_totals_row() {
    let frame = load(
        &fixture("day_sell.csv"),
        &SourceSchema::day_sell(),
        LoadOptions::default(),
    )
    .unwrap();
    assert_eq!(frame.len(), 60);
    let gross = frame.column(Measure::GrossSale).unwrap();
    assert!(gross.iter().all(|v| *v < 10_000.0));
}

#[test]
fn monthly_sum_matches_row_total() {
    let frame = load(
        &fixture("day_sell.csv"),
        &SourceSchema::day_sell(),
        LoadOptions::default(),
    )
    .unwrap();
    let frame = derive(&frame, Metric::NetSales).unwrap();
    let result = aggregate(
        &frame,
        BucketKind::Month,
        ReduceKind::Sum,
        Measure::NetSales,
        Some(2018),
    )
    .unwrap();

    assert_eq!(result.keys(), vec!["2018-01", "2018-02", "2018-03"]);
    let net: f64 = frame.column(Measure::NetSales).unwrap().iter().sum();
    let bucketed: f64 = result.values().into_iter().flatten().sum();
    assert!((net - bucketed).abs() < 1e-6);
}

#[test]
fn semicolon_latin1_product_export_loads_directly() {
    let frame = load(&fixture("sell_raw.csv"), &SourceSchema::product_sales(), latin1()).unwrap();
    assert_eq!(frame.len(), 6);
    assert_eq!(
        frame.distinct(Category::ProductGroup).unwrap(),
        vec!["Beer".to_string(), "Café".to_string(), "Wine".to_string()]
    );
    assert_eq!(frame.column(Measure::NetSaleValue).unwrap()[0], 32.5);
}

#[test]
fn cleanup_then_load_matches_direct_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture("sell_raw.csv"), dir.path().join("SELL_1.csv")).unwrap();
    let config = CleanupConfig {
        data_dir: dir.path().to_path_buf(),
        backup: true,
    };

    let cleaned = CleanupService::update_file(&config, "SELL_1.csv").unwrap();
    assert!(dir.path().join("SELL_1.csv.bak").exists());

    let after = load(&cleaned, &SourceSchema::product_sales(), latin1()).unwrap();
    let direct = load(&fixture("sell_raw.csv"), &SourceSchema::product_sales(), latin1()).unwrap();
    assert_eq!(after, direct);
}

#[test]
fn ranked_groups_render_once_as_bar() {
    let frame = load(&fixture("sell_raw.csv"), &SourceSchema::product_sales(), latin1()).unwrap();
    let request = ProductSalesService::ranked_groups(&frame, 2, Rank::Best, Some(2018)).unwrap();

    let mut renderer = CountingRenderer::default();
    dispatch(&request, &mut renderer).unwrap();

    assert_eq!(renderer.calls, 1);
    let rendered = renderer.last.unwrap();
    assert_eq!(rendered.kind, ChartKind::Bar);
    // Beer 45, Wine 60.75, Café 12
    let groups: Vec<_> = rendered.points.iter().map(|p| p.x.clone()).collect();
    assert_eq!(groups, vec!["Beer", "Wine"]);
}

#[test]
fn top_n_best_and_worst_partition_groups() {
    let frame = load(&fixture("sell_raw.csv"), &SourceSchema::product_sales(), latin1()).unwrap();
    let totals = aggregate(
        &frame,
        BucketKind::Category(Category::ProductGroup),
        ReduceKind::Sum,
        Measure::NetSaleValue,
        None,
    )
    .unwrap();
    let best = top_n(&totals, 2, Rank::Best).unwrap();
    let worst = top_n(&totals, 1, Rank::Worst).unwrap();
    assert_eq!(worst.keys(), vec!["Café"]);
    assert!(best.keys().iter().all(|k| !worst.keys().contains(k)));
}

#[test]
fn json_charts_written_for_weekday_report() {
    let frame = load(
        &fixture("day_sell.csv"),
        &SourceSchema::day_sell(),
        LoadOptions::default(),
    )
    .unwrap();
    let request = DaySellService::weekday(
        &frame,
        Measure::GrossSale,
        ReduceKind::Mean,
        ChartKind::from("pie"),
        Some(2018),
    )
    .unwrap();
    assert_eq!(request.kind, ChartKind::Bar);

    let dir = tempfile::tempdir().unwrap();
    let mut renderer = JsonRenderer::new(dir.path());
    dispatch(&request, &mut renderer).unwrap();

    let written = fs::read_to_string(&renderer.written()[0]).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(doc["points"].as_array().unwrap().len(), 7);
    assert_eq!(doc["points"][0]["x"], "Monday");
}

#[test]
fn session_prediction_uses_fresh_frame() {
    let mut config = AppConfig::load(None).unwrap();
    config.day_sell.path = fixture("day_sell.csv");
    let session = Session::new(config);

    let frame = session.load_fresh(DatasetKind::DaySell).unwrap();
    let forecast =
        PredictionService::predict_tax(&frame, 600.0, 1000.0, &session.config().prediction).unwrap();
    assert!((forecast.tax - 80.0).abs() < 0.05);
    assert!(forecast.accuracy > 0.99);

    let again =
        PredictionService::predict_tax(&frame, 600.0, 1000.0, &session.config().prediction).unwrap();
    assert_eq!(forecast.tax.to_bits(), again.tax.to_bits());
}
