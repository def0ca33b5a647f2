use food_order_stats::{
    AnalysisEngine, AnalysisError, AnalysisPipeline, CliConfig, LocalStorage, OrderSource,
};
use httpmock::prelude::*;
use tempfile::TempDir;

const ORDERS_CSV: &str = "\
order_id,user_id,city,restaurant,cuisine,order_amount,delivery_time_mins
1,U1,Mumbai,Spice Hub,Indian,600,30
2,U1,Mumbai,Spice Hub,Indian,500,20
3,U2,Delhi,Dragon Wok,Chinese,1000,45
4,U3,Pune,Pasta Point,Italian,250.5,25
5,U3,Pune,Curry House,Indian,99.5,35
";

fn cli_config(input: String, output_path: String, formats: &[&str]) -> CliConfig {
    CliConfig {
        input,
        output_path,
        formats: formats.iter().map(|f| f.to_string()).collect(),
        delimiter: ",".to_string(),
        top_restaurants: 3,
        high_value_threshold: 1000.0,
        archive: None,
        verbose: false,
        json_logs: false,
        monitor: false,
    }
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let data = std::fs::read(path).unwrap();
    serde_json::from_slice(&data).unwrap()
}

#[tokio::test]
async fn test_end_to_end_from_csv_file() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("food_orders.csv");
    std::fs::write(&input_path, ORDERS_CSV).unwrap();
    let output_path = temp_dir.path().join("out");

    let config = cli_config(
        input_path.to_str().unwrap().to_string(),
        output_path.to_str().unwrap().to_string(),
        &["json", "csv", "html"],
    );
    let source = OrderSource::from_config(&config);
    let storage = LocalStorage::new(output_path.clone());
    let engine = AnalysisEngine::new(AnalysisPipeline::new(source, storage, config));

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.record_count, 5);
    assert!(output_path.join("report.html").exists());
    assert!(output_path.join("cuisine_popularity.csv").exists());

    let json = read_json(&output_path.join("analysis.json"));
    assert_eq!(json["record_count"], 5);
    let tables = &json["tables"];

    assert_eq!(
        tables["orders_per_city"],
        serde_json::json!([
            {"city": "Delhi", "total_orders": 1},
            {"city": "Mumbai", "total_orders": 2},
            {"city": "Pune", "total_orders": 2}
        ])
    );
    assert_eq!(tables["avg_amount_city"][1]["avg_order_amount"], 550.0);
    assert_eq!(tables["avg_delivery_city"][2]["avg_delivery_time"], 30.0);
    assert_eq!(
        tables["cuisine_popularity"],
        serde_json::json!([
            {"cuisine": "Indian", "order_count": 3},
            {"cuisine": "Chinese", "order_count": 1},
            {"cuisine": "Italian", "order_count": 1}
        ])
    );
    assert_eq!(
        tables["top_restaurants"],
        serde_json::json!([
            {"restaurant": "Spice Hub", "total_revenue": 1100.0},
            {"restaurant": "Dragon Wok", "total_revenue": 1000.0},
            {"restaurant": "Pasta Point", "total_revenue": 250.5}
        ])
    );
    // U2 spent exactly 1000 and is left out
    assert_eq!(
        tables["high_value_customers"],
        serde_json::json!([{"user_id": "U1", "total_spent": 1100.0}])
    );
    assert_eq!(tables["raw_data"].as_array().unwrap().len(), 5);
    assert_eq!(tables["raw_data"][3]["order_amount"], 250.5);

    let csv = std::fs::read_to_string(output_path.join("top_restaurants.csv")).unwrap();
    assert_eq!(
        csv,
        "restaurant,total_revenue\nSpice Hub,1100\nDragon Wok,1000\nPasta Point,250.5\n"
    );

    let raw_csv = std::fs::read_to_string(output_path.join("raw_data.csv")).unwrap();
    assert!(raw_csv.starts_with(
        "order_id,user_id,city,restaurant,cuisine,order_amount,delivery_time_mins\n"
    ));
}

#[tokio::test]
async fn test_end_to_end_from_http_source_with_archive() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/exports/orders.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(ORDERS_CSV);
    });

    let mut config = cli_config(server.url("/exports/orders.csv"), output_path.clone(), &["csv"]);
    config.archive = Some("food_analysis.zip".to_string());

    let source = OrderSource::from_config(&config);
    let storage = LocalStorage::new(output_path.clone());
    let engine =
        AnalysisEngine::new_with_monitoring(AnalysisPipeline::new(source, storage, config), true);

    let summary = engine.run().await.unwrap();

    api_mock.assert();
    assert!(summary.output.ends_with("food_analysis.zip"));
    assert_eq!(summary.phases.len(), 3);

    let zip_data = std::fs::read(temp_dir.path().join("food_analysis.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 7);

    let mut content = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("high_value_customers.csv").unwrap(),
        &mut content,
    )
    .unwrap();
    assert_eq!(content, "user_id,total_spent\nU1,1100\n");
}

#[tokio::test]
async fn test_http_source_failure_surfaces_status() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/down.csv");
        then.status(503);
    });

    let config = cli_config(server.url("/down.csv"), output_path.clone(), &["json"]);
    let source = OrderSource::from_config(&config);
    let storage = LocalStorage::new(output_path.clone());
    let engine = AnalysisEngine::new(AnalysisPipeline::new(source, storage, config));

    let err = engine.run().await.unwrap_err();

    api_mock.assert();
    assert!(matches!(err, AnalysisError::SourceStatusError { status: 503, .. }));
    assert!(!temp_dir.path().join("analysis.json").exists());
}

#[tokio::test]
async fn test_malformed_row_fails_whole_run() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("bad_orders.csv");
    std::fs::write(
        &input_path,
        "order_id,user_id,city,restaurant,cuisine,order_amount,delivery_time_mins\n\
1,U1,Mumbai,Spice Hub,Indian,600,30\n\
2,U2,Delhi,Dragon Wok,Chinese,free,45\n",
    )
    .unwrap();
    let output_path = temp_dir.path().join("out");

    let config = cli_config(
        input_path.to_str().unwrap().to_string(),
        output_path.to_str().unwrap().to_string(),
        &["json"],
    );
    let source = OrderSource::from_config(&config);
    let storage = LocalStorage::new(output_path.clone());
    let engine = AnalysisEngine::new(AnalysisPipeline::new(source, storage, config));

    let err = engine.run().await.unwrap_err();

    match err {
        AnalysisError::MalformedRecord {
            position,
            order_id,
            field,
            ..
        } => {
            assert_eq!(position, 1);
            assert_eq!(order_id.as_deref(), Some("2"));
            assert_eq!(field, "order_amount");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_header_only_input_gives_empty_tables() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("empty.csv");
    std::fs::write(
        &input_path,
        "order_id,user_id,city,restaurant,cuisine,order_amount,delivery_time_mins\n",
    )
    .unwrap();
    let output_path = temp_dir.path().join("out");

    let config = cli_config(
        input_path.to_str().unwrap().to_string(),
        output_path.to_str().unwrap().to_string(),
        &["json"],
    );
    let source = OrderSource::from_config(&config);
    let storage = LocalStorage::new(output_path.clone());
    let engine = AnalysisEngine::new(AnalysisPipeline::new(source, storage, config));

    let summary = engine.run().await.unwrap();
    assert_eq!(summary.record_count, 0);

    let json = read_json(&output_path.join("analysis.json"));
    for (_, table) in json["tables"].as_object().unwrap() {
        assert_eq!(table, &serde_json::json!([]));
    }
}
