//! Concurrent scenarios sharing one connection pool.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde_json::json;

use relay_sample::scenario::{ScenarioOptions, ScenarioRunner};
use relay_sample::GatewayClient;

mod common;
use common::{fast_policy, gateway_config, start_mock_server, Reply};

struct Published {
    message: String,
    key: String,
    reads: u32,
}

#[tokio::test]
async fn test_concurrent_scenarios_keep_their_own_keys() {
    let next_id = Arc::new(AtomicU32::new(0));
    let store: Arc<Mutex<HashMap<String, Published>>> = Arc::new(Mutex::new(HashMap::new()));

    let server = start_mock_server(move |req| {
        let key = req.header("Subscription-Key").unwrap_or_default().to_string();

        if req.is("POST", "/aisquick-sample/messages") {
            let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
            let id = format!("msg-{}", next_id.fetch_add(1, Ordering::SeqCst));
            store.lock().unwrap().insert(
                id.clone(),
                Published {
                    message: body["message"].as_str().unwrap_or_default().to_string(),
                    key,
                    reads: 0,
                },
            );
            return Reply::json(200, json!({ "id": id }).to_string());
        }

        let Some(id) = req.path.strip_prefix("/aisquick-sample/table-entities/") else {
            return Reply::status(400);
        };
        let mut store = store.lock().unwrap();
        let Some(published) = store.get_mut(id) else {
            return Reply::status(404);
        };
        if published.key != key {
            return Reply::status(401);
        }
        published.reads += 1;
        if published.reads == 1 {
            return Reply::status(404);
        }
        Reply::json(
            200,
            json!({
                "partitionKey": "aisquick-sample",
                "rowKey": id,
                "message": published.message,
                "via": "Service Bus",
            })
            .to_string(),
        )
    })
    .await;

    let concurrency = 20;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let options = ScenarioOptions {
        include_function_app: true,
        include_logic_app: false,
        expected_via: "Service Bus".to_string(),
        policy: fast_policy(),
    };

    let start = Instant::now();
    let runs = (0..concurrency).map(|i| {
        let gateway = GatewayClient::with_http_client(
            http.clone(),
            &gateway_config(&server.url()),
            &format!("key-{i}"),
        )
        .unwrap();
        let runner = ScenarioRunner::new(gateway, options.clone());
        async move { runner.run(&format!("Hello, world! #{i}")).await }
    });
    let results = join_all(runs).await;
    let duration = start.elapsed();

    let passed = results.iter().filter(|r| r.is_ok()).count();
    for result in &results {
        if let Err(e) = result {
            eprintln!("scenario failed: {e}");
        }
    }

    println!("\n--- Load Test Results ---");
    println!("Scenarios:      {concurrency}");
    println!("Passed:         {passed}");
    println!("Total Duration: {duration:?}");
    println!("Requests:       {}", server.requests().len());
    println!("-------------------------\n");

    assert_eq!(passed, concurrency);
    assert_eq!(server.count("POST", "/aisquick-sample/messages"), concurrency);
    // One pending read and one successful read per scenario.
    assert_eq!(server.requests().len(), concurrency * 3);
}
