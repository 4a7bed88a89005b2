//! Verify request builders against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector names a builder, its inputs and the exact request it must
//! produce. URLs in the vectors are relative to the configured base URL.

use apibase_core::{ApiClient, ClientConfig, HttpMethod, HttpRequest};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|pair| {
                    let arr = pair.as_array().unwrap();
                    (
                        arr[0].as_str().unwrap().to_string(),
                        arr[1].as_str().unwrap().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let config = ClientConfig::new(
        vectors["config"]["host"].as_str().unwrap(),
        vectors["config"]["port"].as_u64().unwrap() as u16,
    );
    let base_url = config.base_url();
    let client = ApiClient::new(config);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let path = case["path"].as_str().unwrap();
        let payload = case["payload"].as_str().unwrap_or_default();
        let params = pairs(&case["params"]);

        let req: HttpRequest = match case["call"].as_str().unwrap() {
            "get" => client.build_get(path, params),
            "post" => client.build_post(path, params),
            "post_with_body" => client.build_post_with_body(path, payload),
            "put" => client.build_put(path, payload),
            "delete" => client.build_delete(path),
            other => panic!("{name}: unknown call {other}"),
        }
        .unwrap();

        let expected = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{base_url}{}", expected["url"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");
        assert_eq!(req.body.as_deref(), expected["body"].as_str(), "{name}: body");
    }
}
