//! HTTP bridge wire tests against a local mock server

use logforge::bridge::{BackendBridge, HttpBridge};
use logforge::models::{BackendSettings, JobRequest, JobStatus, LlmSettings};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_bool_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/IsConfigured")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("true")
        .create_async()
        .await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    assert!(bridge.is_configured().await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let server = mockito::Server::new_async().await;
    let bridge = HttpBridge::new(format!("{}/", server.url())).unwrap();
    assert_eq!(bridge.base_url(), server.url());
}

#[tokio::test]
async fn test_error_body_becomes_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/TestRemoteConnection")
        .with_status(502)
        .with_body("model endpoint unreachable\n")
        .create_async()
        .await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    let err = bridge.test_remote_connection().await.unwrap_err();
    assert_eq!(err.message(), "model endpoint unreachable");
}

#[tokio::test]
async fn test_empty_error_body_names_method_and_status() {
    let mut server = mockito::Server::new_async().await;
    server.mock("POST", "/api/GetSettings").with_status(500).create_async().await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    let err = bridge.get_settings().await.unwrap_err();
    assert!(err.message().starts_with("GetSettings failed with status 500"));
}

#[tokio::test]
async fn test_empty_success_body_is_unit() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/SetShowWizard")
        .match_body(Matcher::Json(json!({ "show": false })))
        .with_status(200)
        .create_async()
        .await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    bridge.set_show_wizard(false).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_null_target_list_is_empty() {
    let mut server = mockito::Server::new_async().await;
    server.mock("POST", "/api/ListJobTargets").with_status(200).with_body("null").create_async().await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    assert!(bridge.list_job_targets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_job_sends_request_fields() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/SubmitJob")
        .match_body(Matcher::Json(json!({
            "target_id": "t1",
            "input_dir": "/in",
            "output_dir": "/out"
        })))
        .with_status(200)
        .create_async()
        .await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    let request = JobRequest {
        target_id: "t1".to_string(),
        input_dir: "/in".to_string(),
        output_dir: "/out".to_string(),
        output_name: None,
    };
    bridge.submit_job(request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_job_progress_wire_format() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/GetJobProgress")
        .with_status(200)
        .with_body(
            r#"{"status":"completed","current_file":"","progress":1.0,
                "total_files":10,"processed":10,"failed":1,"message":"done"}"#,
        )
        .create_async()
        .await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    let progress = bridge.get_job_progress().await.unwrap();
    assert_eq!(progress.status, JobStatus::Completed);
    assert_eq!(progress.current_item, None);
    assert_eq!(progress.percent(), 100);
    assert_eq!(progress.succeeded_items(), 9);
}

#[tokio::test]
async fn test_malformed_success_body_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server.mock("POST", "/api/GetEnvironmentReady").with_status(200).with_body("{ready:").create_async().await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    let err = bridge.get_environment_ready().await.unwrap_err();
    assert!(err.message().starts_with("Malformed backend response"));
}

#[tokio::test]
async fn test_save_settings_wraps_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/SaveSettings")
        .match_body(Matcher::PartialJson(json!({
            "settings": { "llm": { "model_name": "deepseek-chat" }, "default_input_dir": "/logs" }
        })))
        .with_status(200)
        .create_async()
        .await;

    let bridge = HttpBridge::new(server.url()).unwrap();
    let settings = BackendSettings {
        llm: LlmSettings {
            base_url: "https://api.deepseek.com/v1".to_string(),
            api_key: "sk".to_string(),
            model_name: "deepseek-chat".to_string(),
        },
        default_input_dir: "/logs".to_string(),
        ..BackendSettings::default()
    };
    bridge.save_settings(settings).await.unwrap();
    mock.assert_async().await;
}
