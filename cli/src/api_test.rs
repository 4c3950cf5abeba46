use super::*;

#[test]
fn endpoint_joins_without_double_slash() {
    assert_eq!(endpoint("http://127.0.0.1:3000/", "/api/expenses/all"), "http://127.0.0.1:3000/api/expenses/all");
    assert_eq!(endpoint("http://127.0.0.1:3000", "/healthz"), "http://127.0.0.1:3000/healthz");
}

#[test]
fn month_path_passes_zero_based_month() {
    assert_eq!(month_path("/api/expenses/month", 2026, 0), "/api/expenses/month?year=2026&month=0");
}

#[test]
fn new_requires_session_token() {
    let result = ApiClient::new("http://127.0.0.1:3000", None);
    assert!(matches!(result, Err(CliError::MissingSessionToken)));
}

#[test]
fn new_rejects_token_with_control_characters() {
    let result = ApiClient::new("http://127.0.0.1:3000", Some("bad\ntoken"));
    assert!(matches!(result, Err(CliError::InvalidHeader(_))));
}

#[test]
fn new_trims_trailing_slash_from_base_url() {
    let client = ApiClient::new("http://127.0.0.1:3000/", Some("abc")).unwrap();
    assert_eq!(client.url("/api/expenses/today"), "http://127.0.0.1:3000/api/expenses/today");
}
