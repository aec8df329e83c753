use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn defaults_point_at_hosted_service_without_timeout() {
    let settings = ClientSettings::default();
    assert_eq!(settings.service_url.as_str(), format!("{DEFAULT_SERVICE_URL}/"));
    assert!(settings.request_timeout.is_none());
    assert_eq!(settings.event_capacity, 256);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = ClientSettings::default();
    apply_file_overrides(
        &mut settings,
        r#"
service_url = "http://127.0.0.1:8000"
request_timeout_secs = 30
event_capacity = 16
"#,
    )
    .expect("apply file");

    assert_eq!(settings.service_url.as_str(), "http://127.0.0.1:8000/");
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(30)));
    assert_eq!(settings.event_capacity, 16);
}

#[test]
fn zero_timeout_in_file_means_wait_forever() {
    let mut settings = ClientSettings::default();
    settings.request_timeout = Some(Duration::from_secs(5));
    apply_file_overrides(&mut settings, "request_timeout_secs = 0").expect("apply file");
    assert!(settings.request_timeout.is_none());
}

#[test]
fn file_with_wrong_value_types_is_rejected() {
    let mut settings = ClientSettings::default();
    let err = apply_file_overrides(&mut settings, "service_url = 42").expect_err("must fail");
    assert!(err.to_string().contains("service_url"), "unexpected error: {err}");

    let err =
        apply_file_overrides(&mut settings, "event_capacity = 0").expect_err("must fail");
    assert!(err.to_string().contains("event_capacity"), "unexpected error: {err}");
}

#[test]
fn app_prefixed_env_wins_over_short_name() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("QA_SERVICE_URL", "http://short.example"),
            ("APP__SERVICE_URL", "http://app.example/base"),
            ("APP__REQUEST_TIMEOUT_SECS", "12"),
        ]),
    )
    .expect("apply env");

    assert_eq!(settings.service_url.as_str(), "http://app.example/base");
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(12)));
}

#[test]
fn unparseable_timeout_env_is_ignored() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, env_from(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]))
        .expect("apply env");
    assert!(settings.request_timeout.is_none());
}

#[test]
fn rejects_invalid_service_urls() {
    assert!(parse_service_url("").is_err());
    assert!(parse_service_url("not a url").is_err());
    assert!(parse_service_url("ftp://files.example").is_err());
    assert!(parse_service_url("  http://localhost:8000/  ").is_ok());
}
