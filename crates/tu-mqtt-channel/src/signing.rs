//! SigV4 presigned WebSocket URLs for AWS IoT Core.
//!
//! AWS IoT accepts MQTT over WebSockets authenticated by a SigV4 signature
//! in the query string of `GET /mqtt`. The session token is left out of the
//! signature and appended afterwards, as the IoT device gateway requires.

use std::time::{Duration, SystemTime};

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    SessionTokenMode, SignableBody, SignableRequest, SignatureLocation, SigningParams,
    SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use rumqttc::{MqttOptions, Transport};

use crate::config::MqttConfig;
use crate::error::{MqttError, MqttResult};
use tu_protocol::TemporaryCredentials;

/// SigV4 service name of the IoT device gateway.
pub const SIGNING_SERVICE: &str = "iotdevicegateway";

const MQTT_PATH: &str = "/mqtt";

/// Build the presigned `wss://<endpoint>/mqtt?...` URL.
pub fn presigned_url(
    config: &MqttConfig,
    region: &str,
    credentials: &TemporaryCredentials,
    time: SystemTime,
) -> MqttResult<String> {
    let authority = if config.port == 443 {
        config.endpoint.clone()
    } else {
        format!("{}:{}", config.endpoint, config.port)
    };
    let signing_url = format!("https://{authority}{MQTT_PATH}");

    let identity = Credentials::new(
        &credentials.access_key_id,
        &credentials.secret_key,
        Some(credentials.session_token.clone()),
        None,
        "cognito-identity",
    )
    .into();

    let mut settings = SigningSettings::default();
    settings.signature_location = SignatureLocation::QueryParams;
    settings.expires_in = Some(Duration::from_secs(config.presign_expiry_secs));
    settings.session_token_mode = SessionTokenMode::Exclude;

    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SIGNING_SERVICE)
        .time(time)
        .settings(settings)
        .build()
        .map_err(|e| MqttError::Signing(e.to_string()))?
        .into();

    let signable = SignableRequest::new(
        "GET",
        &signing_url,
        std::iter::empty(),
        SignableBody::Bytes(&[]),
    )
    .map_err(|e| MqttError::Signing(e.to_string()))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| MqttError::Signing(e.to_string()))?
        .into_parts();

    let mut request = http::Request::builder()
        .method("GET")
        .uri(&signing_url)
        .body(())
        .map_err(|e| MqttError::Signing(e.to_string()))?;
    instructions.apply_to_request_http1x(&mut request);

    let signed = request.uri().to_string();
    Ok(signed.replacen("https://", "wss://", 1))
}

/// Build `MqttOptions` for a WebSocket connection signed with `credentials`.
pub fn websocket_options(
    config: &MqttConfig,
    region: &str,
    credentials: &TemporaryCredentials,
) -> MqttResult<MqttOptions> {
    config.validate()?;

    let url = presigned_url(config, region, credentials, SystemTime::now())?;

    let mut options = MqttOptions::new(&config.client_id, url, config.port);
    options.set_transport(Transport::wss_with_default_config());
    options.set_keep_alive(Duration::from_secs(config.keepalive_secs.into()));

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    const ENDPOINT: &str = "a1b2c3-ats.iot.us-east-1.amazonaws.com";

    fn credentials() -> TemporaryCredentials {
        TemporaryCredentials::new("ASIAEXAMPLEKEY", "example-secret", "example-session-token")
    }

    fn jan_first_2024() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_704_067_200)
    }

    #[test]
    fn url_targets_mqtt_path_over_wss() {
        let config = MqttConfig::new(ENDPOINT, "device-01");
        let url = presigned_url(&config, "us-east-1", &credentials(), jan_first_2024()).unwrap();
        assert!(
            url.starts_with(&format!("wss://{ENDPOINT}/mqtt?")),
            "unexpected url: {url}"
        );
    }

    #[test]
    fn url_carries_sigv4_query_params() {
        let config = MqttConfig::new(ENDPOINT, "device-01");
        let url = presigned_url(&config, "us-east-1", &credentials(), jan_first_2024()).unwrap();

        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Credential=ASIAEXAMPLEKEY"));
        assert!(url.contains("us-east-1"));
        assert!(url.contains(SIGNING_SERVICE));
        assert!(url.contains("X-Amz-Date=20240101T000000Z"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Security-Token=example-session-token"));
        assert!(!url.contains("example-secret"));
    }

    #[test]
    fn signature_is_deterministic_for_fixed_time() {
        let config = MqttConfig::new(ENDPOINT, "device-01");
        let a = presigned_url(&config, "us-east-1", &credentials(), jan_first_2024()).unwrap();
        let b = presigned_url(&config, "us-east-1", &credentials(), jan_first_2024()).unwrap();
        assert_eq!(a, b);

        let other_region =
            presigned_url(&config, "eu-west-1", &credentials(), jan_first_2024()).unwrap();
        assert_ne!(a, other_region);
    }

    #[test]
    fn non_default_port_is_kept_in_authority() {
        let mut config = MqttConfig::new("broker.local", "device-01");
        config.port = 8443;
        let url = presigned_url(&config, "us-east-1", &credentials(), jan_first_2024()).unwrap();
        assert!(url.starts_with("wss://broker.local:8443/mqtt?"), "{url}");
    }

    #[test]
    fn options_reject_invalid_config() {
        let config = MqttConfig::new("", "device-01");
        let err = websocket_options(&config, "us-east-1", &credentials()).unwrap_err();
        assert!(matches!(err, MqttError::Config(_)));
    }
}
