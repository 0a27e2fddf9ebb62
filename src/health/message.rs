// src/health/message.rs
//
// Check request/response messages. The protobuf layout follows
// grpc.health.v1 so that replies interoperate with gRPC health clients.

use prost::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::HealthError;
use super::format::OutputFormat;

#[derive(Clone, PartialEq, Message)]
pub struct CheckRequest {
    #[prost(string, tag = "1")]
    pub service: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct CheckResponse {
    #[prost(enumeration = "ServingStatus", tag = "1")]
    pub status: i32,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum ServingStatus {
    Unknown = 0,
    Serving = 1,
    NotServing = 2,
    ServiceUnknown = 3,
}

impl ServingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServingStatus::Unknown => "UNKNOWN",
            ServingStatus::Serving => "SERVING",
            ServingStatus::NotServing => "NOT_SERVING",
            ServingStatus::ServiceUnknown => "SERVICE_UNKNOWN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UNKNOWN" => Some(ServingStatus::Unknown),
            "SERVING" => Some(ServingStatus::Serving),
            "NOT_SERVING" => Some(ServingStatus::NotServing),
            "SERVICE_UNKNOWN" => Some(ServingStatus::ServiceUnknown),
            _ => None,
        }
    }
}

impl fmt::Display for ServingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CheckRequest {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl CheckResponse {
    pub fn with_status(status: ServingStatus) -> Self {
        let mut response = Self::default();
        response.set_status(status);
        response
    }
}

// JSON shape of a response: `{"status":"SERVING"}`
#[derive(Debug, Serialize, Deserialize)]
struct JsonCheckResponse {
    status: ServingStatus,
}

pub fn encode_request(request: &CheckRequest) -> Vec<u8> {
    request.encode_to_vec()
}

pub fn decode_request(bytes: &[u8]) -> Result<CheckRequest, HealthError> {
    Ok(CheckRequest::decode(bytes)?)
}

/// Encode a response in the given output format.
pub fn encode_response(
    response: &CheckResponse,
    format: OutputFormat,
) -> Result<Vec<u8>, HealthError> {
    match format {
        OutputFormat::Proto => Ok(response.encode_to_vec()),
        OutputFormat::Json => serde_json::to_vec(&JsonCheckResponse {
            status: response.status(),
        })
        .map_err(|e| HealthError::Encode {
            format,
            reason: e.to_string(),
        }),
        OutputFormat::Mesg => Ok(response.status().as_str().as_bytes().to_vec()),
    }
}

/// Decode a response body produced by [`encode_response`].
pub fn decode_response(bytes: &[u8], format: OutputFormat) -> Result<CheckResponse, HealthError> {
    match format {
        OutputFormat::Proto => CheckResponse::decode(bytes)
            .map_err(|e| HealthError::DecodeResponse(e.to_string())),
        OutputFormat::Json => serde_json::from_slice::<JsonCheckResponse>(bytes)
            .map(|json| CheckResponse::with_status(json.status))
            .map_err(|e| HealthError::DecodeResponse(e.to_string())),
        OutputFormat::Mesg => {
            let text = String::from_utf8_lossy(bytes);
            ServingStatus::from_name(text.trim())
                .map(CheckResponse::with_status)
                .ok_or_else(|| HealthError::DecodeResponse(format!("unknown status {:?}", text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_survives_every_format() {
        for format in [OutputFormat::Proto, OutputFormat::Json, OutputFormat::Mesg] {
            for status in [ServingStatus::Serving, ServingStatus::ServiceUnknown] {
                let response = CheckResponse::with_status(status);
                let bytes = encode_response(&response, format).unwrap();
                let decoded = decode_response(&bytes, format).unwrap();
                assert_eq!(decoded, response, "format {}", format);
                assert_eq!(encode_response(&decoded, format).unwrap(), bytes);
            }
        }
    }

    #[test]
    fn test_json_shape() {
        let bytes =
            encode_response(&CheckResponse::with_status(ServingStatus::Serving), OutputFormat::Json)
                .unwrap();
        assert_eq!(bytes, br#"{"status":"SERVING"}"#);
    }

    #[test]
    fn test_mesg_is_status_name() {
        let bytes = encode_response(
            &CheckResponse::with_status(ServingStatus::ServiceUnknown),
            OutputFormat::Mesg,
        )
        .unwrap();
        assert_eq!(bytes, b"SERVICE_UNKNOWN");
    }

    #[test]
    fn test_request_wire_layout() {
        // field 1, wire type 2, length 5, "svc-a"
        let bytes = encode_request(&CheckRequest::new("svc-a"));
        assert_eq!(bytes, b"\x0a\x05svc-a");
        assert_eq!(decode_request(&bytes).unwrap().service, "svc-a");
    }

    #[test]
    fn test_decode_request_rejects_garbage() {
        let err = decode_request(b"\xff\xff\xff").unwrap_err();
        assert!(matches!(err, HealthError::DecodeRequest(_)));
    }

    #[test]
    fn test_unknown_enum_value_reads_as_default() {
        let response = CheckResponse { status: 42 };
        assert_eq!(response.status(), ServingStatus::Unknown);
    }
}
