use serde::Serialize;

/// Standard JSON envelope for every response.
///
/// The payload's fields are flattened next to `success`, so handlers return
/// domain-named keys directly:
///
/// ```json
/// { "success": true, "chamado": { "id": "…" } }
/// { "success": false, "message": "Ticket not found" }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Payload type for responses that carry nothing but the envelope.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Payload {
        chamado: &'static str,
    }

    #[test]
    fn payload_fields_sit_beside_success() {
        let value = serde_json::to_value(ApiResponse::success(Payload { chamado: "x" }, "OK")).unwrap();
        assert_eq!(value, json!({ "success": true, "chamado": "x", "message": "OK" }));
    }

    #[test]
    fn errors_carry_only_the_message() {
        let value = serde_json::to_value(ApiResponse::<Empty>::error("Ticket not found")).unwrap();
        assert_eq!(value, json!({ "success": false, "message": "Ticket not found" }));
    }
}
