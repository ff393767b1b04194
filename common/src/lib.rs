use validator::ValidationErrors;

/// Joins every field-level validation message into one `; `-separated string.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::format_validation_errors;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    struct Body {
        #[validate(length(max = 3, message = "reply is too long"))]
        reply: Option<String>,
    }

    #[test]
    fn collects_field_messages() {
        let body = Body {
            reply: Some("abcdef".into()),
        };
        let errors = body.validate().unwrap_err();
        assert_eq!(format_validation_errors(&errors), "reply is too long");
    }
}
