// src/common/ids.rs

use uuid::Uuid;

use crate::common::error::AppError;

// Os IDs chegam como texto (path ou body) para devolvermos 400 em JSON
// em vez da rejeição padrão do extrator Path<Uuid>.
pub fn parse_id(raw: &str, entity: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidId(entity))
}

/// Igual a `parse_id`, mas para campos opcionais do body: ausente/vazio é 400.
pub fn require_id(raw: Option<&str>, entity: &'static str) -> Result<Uuid, AppError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => parse_id(value, entity),
        _ => Err(AppError::BadRequest(format!("Missing {entity} ID"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_ids() {
        assert!(matches!(
            parse_id("not-a-uuid", "branch"),
            Err(AppError::InvalidId("branch"))
        ));
    }

    #[test]
    fn missing_body_id_is_bad_request() {
        assert!(matches!(
            require_id(None, "product"),
            Err(AppError::BadRequest(msg)) if msg == "Missing product ID"
        ));
        assert!(matches!(require_id(Some("  "), "product"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn accepts_well_formed_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "product").unwrap(), id);
    }
}
