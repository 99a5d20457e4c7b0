use crate::{errors::AppError, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

pub const COMPANY_HEADER: &str = "X-Company-Id";

/// Company a request operates on.
/// Taken from the `X-Company-Id` header, or the configured default company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyScope {
    pub id: String,
}

fn valid_company_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl FromRequestParts<AppState> for CompanyScope {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let headers: &HeaderMap = &parts.headers;

        let id = match headers.get(COMPANY_HEADER) {
            None => state.config.default_company_id.clone(),
            Some(value) => value
                .to_str()
                .map(|v| v.trim().to_string())
                .map_err(|_| AppError::BadRequest(format!("{COMPANY_HEADER} is not valid text")))?,
        };

        if !valid_company_id(&id) {
            return Err(AppError::BadRequest(format!(
                "{COMPANY_HEADER} may only contain letters, digits, '-' and '_'"
            )));
        }

        Ok(CompanyScope { id })
    }
}
