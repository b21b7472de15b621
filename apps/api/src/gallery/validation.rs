use uuid::Uuid;

use crate::errors::AppError;

/// Parses a tree id in its canonical textual form: 32 hex digits grouped
/// 8-4-4-4-12, case-insensitive. `Uuid::parse_str` alone also accepts the
/// undashed simple form, so the length gate keeps the API strict.
pub fn parse_tree_id(raw: &str) -> Result<Uuid, AppError> {
    if raw.len() != 36 {
        return Err(invalid_id());
    }
    Uuid::parse_str(raw).map_err(|_| invalid_id())
}

fn invalid_id() -> AppError {
    AppError::Validation("Invalid tree ID format".to_string())
}
