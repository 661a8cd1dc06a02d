use super::*;

#[test]
fn validation_maps_to_422() {
    let err = CoreError::validation("bad payload");
    assert_eq!(err.status_code(), 422);
}

#[test]
fn backend_unavailable_carries_suggestion() {
    let err = CoreError::backend_unavailable("AV daemon unreachable", "retry in 30s");
    assert_eq!(err.status_code(), 503);
    assert_eq!(err.details.as_deref(), Some("retry in 30s"));
}

#[test]
fn conflict_maps_to_409() {
    let err = CoreError::conflict("job already cancelled");
    assert_eq!(err.status_code(), 409);
}

#[test]
fn display_shows_message_only() {
    let err = CoreError::not_found("job 42").with_details("ignored by Display");
    assert_eq!(err.to_string(), "job 42");
}
