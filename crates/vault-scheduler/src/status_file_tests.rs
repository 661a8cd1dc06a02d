use super::*;

#[test]
fn progress_pct_computes_ratio() {
    let status = WorkerStatus {
        step: Some(25),
        total_steps: Some(100),
        ..Default::default()
    };
    assert_eq!(status.progress_pct(), 25.0);
}

#[test]
fn progress_pct_zero_total_steps_is_zero() {
    let status = WorkerStatus {
        step: Some(5),
        total_steps: Some(0),
        ..Default::default()
    };
    assert_eq!(status.progress_pct(), 0.0);
}

#[test]
fn progress_pct_missing_fields_is_zero() {
    assert_eq!(WorkerStatus::default().progress_pct(), 0.0);
}

#[test]
fn recent_loss_history_caps_at_100() {
    let status = WorkerStatus {
        loss_history: (0..150).map(|i| i as f64).collect(),
        ..Default::default()
    };
    let recent = status.recent_loss_history();
    assert_eq!(recent.len(), 100);
    assert_eq!(recent[0], 50.0);
    assert_eq!(recent[99], 149.0);
}
