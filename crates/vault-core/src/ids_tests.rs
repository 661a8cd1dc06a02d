use super::*;

#[test]
fn distinct_id_types_do_not_compare() {
    let job = TrainingJobId::new("job-1");
    let adapter = AdapterId::new("job-1");
    assert_eq!(job.as_str(), adapter.as_str());
    // no PartialEq<AdapterId> for TrainingJobId exists; this test documents
    // that the types are nominally distinct even with identical contents.
}

#[test]
fn workload_id_display_prefixes_by_kind() {
    let training = WorkloadId::Training(TrainingJobId::new("t1"));
    let eval = WorkloadId::Eval(EvalJobId::new("e1"));
    assert_eq!(training.to_string(), "training:t1");
    assert_eq!(eval.to_string(), "eval:e1");
}

#[test]
fn workload_id_serializes_with_tag() {
    let training = WorkloadId::Training(TrainingJobId::new("t1"));
    let json = serde_json::to_value(&training).unwrap();
    assert_eq!(json["kind"], "training");
}
