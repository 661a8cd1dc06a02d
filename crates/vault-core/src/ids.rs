// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque identifier types for every entity in the data model.
//!
//! Each is a thin newtype over `String` generated by [`crate::define_id`],
//! so a `JobId` cannot be passed where an `AdapterId` is expected even
//! though both are strings underneath.

crate::define_id! {
    /// Identifies a user account.
    pub struct UserId;
}

crate::define_id! {
    /// Identifies an API key row.
    pub struct ApiKeyId;
}

crate::define_id! {
    /// Identifies a training job.
    pub struct TrainingJobId;
}

crate::define_id! {
    /// Identifies an evaluation job.
    pub struct EvalJobId;
}

crate::define_id! {
    /// Identifies a LoRA/full-finetune adapter.
    pub struct AdapterId;
}

crate::define_id! {
    /// Identifies a quarantine submission (a batch of files).
    pub struct QuarantineJobId;
}

crate::define_id! {
    /// Identifies a single file within a quarantine submission.
    pub struct QuarantineFileId;
}

crate::define_id! {
    /// Identifies an update bundle application.
    pub struct UpdateJobId;
}

crate::define_id! {
    /// Identifies an uptime transition event.
    pub struct UptimeEventId;
}

crate::define_id! {
    /// Identifies an append-only audit log row.
    pub struct AuditLogEntryId;
}

crate::define_id! {
    /// Identifies an LDAP/directory group-to-role mapping.
    pub struct LdapGroupMappingId;
}

/// Either job kind the scheduler and job runner operate on.
///
/// Training and evaluation jobs live in separate tables with separate ID
/// types, but the scheduler's GPU admission lock and log-stream multiplex
/// treat them identically, so this enum lets shared code refer to "the
/// currently running job" without caring which table it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkloadId {
    Training(TrainingJobId),
    Eval(EvalJobId),
}

impl std::fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadId::Training(id) => write!(f, "training:{id}"),
            WorkloadId::Eval(id) => write!(f, "eval:{id}"),
        }
    }
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
