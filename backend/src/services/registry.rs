//! Assignment registry for one (day, shift group) selection.
//!
//! The registry holds the `role_id -> worker_id` snapshot of the selected
//! shift and is the only writer of assignment records. It keeps every worker
//! on at most one role per shift; the store itself does not check this.
//!
//! # Lifecycle
//!
//! ```text
//!   no snapshot ──begin_load──▶ loading ──apply_load──▶ snapshot(day, group)
//!        ▲                         │                         │
//!        └─────────────────────────┴──────begin_load─────────┘
//! ```
//!
//! Every selection change bumps a generation counter. Results carrying an
//! older generation are dropped, so a slow response for a previous selection
//! never overwrites the current one.
//!
//! Writes are two-phase: [`AssignmentRegistry::stage`] validates and prepares a
//! copy of the snapshot, the store upsert runs, and
//! [`AssignmentRegistry::complete`] commits the copy only if the upsert
//! succeeded and the selection is still current.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{Assignment, Role, RoleId, ShiftGroup, Weekday, Worker, WorkerId};

/// The shift a registry is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub day: Weekday,
    pub group: ShiftGroup,
}

/// Handle for one load, tagged with the generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    selection: Selection,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }
}

/// What happened to a load result.
#[derive(Debug, Clone)]
pub enum LoadStatus {
    /// The records replaced the snapshot.
    Applied,
    /// The read failed; the snapshot is empty and the error is kept for display.
    Degraded(RepositoryError),
    /// The selection changed in the meantime; the result was dropped.
    Stale,
}

impl LoadStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadStatus::Applied)
    }

    /// Error to show next to the (empty) data, if any.
    pub fn warning(&self) -> Option<&RepositoryError> {
        match self {
            LoadStatus::Degraded(e) => Some(e),
            _ => None,
        }
    }
}

/// Data from a read that never hard-fails: on error `data` is empty and
/// `error` says why.
#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub data: T,
    pub error: Option<RepositoryError>,
}

impl<T> ReadOutcome<T> {
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

impl<T: Default> ReadOutcome<T> {
    /// Fold a store result, substituting the empty value on error.
    pub fn from_result(result: RepositoryResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                log::warn!("Read degraded to empty result: {}", e);
                Self {
                    data: T::default(),
                    error: Some(e),
                }
            }
        }
    }
}

/// Roles and eligible workers for one shift group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterContext {
    /// All roles, ascending id
    pub roles: Vec<Role>,
    /// Workers of the group's pool, ascending id
    pub workers: Vec<Worker>,
}

/// A worker as offered for one role: `assigned_role` is set when the worker
/// already covers another role in the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerOption {
    pub worker: Worker,
    pub assigned_role: Option<RoleId>,
}

/// Successful outcome of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The snapshot now maps the role to the worker.
    Assigned { previous: Option<WorkerId> },
    /// The pair was already in place; the record was written again.
    Unchanged,
    /// Stored, but the selection changed while writing so the current
    /// snapshot was left alone.
    Detached,
}

/// Errors from [`AssignmentRegistry`] writes.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No day and shift selected")]
    NoSelection,

    #[error("Worker {worker_id} is already assigned to role {held_by} in this shift")]
    Conflict { worker_id: WorkerId, held_by: RoleId },

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Validated write waiting for the store.
#[derive(Debug, Clone)]
pub struct PendingAssignment {
    generation: u64,
    record: Assignment,
    previous: Option<WorkerId>,
    staged: BTreeMap<RoleId, WorkerId>,
}

impl PendingAssignment {
    /// The record to upsert.
    pub fn record(&self) -> &Assignment {
        &self.record
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    selection: Selection,
    assignments: BTreeMap<RoleId, WorkerId>,
}

/// Registry over a shared repository.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use turni::db::LocalRepository;
/// use turni::models::{RoleId, ShiftGroup, Weekday, WorkerId};
/// use turni::services::AssignmentRegistry;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let mut registry = AssignmentRegistry::new(Arc::new(LocalRepository::new()));
/// registry.load_assignments(Weekday::Monday, ShiftGroup::A).await;
/// registry.assign(RoleId(1), WorkerId(10)).await.unwrap();
/// assert_eq!(registry.worker_for(RoleId(1)), Some(WorkerId(10)));
/// # });
/// ```
pub struct AssignmentRegistry {
    repo: Arc<dyn FullRepository>,
    generation: u64,
    snapshot: Option<Snapshot>,
}

impl AssignmentRegistry {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self {
            repo,
            generation: 0,
            snapshot: None,
        }
    }

    /// Current generation; bumped on every selection change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The selection whose snapshot is loaded, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.snapshot.as_ref().map(|s| s.selection)
    }

    /// The loaded `role_id -> worker_id` map.
    pub fn snapshot(&self) -> Option<&BTreeMap<RoleId, WorkerId>> {
        self.snapshot.as_ref().map(|s| &s.assignments)
    }

    pub fn worker_for(&self, role_id: RoleId) -> Option<WorkerId> {
        self.snapshot()?.get(&role_id).copied()
    }

    /// Role currently held by `worker_id`, if any.
    pub fn role_of(&self, worker_id: WorkerId) -> Option<RoleId> {
        self.snapshot()?
            .iter()
            .find(|(_, w)| **w == worker_id)
            .map(|(r, _)| *r)
    }

    /// Fetch all roles and the workers of `group`'s pool.
    ///
    /// Each list degrades to empty independently; the first error is reported.
    pub async fn load_context(&self, group: ShiftGroup) -> ReadOutcome<RosterContext> {
        let roles = ReadOutcome::from_result(self.repo.list_roles().await);
        let workers = ReadOutcome::from_result(self.repo.list_workers(Some(group)).await);

        ReadOutcome {
            data: RosterContext {
                roles: roles.data,
                workers: workers.data,
            },
            error: roles.error.or(workers.error),
        }
    }

    /// Workers offered for `role_id`, marking those busy on another role.
    pub fn worker_options(&self, role_id: RoleId, workers: &[Worker]) -> Vec<WorkerOption> {
        workers
            .iter()
            .map(|worker| WorkerOption {
                worker: worker.clone(),
                assigned_role: self.role_of(worker.id).filter(|held| *held != role_id),
            })
            .collect()
    }

    /// Switch to a new selection and drop the current snapshot.
    pub fn begin_load(&mut self, day: Weekday, group: ShiftGroup) -> LoadTicket {
        self.generation += 1;
        let selection = Selection { day, group };
        self.snapshot = None;

        LoadTicket {
            generation: self.generation,
            selection,
        }
    }

    /// Apply the store's answer to the load identified by `ticket`.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: RepositoryResult<Vec<Assignment>>,
    ) -> LoadStatus {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping load for {} {} (generation {} < {})",
                ticket.selection.day,
                ticket.selection.group,
                ticket.generation,
                self.generation
            );
            return LoadStatus::Stale;
        }

        let selection = ticket.selection;

        match result {
            Ok(records) => {
                let assignments = records
                    .into_iter()
                    .filter(|r| r.day == selection.day && r.group == selection.group)
                    .map(|r| (r.role_id, r.worker_id))
                    .collect();
                self.snapshot = Some(Snapshot {
                    selection,
                    assignments,
                });
                LoadStatus::Applied
            }
            Err(e) => {
                log::warn!(
                    "Loading assignments for {} {} failed: {}",
                    selection.day,
                    selection.group,
                    e
                );
                self.snapshot = Some(Snapshot {
                    selection,
                    assignments: BTreeMap::new(),
                });
                LoadStatus::Degraded(e)
            }
        }
    }

    /// Select `(day, group)` and load its assignments from the store.
    pub async fn load_assignments(&mut self, day: Weekday, group: ShiftGroup) -> LoadStatus {
        let ticket = self.begin_load(day, group);
        let result = self.repo.list_assignments(day, group).await;
        self.apply_load(ticket, result)
    }

    /// Validate `role_id -> worker_id` against the snapshot and prepare the write.
    ///
    /// # Errors
    /// * [`RegistryError::NoSelection`] if no snapshot is loaded
    /// * [`RegistryError::Conflict`] if another role already holds the worker
    pub fn stage(
        &self,
        role_id: RoleId,
        worker_id: WorkerId,
    ) -> Result<PendingAssignment, RegistryError> {
        let snapshot = self.snapshot.as_ref().ok_or(RegistryError::NoSelection)?;

        if let Some((held_by, _)) = snapshot
            .assignments
            .iter()
            .find(|(r, w)| **w == worker_id && **r != role_id)
        {
            log::info!(
                "Rejected assigning worker {} to role {} on {} {}: already on role {}",
                worker_id,
                role_id,
                snapshot.selection.day,
                snapshot.selection.group,
                held_by
            );
            return Err(RegistryError::Conflict {
                worker_id,
                held_by: *held_by,
            });
        }

        let mut staged = snapshot.assignments.clone();
        let previous = staged.insert(role_id, worker_id);

        Ok(PendingAssignment {
            generation: self.generation,
            record: Assignment::new(
                snapshot.selection.day,
                snapshot.selection.group,
                role_id,
                worker_id,
            ),
            previous,
            staged,
        })
    }

    /// Finish a staged write with the store's answer.
    ///
    /// On success the staged copy becomes the snapshot, unless the selection
    /// changed meanwhile. On failure the copy is discarded.
    pub fn complete(
        &mut self,
        pending: PendingAssignment,
        result: RepositoryResult<()>,
    ) -> Result<AssignOutcome, RegistryError> {
        if let Err(e) = result {
            log::warn!(
                "Saving {} {} role {} failed: {}",
                pending.record.day,
                pending.record.group,
                pending.record.role_id,
                e
            );
            return Err(RegistryError::Store(e));
        }

        if pending.generation != self.generation {
            log::debug!(
                "Assignment for {} {} stored after selection changed",
                pending.record.day,
                pending.record.group
            );
            return Ok(AssignOutcome::Detached);
        }

        let Some(ref mut snapshot) = self.snapshot else {
            return Ok(AssignOutcome::Detached);
        };
        snapshot.assignments = pending.staged;

        if pending.previous == Some(pending.record.worker_id) {
            Ok(AssignOutcome::Unchanged)
        } else {
            Ok(AssignOutcome::Assigned {
                previous: pending.previous,
            })
        }
    }

    /// Assign `worker_id` to `role_id` in the selected shift and persist it.
    pub async fn assign(
        &mut self,
        role_id: RoleId,
        worker_id: WorkerId,
    ) -> Result<AssignOutcome, RegistryError> {
        let pending = self.stage(role_id, worker_id)?;
        let result = self.repo.upsert_assignment(pending.record()).await;
        self.complete(pending, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::AssignmentRepository;

    fn seeded() -> (Arc<LocalRepository>, AssignmentRegistry) {
        let repo = Arc::new(LocalRepository::new());
        repo.insert_role(Role::new(1, "CF"));
        repo.insert_role(Role::new(2, "BART"));
        repo.insert_worker(Worker::new(10, "Alice", ShiftGroup::A));
        repo.insert_worker(Worker::new(11, "Bob", ShiftGroup::A));
        repo.insert_worker(Worker::new(20, "Carla", ShiftGroup::B));
        let registry = AssignmentRegistry::new(repo.clone());
        (repo, registry)
    }

    fn assert_one_role_per_worker(registry: &AssignmentRegistry) {
        let snapshot = registry.snapshot().unwrap();
        let mut workers: Vec<_> = snapshot.values().collect();
        workers.sort();
        workers.dedup();
        assert_eq!(workers.len(), snapshot.len());
    }

    #[tokio::test]
    async fn test_assign_before_load_is_rejected() {
        let (repo, mut registry) = seeded();
        let err = registry.assign(RoleId(1), WorkerId(10)).await.unwrap_err();
        assert!(matches!(err, RegistryError::NoSelection));
        assert_eq!(repo.upsert_attempts(), 0);
    }

    #[tokio::test]
    async fn test_load_context_filters_workers_by_group() {
        let (_repo, registry) = seeded();
        let context = registry.load_context(ShiftGroup::A).await;
        assert!(!context.is_degraded());
        let codes: Vec<&str> = context.data.roles.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["CF", "BART"]);
        let names: Vec<&str> = context.data.workers.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_conflict_leaves_snapshot_and_store_alone() {
        let (repo, mut registry) = seeded();
        assert!(registry
            .load_assignments(Weekday::Monday, ShiftGroup::A)
            .await
            .is_applied());
        assert!(registry.snapshot().unwrap().is_empty());

        registry.assign(RoleId(1), WorkerId(10)).await.unwrap();
        let before = registry.snapshot().cloned();
        let attempts = repo.upsert_attempts();

        let err = registry.assign(RoleId(2), WorkerId(10)).await.unwrap_err();
        match err {
            RegistryError::Conflict { worker_id, held_by } => {
                assert_eq!(worker_id, WorkerId(10));
                assert_eq!(held_by, RoleId(1));
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(registry.snapshot().cloned(), before);
        assert_eq!(repo.upsert_attempts(), attempts);
    }

    #[tokio::test]
    async fn test_reassigning_same_pair_still_writes() {
        let (repo, mut registry) = seeded();
        registry.load_assignments(Weekday::Monday, ShiftGroup::A).await;

        let first = registry.assign(RoleId(1), WorkerId(10)).await.unwrap();
        assert_eq!(first, AssignOutcome::Assigned { previous: None });

        let again = registry.assign(RoleId(1), WorkerId(10)).await.unwrap();
        assert_eq!(again, AssignOutcome::Unchanged);
        assert_eq!(repo.upsert_attempts(), 2);
        assert_eq!(repo.assignment_count(), 1);
    }

    #[tokio::test]
    async fn test_replacing_worker_frees_the_previous_one() {
        let (_repo, mut registry) = seeded();
        registry.load_assignments(Weekday::Monday, ShiftGroup::A).await;

        registry.assign(RoleId(1), WorkerId(10)).await.unwrap();
        let outcome = registry.assign(RoleId(1), WorkerId(11)).await.unwrap();
        assert_eq!(
            outcome,
            AssignOutcome::Assigned {
                previous: Some(WorkerId(10))
            }
        );

        // Alice is free again and can take the other role.
        registry.assign(RoleId(2), WorkerId(10)).await.unwrap();
        assert_one_role_per_worker(&registry);
    }

    #[tokio::test]
    async fn test_failed_upsert_keeps_previous_snapshot() {
        let (repo, mut registry) = seeded();
        registry.load_assignments(Weekday::Tuesday, ShiftGroup::A).await;
        registry.assign(RoleId(1), WorkerId(10)).await.unwrap();

        repo.set_fail_writes(true);
        let err = registry.assign(RoleId(2), WorkerId(11)).await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert_eq!(registry.worker_for(RoleId(2)), None);
        assert_eq!(registry.worker_for(RoleId(1)), Some(WorkerId(10)));
    }

    #[tokio::test]
    async fn test_failed_read_degrades_to_empty_snapshot() {
        let (repo, mut registry) = seeded();
        repo.insert_assignment(Assignment::new(
            Weekday::Friday,
            ShiftGroup::A,
            RoleId(1),
            WorkerId(10),
        ));
        repo.set_fail_reads(true);

        let status = registry.load_assignments(Weekday::Friday, ShiftGroup::A).await;
        assert!(status.warning().is_some());
        assert!(registry.snapshot().unwrap().is_empty());

        let context = registry.load_context(ShiftGroup::A).await;
        assert!(context.is_degraded());
        assert!(context.data.roles.is_empty());
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let (_repo, mut registry) = seeded();
        let old = registry.begin_load(Weekday::Monday, ShiftGroup::A);
        let current = registry.begin_load(Weekday::Monday, ShiftGroup::B);

        let status = registry.apply_load(
            old,
            Ok(vec![Assignment::new(
                Weekday::Monday,
                ShiftGroup::A,
                RoleId(1),
                WorkerId(10),
            )]),
        );
        assert!(matches!(status, LoadStatus::Stale));
        assert!(registry.snapshot().is_none());

        assert!(registry.apply_load(current, Ok(vec![])).is_applied());
        assert_eq!(
            registry.selection(),
            Some(Selection {
                day: Weekday::Monday,
                group: ShiftGroup::B
            })
        );
    }

    #[tokio::test]
    async fn test_write_finishing_after_selection_change_is_detached() {
        let (repo, mut registry) = seeded();
        registry.load_assignments(Weekday::Monday, ShiftGroup::A).await;

        let pending = registry.stage(RoleId(1), WorkerId(10)).unwrap();
        registry.load_assignments(Weekday::Monday, ShiftGroup::B).await;

        let result = repo.upsert_assignment(pending.record()).await;
        let outcome = registry.complete(pending, result).unwrap();
        assert_eq!(outcome, AssignOutcome::Detached);
        assert!(registry.snapshot().unwrap().is_empty());
        assert_eq!(repo.assignment_count(), 1);
    }

    #[tokio::test]
    async fn test_worker_options_flag_busy_workers() {
        let (_repo, mut registry) = seeded();
        registry.load_assignments(Weekday::Monday, ShiftGroup::A).await;
        registry.assign(RoleId(1), WorkerId(10)).await.unwrap();

        let workers = registry.load_context(ShiftGroup::A).await.data.workers;
        let for_role_two = registry.worker_options(RoleId(2), &workers);
        assert_eq!(for_role_two[0].assigned_role, Some(RoleId(1)));
        assert_eq!(for_role_two[1].assigned_role, None);

        let for_role_one = registry.worker_options(RoleId(1), &workers);
        assert_eq!(for_role_one[0].assigned_role, None);
    }
}
