//! In-memory comment store for testing.
//!
//! [`MemoryStore`] enforces the same rules as the database schema: foreign
//! keys for target, author and parent, the same-thread trigger, and
//! monotonic ids. Timestamps come from a logical clock that advances one
//! second per insert, so ordering in tests is deterministic.
//!
//! # Feature Flag
//!
//! Outside this crate the module requires the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! oltm-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

use crate::comment::{Comment, CommentId, NewComment, Target, UserId};
use crate::error::{ConstraintKind, StoreError, StoreResult};
use crate::health::ServiceHealth;
use crate::store::{CommentStore, ParentRef, ThreadLookup};
use crate::thread::{newest_first, oldest_first};

#[derive(Debug)]
struct State {
    next_id: i64,
    clock: Timestamp,
    users: HashMap<UserId, String>,
    vehicles: HashSet<i64>,
    posts: HashSet<i64>,
    comments: HashMap<CommentId, Comment>,
    offline: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_id: 1,
            clock: Timestamp::UNIX_EPOCH,
            users: HashMap::new(),
            vehicles: HashSet::new(),
            posts: HashSet::new(),
            comments: HashMap::new(),
            offline: false,
        }
    }
}

impl State {
    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline {
            return Err(StoreError::Unavailable {
                message: "memory store is offline".into(),
                source: None,
            });
        }
        Ok(())
    }

    fn has_target(&self, target: Target) -> bool {
        match target {
            Target::Vehicle(id) => self.vehicles.contains(&id),
            Target::Post(id) => self.posts.contains(&id),
        }
    }

    fn tick(&mut self) -> Timestamp {
        self.clock = self
            .clock
            .saturating_add(SignedDuration::from_secs(1))
            .unwrap_or(self.clock);
        self.clock
    }
}

/// Thread-safe in-memory [`CommentStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a user.
    pub fn with_user(self, id: UserId, username: &str) -> Self {
        self.state().users.insert(id, username.to_owned());
        self
    }

    /// Registers a vehicle.
    pub fn with_vehicle(self, id: i64) -> Self {
        self.state().vehicles.insert(id);
        self
    }

    /// Registers a post.
    pub fn with_post(self, id: i64) -> Self {
        self.state().posts.insert(id);
        self
    }

    /// Removes a vehicle, as a concurrent delete would.
    pub fn remove_vehicle(&self, id: i64) {
        self.state().vehicles.remove(&id);
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Inserts a comment through the regular constraints and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if the insert is rejected; intended for test setup only.
    pub async fn seed_new(
        &self,
        target: Target,
        author_id: UserId,
        parent_id: Option<CommentId>,
        body: &str,
    ) -> CommentId {
        let comment = NewComment {
            target,
            author_id,
            parent_id,
            body: body.to_owned(),
        };

        match self.insert(comment).await {
            Ok(id) => id,
            Err(error) => panic!("seeding comment failed: {error}"),
        }
    }

    /// Stores a comment exactly as given, bypassing every constraint.
    ///
    /// Used to reproduce rows that could only exist through legacy data.
    pub fn seed_raw(&self, comment: Comment) {
        let mut state = self.state();
        state.next_id = state.next_id.max(comment.id.0 + 1);
        state.comments.insert(comment.id, comment);
    }

    /// Returns the number of stored comments.
    pub fn len(&self) -> usize {
        self.state().comments.len()
    }

    /// Returns `true` if no comment is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ThreadLookup for MemoryStore {
    async fn target_exists(&self, target: Target) -> StoreResult<bool> {
        let state = self.state();
        state.ensure_online()?;
        Ok(state.has_target(target))
    }

    async fn find_parent(&self, id: CommentId) -> StoreResult<Option<ParentRef>> {
        let state = self.state();
        state.ensure_online()?;
        Ok(state.comments.get(&id).map(ParentRef::from))
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert(&self, comment: NewComment) -> StoreResult<CommentId> {
        let mut state = self.state();
        state.ensure_online()?;

        if !state.has_target(comment.target) {
            let constraint = match comment.target {
                Target::Vehicle(_) => "comments_vehicle_id_fkey",
                Target::Post(_) => "comments_post_id_fkey",
            };
            return Err(StoreError::constraint(ConstraintKind::ForeignKey, constraint));
        }

        let Some(author_name) = state.users.get(&comment.author_id).cloned() else {
            return Err(StoreError::constraint(
                ConstraintKind::ForeignKey,
                "comments_author_id_fkey",
            ));
        };

        if let Some(parent_id) = comment.parent_id {
            let Some(parent) = state.comments.get(&parent_id) else {
                return Err(StoreError::constraint(
                    ConstraintKind::ForeignKey,
                    "comments_parent_id_fkey",
                ));
            };

            if parent.target != comment.target {
                return Err(StoreError::constraint(
                    ConstraintKind::CrossThread,
                    "comments_parent_same_thread",
                ));
            }
        }

        let id = CommentId(state.next_id);
        state.next_id += 1;
        let created_at = state.tick();

        state.comments.insert(
            id,
            Comment {
                id,
                target: comment.target,
                author_id: comment.author_id,
                author_name,
                parent_id: comment.parent_id,
                body: comment.body,
                created_at,
            },
        );

        Ok(id)
    }

    async fn find_by_id(&self, id: CommentId) -> StoreResult<Option<Comment>> {
        let state = self.state();
        state.ensure_online()?;
        Ok(state.comments.get(&id).cloned())
    }

    async fn list_by_target(&self, target: Target) -> StoreResult<Vec<Comment>> {
        let state = self.state();
        state.ensure_online()?;

        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| comment.target == target)
            .cloned()
            .collect();
        comments.sort_by(newest_first);
        Ok(comments)
    }

    async fn list_replies_of(&self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
        let state = self.state();
        state.ensure_online()?;

        let mut replies: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| comment.parent_id == Some(parent_id))
            .cloned()
            .collect();
        replies.sort_by(oldest_first);
        Ok(replies)
    }

    async fn health_check(&self) -> StoreResult<ServiceHealth> {
        let state = self.state();
        if state.offline {
            return Ok(ServiceHealth::unhealthy("memory store is offline"));
        }
        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn assigns_monotonic_ids_and_times() -> anyhow::Result<()> {
        let store = MemoryStore::new().with_user(UserId(1), "a").with_vehicle(1);
        let first = store.seed_new(Target::Vehicle(1), UserId(1), None, "one").await;
        let second = store.seed_new(Target::Vehicle(1), UserId(1), None, "two").await;
        assert!(second > first);

        let first = store.find_by_id(first).await?.unwrap();
        let second = store.find_by_id(second).await?.unwrap();
        assert!(second.created_at > first.created_at);
        assert_eq!(second.author_name, "a");
        Ok(())
    }

    #[tokio::test]
    async fn enforces_foreign_keys() {
        let store = MemoryStore::new().with_user(UserId(1), "a").with_vehicle(1);
        let comment = NewComment {
            target: Target::Vehicle(1),
            author_id: UserId(1),
            parent_id: Some(CommentId(77)),
            body: "orphan".into(),
        };

        let error = store.insert(comment).await.unwrap_err();
        assert_eq!(error.constraint_kind(), Some(ConstraintKind::ForeignKey));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn offline_store_reports_unhealthy() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set_offline(true);

        assert!(store.list_by_target(Target::Post(1)).await.is_err());
        assert!(!store.health_check().await?.is_operational());
        Ok(())
    }
}
