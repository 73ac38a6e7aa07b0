use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::prompts::PromptSet;
use crate::scene::Scene;

/// Callback invoked with a state snapshot after every store mutation.
pub type Subscriber = Arc<dyn Fn(&GenerationState) + Send + Sync>;

/// Handle returned by `subscribe`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

// ---------------------------------------------------------------------------
// State snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationState {
    pub scenes: Vec<Scene>,
    pub prompts: Option<PromptSet>,
    pub scene_count: usize,
    pub is_generating: bool,
    pub credit_balance: u64,
    /// RFC 3339; set when a batch starts / finishes.
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

/// Partial update: every `Some` field replaces the corresponding state field.
#[derive(Debug, Default)]
pub struct StatePatch {
    pub scenes: Option<Vec<Scene>>,
    pub prompts: Option<Option<PromptSet>>,
    pub scene_count: Option<usize>,
    pub is_generating: Option<bool>,
    pub credit_balance: Option<u64>,
    pub started_at: Option<Option<String>>,
    pub finished_at: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Shared observable generation state. Constructed by the shell, passed by
/// `Arc` to the orchestrator; every mutation synchronously notifies every
/// live subscriber with a fresh snapshot. All writes come from the
/// orchestrator's single sequential task, so there is no concurrent writer;
/// the mutex only guards reader snapshots against torn state.
pub struct GenerationStore {
    state: Mutex<GenerationState>,
    subscribers: Mutex<BTreeMap<u64, Subscriber>>,
    next_subscription: AtomicU64,
}

impl Default for GenerationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GenerationState::default()),
            subscribers: Mutex::new(BTreeMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> GenerationState {
        self.lock_state().clone()
    }

    pub fn is_generating(&self) -> bool {
        self.lock_state().is_generating
    }

    /// Merge a partial update into the state and notify all subscribers.
    pub fn apply(&self, patch: StatePatch) {
        let snapshot = {
            let mut state = self.lock_state();
            if let Some(scenes) = patch.scenes {
                state.scenes = scenes;
            }
            if let Some(prompts) = patch.prompts {
                state.prompts = prompts;
            }
            if let Some(scene_count) = patch.scene_count {
                state.scene_count = scene_count;
            }
            if let Some(is_generating) = patch.is_generating {
                state.is_generating = is_generating;
            }
            if let Some(credit_balance) = patch.credit_balance {
                state.credit_balance = credit_balance;
            }
            if let Some(started_at) = patch.started_at {
                state.started_at = started_at;
            }
            if let Some(finished_at) = patch.finished_at {
                state.finished_at = finished_at;
            }
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Mutate one scene in place (0-based index) and notify. A missing index
    /// is a no-op: the batch that created the scene list is the only writer,
    /// so this only happens on a stale call after a reset.
    pub fn update_scene(&self, index: usize, f: impl FnOnce(&mut Scene)) {
        let snapshot = {
            let mut state = self.lock_state();
            match state.scenes.get_mut(index) {
                Some(scene) => f(scene),
                None => return,
            }
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Re-entrancy gate: atomically flip the in-flight flag. Returns false,
    /// changing nothing, when a batch is already running.
    pub fn try_begin_batch(&self) -> bool {
        let snapshot = {
            let mut state = self.lock_state();
            if state.is_generating {
                return false;
            }
            state.is_generating = true;
            state.clone()
        };
        self.notify(&snapshot);
        true
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.lock_subscribers().insert(id, subscriber);
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_subscribers().remove(&id.0);
    }

    /// Invoke every subscriber outside both locks, so a callback may read
    /// the store or adjust subscriptions without deadlocking.
    fn notify(&self, snapshot: &GenerationState) {
        let subscribers: Vec<Subscriber> = self.lock_subscribers().values().cloned().collect();
        for subscriber in subscribers {
            subscriber(snapshot);
        }
    }

    // Poisoning marks a panic elsewhere; the data is still coherent, recover it.
    fn lock_state(&self) -> MutexGuard<'_, GenerationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, BTreeMap<u64, Subscriber>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::StageStatus;
    use std::sync::atomic::AtomicUsize;

    fn counting_subscriber(counter: Arc<AtomicUsize>) -> Subscriber {
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn apply_merges_only_the_given_fields() {
        let store = GenerationStore::new();
        store.apply(StatePatch {
            scene_count: Some(3),
            credit_balance: Some(500),
            ..Default::default()
        });
        store.apply(StatePatch {
            is_generating: Some(true),
            ..Default::default()
        });

        let state = store.snapshot();
        assert_eq!(state.scene_count, 3);
        assert_eq!(state.credit_balance, 500);
        assert!(state.is_generating);
        assert!(state.scenes.is_empty());
    }

    #[test]
    fn every_update_notifies_every_subscriber() {
        let store = GenerationStore::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        store.subscribe(counting_subscriber(a.clone()));
        store.subscribe(counting_subscriber(b.clone()));

        store.apply(StatePatch {
            scene_count: Some(1),
            ..Default::default()
        });
        store.apply(StatePatch {
            scene_count: Some(2),
            ..Default::default()
        });

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribed_listeners_stop_receiving() {
        let store = GenerationStore::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = store.subscribe(counting_subscriber(counter.clone()));

        store.apply(StatePatch {
            scene_count: Some(1),
            ..Default::default()
        });
        store.unsubscribe(id);
        store.apply(StatePatch {
            scene_count: Some(2),
            ..Default::default()
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribers_see_the_post_update_snapshot() {
        let store = GenerationStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(Arc::new(move |state: &GenerationState| {
            sink.lock().unwrap().push(state.scene_count);
        }));

        store.apply(StatePatch {
            scene_count: Some(7),
            ..Default::default()
        });

        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn update_scene_mutates_in_place_and_notifies() {
        let store = GenerationStore::new();
        store.apply(StatePatch {
            scenes: Some(vec![Scene::idle(1), Scene::idle(2)]),
            ..Default::default()
        });

        let counter = Arc::new(AtomicUsize::new(0));
        store.subscribe(counting_subscriber(counter.clone()));

        store.update_scene(1, |s| s.image_status = StageStatus::Working);

        let state = store.snapshot();
        assert_eq!(state.scenes[0].image_status, StageStatus::Idle);
        assert_eq!(state.scenes[1].image_status, StageStatus::Working);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn update_scene_out_of_bounds_is_a_silent_no_op() {
        let store = GenerationStore::new();
        let counter = Arc::new(AtomicUsize::new(0));
        store.subscribe(counting_subscriber(counter.clone()));

        store.update_scene(5, |s| s.image_status = StageStatus::Error);

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn try_begin_batch_blocks_a_second_batch() {
        let store = GenerationStore::new();
        assert!(store.try_begin_batch());
        assert!(store.is_generating());
        assert!(!store.try_begin_batch());

        store.apply(StatePatch {
            is_generating: Some(false),
            ..Default::default()
        });
        assert!(store.try_begin_batch());
    }

    #[test]
    fn a_subscriber_may_read_the_store_during_notification() {
        let store = Arc::new(GenerationStore::new());
        let inner = store.clone();
        let observed = Arc::new(Mutex::new(None));
        let sink = observed.clone();
        store.subscribe(Arc::new(move |_| {
            *sink.lock().unwrap() = Some(inner.snapshot().scene_count);
        }));

        store.apply(StatePatch {
            scene_count: Some(4),
            ..Default::default()
        });

        assert_eq!(*observed.lock().unwrap(), Some(4));
    }
}
