use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::PersonId;

use crate::listener::{self, Listener, ListenerId, ListenerRegistry};
use crate::person::Person;

/// Upper bound on passes re-run because listeners mutated the collection
/// while being notified. Guards against listeners that mutate on every pass.
const MAX_CHAINED_PASSES: usize = 256;

#[derive(Debug, Default)]
struct CollectionState {
    last_id: Option<PersonId>,
    people: BTreeMap<PersonId, Person>,
}

impl CollectionState {
    /// Hands out the next id, or `None` once [`PersonId::MAX`] is taken.
    fn next_id(&mut self) -> Option<PersonId> {
        let id = match self.last_id {
            None => PersonId::first(),
            Some(last) => last.next()?,
        };
        self.last_id = Some(id);
        Some(id)
    }

    /// Keeps the id counter ahead of every id stored so far.
    fn observe(&mut self, id: PersonId) {
        self.last_id = self.last_id.max(Some(id));
    }
}

/// In-memory person collection with change notification.
///
/// Cloning yields another handle to the same collection, which is how a
/// listener keeps access to the data it is notified about. Independent
/// collections are created with [`EntityCollection::new`].
///
/// Mutations complete, release their lock, then run one notification pass
/// before returning. A mutation made by a listener during a pass is applied
/// immediately and its own pass runs once the current one finishes, so
/// every mutation still gets exactly one pass.
#[derive(Clone, Default)]
pub struct EntityCollection {
    state: Arc<RwLock<CollectionState>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
}

impl EntityCollection {
    /// Creates an empty collection. The first saved person gets id 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transient person and saves it.
    pub fn create(&self, name: impl Into<String>, birth_year: i32) -> Person {
        self.save(Person::new(name, birth_year))
    }

    /// Inserts a transient person under a fresh id, or overwrites the entry
    /// for a person that already has one. Returns the stored person.
    ///
    /// Once an id equal to [`PersonId::MAX`] has been stored no fresh ids
    /// remain: a transient person is then returned unsaved, still without an
    /// id, and the failure is logged. Listeners are notified either way.
    #[tracing::instrument(skip(self, person), fields(person_id = ?person.id(), name = %person.name()))]
    pub fn save(&self, mut person: Person) -> Person {
        {
            let mut state = self.write_state();
            match person.id() {
                None => match state.next_id() {
                    Some(id) => {
                        person.assign_id(id);
                        state.people.insert(id, person.clone());
                        tracing::debug!(%id, "person created");
                    }
                    None => {
                        tracing::error!("person ids exhausted; transient person not saved");
                    }
                },
                Some(id) => {
                    state.observe(id);
                    state.people.insert(id, person.clone());
                    tracing::debug!(%id, "person updated");
                }
            }
        }
        self.notify();
        person
    }

    /// Removes the stored entry for this person. Transient or unknown
    /// people are ignored; listeners are notified either way.
    pub fn remove(&self, person: &Person) {
        match person.id() {
            Some(id) => self.remove_by_id(id),
            None => {
                tracing::debug!("remove called with a transient person");
                self.notify();
            }
        }
    }

    /// Removes the entry stored under `id`, if any, then notifies.
    #[tracing::instrument(skip(self))]
    pub fn remove_by_id(&self, id: PersonId) {
        let removed = self.write_state().people.remove(&id).is_some();
        if removed {
            tracing::debug!("person removed");
        } else {
            tracing::debug!("no person stored under id");
        }
        self.notify();
    }

    /// Looks a person up by id.
    pub fn find_by_id(&self, id: PersonId) -> Option<Person> {
        self.read_state().people.get(&id).cloned()
    }

    /// Returns a snapshot of all people in ascending id order.
    pub fn all(&self) -> Vec<Person> {
        self.read_state().people.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read_state().people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().people.is_empty()
    }

    /// Registers a listener and calls it once before returning so it can
    /// sync with the current state. Later it runs after every mutation.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut() -> crate::Result<()> + Send + 'static,
    {
        let mut listener: Listener = Box::new(listener);
        let id = self.lock_listeners().allocate_id();

        // A failed first call is logged but does not stop registration.
        let _ = listener::deliver(id, &mut listener);

        self.lock_listeners().push(id, listener);
        tracing::debug!(listener = %id, "listener registered");
        id
    }

    /// Unregisters a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.lock_listeners().remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    /// Runs one notification pass. A mutation made by a listener during a
    /// pass owes its own pass, which runs after the current one completes.
    fn notify(&self) {
        for pass in 0..MAX_CHAINED_PASSES {
            let Some(mut listeners) = self.lock_listeners().begin_pass() else {
                tracing::debug!("notification deferred until the running pass completes");
                return;
            };

            let report = listener::deliver_all(&mut listeners);
            metrics::counter!("collection_notifications").increment(1);
            tracing::trace!(
                pass,
                delivered = report.delivered,
                failed = report.failed,
                "notification pass complete"
            );

            if !self.lock_listeners().end_pass(listeners) {
                return;
            }
        }

        // The last end_pass claimed one owed pass that will not run.
        let dropped = 1 + self.lock_listeners().drop_owed_passes();
        tracing::error!(
            max_passes = MAX_CHAINED_PASSES,
            dropped,
            "listeners kept mutating the collection; stopped re-notifying"
        );
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CollectionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CollectionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, ListenerRegistry> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EntityCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCollection")
            .field("people", &self.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListenerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(collection: &EntityCollection) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_ref = Arc::clone(&calls);
        collection.add_listener(move || {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        calls
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let collection = EntityCollection::new();
        let a = collection.create("a", 1990);
        let b = collection.create("b", 1991);
        assert_eq!(a.id(), Some(PersonId::new(1)));
        assert_eq!(b.id(), Some(PersonId::new(2)));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let collection = EntityCollection::new();
        let a = collection.create("a", 1990);
        collection.create("b", 1991);
        collection.remove(&a);
        let c = collection.create("c", 1992);
        assert_eq!(c.id(), Some(PersonId::new(3)));
        assert!(collection.find_by_id(PersonId::new(1)).is_none());
    }

    #[test]
    fn all_is_ordered_by_id() {
        let collection = EntityCollection::new();
        collection.create("b", 1990);
        collection.create("a", 1991);
        let names: Vec<_> = collection
            .all()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn all_is_a_snapshot() {
        let collection = EntityCollection::new();
        collection.create("a", 1990);
        let snapshot = collection.all();
        collection.create("b", 1991);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn save_overwrites_existing_entry() {
        let collection = EntityCollection::new();
        let mut person = collection.create("Nolan", 1992);
        person.set_birth_year(1993);
        let saved = collection.save(person.clone());

        assert_eq!(saved, person);
        assert_eq!(collection.len(), 1);
        let stored = collection.find_by_id(PersonId::new(1)).unwrap();
        assert_eq!(stored.birth_year(), 1993);
    }

    #[test]
    fn save_keeps_content_and_populates_id() {
        let collection = EntityCollection::new();
        let saved = collection.save(Person::new("x", 2000));
        assert_eq!(saved.name(), "x");
        assert_eq!(saved.birth_year(), 2000);
        assert!(!saved.is_transient());
    }

    #[test]
    fn resaving_a_removed_person_restores_its_id() {
        let collection = EntityCollection::new();
        let person = collection.create("a", 1990);
        collection.remove(&person);
        collection.save(person.clone());
        assert_eq!(collection.find_by_id(PersonId::new(1)), Some(person));
        let next = collection.create("b", 1991);
        assert_eq!(next.id(), Some(PersonId::new(2)));
    }

    #[test]
    fn removing_unknown_id_is_a_noop() {
        let collection = EntityCollection::new();
        collection.create("a", 1990);
        collection.remove_by_id(PersonId::new(99));
        collection.remove(&Person::new("ghost", 1900));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn listener_fires_on_registration() {
        let collection = EntityCollection::new();
        let calls = counter(&collection);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_mutation_notifies_once() {
        let collection = EntityCollection::new();
        let calls = counter(&collection);

        let person = collection.create("a", 1990);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        collection.save(person.clone());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        collection.remove(&person);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        collection.remove_by_id(PersonId::new(42));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn failing_listener_does_not_block_others() {
        let collection = EntityCollection::new();
        collection.add_listener(|| Err(ListenerError::Failed("nope".into())));
        collection.add_listener(|| panic!("listener bug"));
        let calls = counter(&collection);

        collection.create("a", 1990);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn listener_can_read_collection() {
        let collection = EntityCollection::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_ref = Arc::clone(&seen);
        let handle = collection.clone();
        collection.add_listener(move || {
            seen_ref.lock().unwrap().push(handle.len());
            Ok(())
        });

        collection.create("a", 1990);
        collection.create("b", 1991);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn mutation_inside_listener_gets_its_own_pass() {
        let collection = EntityCollection::new();
        let handle = collection.clone();
        collection.add_listener(move || {
            if handle.len() == 1 {
                handle.create("echo", 2001);
            }
            Ok(())
        });
        let calls = counter(&collection);

        collection.create("a", 1990);
        assert_eq!(collection.len(), 2);
        // registration, the outer pass, then the deferred pass for "echo"
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn each_mutation_inside_listener_gets_one_pass() {
        let collection = EntityCollection::new();
        let handle = collection.clone();
        collection.add_listener(move || {
            if handle.len() == 1 {
                handle.create("echo", 2001);
                handle.create("reply", 2002);
            }
            Ok(())
        });
        let calls = counter(&collection);

        collection.create("a", 1990);
        assert_eq!(collection.len(), 3);
        // registration, the outer pass, then one pass each for "echo" and "reply"
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn stale_listener_removal_inside_pass_returns_false() {
        let collection = EntityCollection::new();
        let stale = collection.add_listener(|| Ok(()));
        assert!(collection.remove_listener(stale));

        let results = Arc::new(Mutex::new(Vec::new()));
        let results_ref = Arc::clone(&results);
        let handle = collection.clone();
        collection.add_listener(move || {
            results_ref
                .lock()
                .unwrap()
                .push(handle.remove_listener(stale));
            Ok(())
        });

        collection.create("a", 1990);
        collection.create("b", 1991);
        assert_eq!(*results.lock().unwrap(), vec![false, false, false]);
        assert_eq!(collection.listener_count(), 1);
    }

    #[test]
    fn listener_can_remove_itself_during_pass() {
        let collection = EntityCollection::new();
        let own_id = Arc::new(Mutex::new(None::<ListenerId>));
        let own_id_ref = Arc::clone(&own_id);
        let removed = Arc::new(Mutex::new(Vec::new()));
        let removed_ref = Arc::clone(&removed);
        let handle = collection.clone();

        let id = collection.add_listener(move || {
            if let Some(id) = *own_id_ref.lock().unwrap() {
                removed_ref.lock().unwrap().push(handle.remove_listener(id));
            }
            Ok(())
        });
        *own_id.lock().unwrap() = Some(id);

        collection.create("a", 1990);
        collection.create("b", 1991);
        assert_eq!(*removed.lock().unwrap(), vec![true]);
        assert_eq!(collection.listener_count(), 0);
    }

    #[test]
    fn exhausted_ids_leave_person_unsaved_without_panicking() {
        let collection = EntityCollection::new();
        let at_ceiling: Person = serde_json::from_str(
            r#"{"id":18446744073709551615,"name":"x","birthYear":1}"#,
        )
        .unwrap();
        collection.save(at_ceiling);
        let calls = counter(&collection);

        let refused = collection.create("y", 2);
        assert!(refused.is_transient());
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.all()[0].id(), Some(PersonId::MAX));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn ids_stay_ahead_of_explicit_ids_below_ceiling() {
        let collection = EntityCollection::new();
        let near_ceiling: Person = serde_json::from_str(
            r#"{"id":18446744073709551614,"name":"x","birthYear":1}"#,
        )
        .unwrap();
        collection.save(near_ceiling);

        let last = collection.create("y", 2);
        assert_eq!(last.id(), Some(PersonId::MAX));
        assert!(collection.create("z", 3).is_transient());
    }

    #[test]
    fn removed_listener_stops_firing() {
        let collection = EntityCollection::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_ref = Arc::clone(&calls);
        let id = collection.add_listener(move || {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(collection.remove_listener(id));
        assert!(!collection.remove_listener(id));
        collection.create("a", 1990);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(collection.listener_count(), 0);
    }

    #[test]
    fn collections_are_independent() {
        let first = EntityCollection::new();
        let second = EntityCollection::new();
        first.create("a", 1990);
        let b = second.create("b", 1991);
        assert_eq!(b.id(), Some(PersonId::first()));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }
}
