//! List view: a row projection of the collection pushed to a surface.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use collection::{EntityCollection, ListenerError, ListenerId};

use crate::Result;
use crate::config::ListViewConfig;
use crate::row::Row;
use crate::surface::RenderSurface;

struct ViewState<S> {
    surface: S,
    rows: Vec<Row>,
    refreshes: usize,
}

/// Shared between the view handle and the listener it registers.
struct ViewCore<S> {
    collection: EntityCollection,
    config: Arc<ListViewConfig>,
    state: Arc<Mutex<ViewState<S>>>,
}

impl<S> Clone for ViewCore<S> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: RenderSurface> ViewCore<S> {
    #[tracing::instrument(skip(self), fields(container = %self.config.container_id))]
    fn refresh(&self) -> Result<()> {
        let rows: Vec<Row> = self
            .collection
            .all()
            .iter()
            .filter_map(|person| {
                Row::project(
                    person,
                    &self.config.fields,
                    &self.config.remove_action_class,
                )
            })
            .collect();

        let mut state = self.lock_state();
        state.surface.render(&self.config.container_id, &rows)?;
        state.refreshes += 1;
        tracing::debug!(rows = rows.len(), refreshes = state.refreshes, "view refreshed");
        state.rows = rows;
        metrics::counter!("views_refreshes").increment(1);

        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A row-oriented view of an [`EntityCollection`].
///
/// Construction registers the view as a listener, which renders it once
/// immediately. After that every mutation of the collection re-renders the
/// full row list into the configured container before the mutating call
/// returns. Dropping the view unregisters it.
pub struct ListView<S> {
    core: ViewCore<S>,
    listener: ListenerId,
}

impl<S: RenderSurface + Send + 'static> ListView<S> {
    /// Creates a view over `collection` and renders it into `surface`.
    pub fn new(collection: &EntityCollection, config: ListViewConfig, surface: S) -> Self {
        let core = ViewCore {
            collection: collection.clone(),
            config: Arc::new(config),
            state: Arc::new(Mutex::new(ViewState {
                surface,
                rows: Vec::new(),
                refreshes: 0,
            })),
        };

        let listener_core = core.clone();
        let listener = collection.add_listener(move || {
            listener_core
                .refresh()
                .map_err(|err| ListenerError::Render(err.to_string()))
        });

        tracing::info!(
            container = %core.config.container_id,
            %listener,
            "list view attached"
        );

        Self { core, listener }
    }
}

impl<S: RenderSurface> ListView<S> {
    /// Re-reads the collection and renders every row.
    pub fn refresh(&self) -> Result<()> {
        self.core.refresh()
    }

    /// Returns the rows from the last successful render.
    pub fn rows(&self) -> Vec<Row> {
        self.core.lock_state().rows.clone()
    }

    /// Returns how many renders have completed.
    pub fn refresh_count(&self) -> usize {
        self.core.lock_state().refreshes
    }

    pub fn config(&self) -> &ListViewConfig {
        &self.core.config
    }

    /// Runs `f` against the rendering surface. `f` must not mutate the
    /// collection; the surface stays locked while it runs.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.core.lock_state().surface)
    }
}

impl<S> Drop for ListView<S> {
    fn drop(&mut self) {
        self.core.collection.remove_listener(self.listener);
    }
}
