use std::collections::HashMap;
use std::hash::Hash;
use std::fmt::{Debug, Display};
use std::path::PathBuf;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any stored record must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Name of the collection, used for log fields and snapshot file names
    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;

    /// Construct the full record from the store-assigned ID and the payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> { Ok(()) }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

/// Errors surfaced by the store itself, independent of the collection.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Resolved once the actor has loaded its snapshot and is accepting requests.
/// Carries the number of records loaded.
pub type Ready = oneshot::Receiver<Result<usize, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    // insertion order, so List answers in the order records were created
    order: Vec<T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    snapshot: Option<PathBuf>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            next_id_fn: Box::new(next_id_fn),
            snapshot: None,
        };
        let client = ResourceClient { sender };
        (actor, client)
    }

    /// Persist the collection as `<dir>/<collection>.json`, loading it on start.
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(dir.into().join(format!("{}.json", T::COLLECTION)));
        self
    }

    /// Spawns the actor loop. The returned [`Ready`] resolves exactly once,
    /// after the snapshot (if any) has been loaded.
    pub fn spawn(self) -> (JoinHandle<()>, Ready) {
        let (ready_tx, ready_rx) = oneshot::channel();
        let handle = tokio::spawn(self.run(ready_tx));
        (handle, ready_rx)
    }

    #[instrument(name = "resource_actor", fields(collection = T::COLLECTION), skip_all)]
    pub async fn run(mut self, ready: oneshot::Sender<Result<usize, FrameworkError>>) {
        match self.load().await {
            Ok(count) => {
                info!(records = count, "Collection ready");
                let _ = ready.send(Ok(count));
            }
            Err(e) => {
                error!(error = %e, "Failed to load collection");
                let _ = ready.send(Err(e));
                return;
            }
        }

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload).await);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let items = self.order.iter()
                        .filter_map(|id| self.store.get(id).cloned())
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch).await);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id).await);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action).await);
                }
            }
        }

        info!("Channel closed, actor stopped");
    }

    async fn handle_create(&mut self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError> {
        let mut id = (self.next_id_fn)();
        while self.store.contains_key(&id) {
            id = (self.next_id_fn)();
        }
        let mut item = T::from_create(id.clone(), payload).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;

        self.store.insert(id.clone(), item);
        self.order.push(id.clone());
        if let Err(e) = self.persist().await {
            self.store.remove(&id);
            self.order.pop();
            return Err(e);
        }
        debug!(id = %id, "Created");
        Ok(id)
    }

    async fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let Some(item) = self.store.get_mut(&id) else {
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        let previous = item.clone();
        if let Err(e) = item.on_update(patch) {
            *item = previous;
            return Err(FrameworkError::Rejected(e));
        }
        let updated = item.clone();

        if let Err(e) = self.persist().await {
            self.store.insert(id, previous);
            return Err(e);
        }
        Ok(updated)
    }

    async fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        let Some(item) = self.store.get(&id) else {
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        item.on_delete().map_err(FrameworkError::Rejected)?;

        let position = self.order.iter().position(|k| k == &id);
        let removed = self.store.remove(&id);
        if let Some(pos) = position {
            self.order.remove(pos);
        }
        if let Err(e) = self.persist().await {
            if let Some(item) = removed {
                self.store.insert(id.clone(), item);
                self.order.insert(position.unwrap_or(self.order.len()), id);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let Some(item) = self.store.get_mut(&id) else {
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        let previous = item.clone();
        let result = match item.handle_action(action) {
            Ok(result) => result,
            Err(e) => {
                *item = previous;
                return Err(FrameworkError::Rejected(e));
            }
        };

        if let Err(e) = self.persist().await {
            self.store.insert(id, previous);
            return Err(e);
        }
        Ok(result)
    }

    async fn load(&mut self) -> Result<usize, FrameworkError> {
        let Some(path) = &self.snapshot else {
            return Ok(0);
        };
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(FrameworkError::Persistence(format!("{}: {}", path.display(), e))),
        };
        let items: Vec<T> = serde_json::from_slice(&bytes)
            .map_err(|e| FrameworkError::Persistence(format!("{}: {}", path.display(), e)))?;
        for item in items {
            let id = item.id().clone();
            if self.store.insert(id.clone(), item).is_none() {
                self.order.push(id);
            } else {
                warn!(id = %id, "Duplicate id in snapshot, keeping the later record");
            }
        }
        Ok(self.order.len())
    }

    async fn persist(&self) -> Result<(), FrameworkError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let items: Vec<&T> = self.order.iter().filter_map(|id| self.store.get(id)).collect();
        let json = serde_json::to_vec_pretty(&items)
            .map_err(|e| FrameworkError::Persistence(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        let io_err = |e: std::io::Error| FrameworkError::Persistence(format!("{}: {}", path.display(), e));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        Ok(())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(build(respond_to))
            .await.map_err(|_| FrameworkError::Unavailable("Actor closed".to_string()))?;
        response.await.map_err(|_| FrameworkError::Unavailable("Actor dropped".to_string()))?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
