//! In-memory warehouse for tests
//!
//! Holds a namespace -> container -> resources map behind a mutex, records
//! every call, and can be told to fail specific operations.

use crate::error::{WarehouseError, WarehouseResult};
use crate::traits::Warehouse;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

type Containers = BTreeMap<String, Vec<String>>;

/// A warehouse call, as recorded by [`MemoryWarehouse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListContainers(String),
    ListResources(String, String),
    DeleteResource(String, String, String),
    DeleteContainer(String, String),
}

#[derive(Debug, Default)]
struct State {
    namespaces: BTreeMap<String, Containers>,
    calls: Vec<Call>,
    failing_namespaces: HashSet<String>,
    failing_listings: HashSet<(String, String)>,
    failing_deletes: HashSet<(String, String, String)>,
    failing_container_deletes: HashSet<(String, String)>,
    permanent_containers: HashSet<(String, String)>,
}

/// In-memory [`Warehouse`] with injectable failures
#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    state: Mutex<State>,
}

impl MemoryWarehouse {
    /// Create an empty warehouse
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> WarehouseResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| WarehouseError::MutexPoisoned(e.to_string()))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a namespace with no containers
    pub fn with_namespace(self, namespace: &str) -> Self {
        self.state()
            .namespaces
            .entry(namespace.to_string())
            .or_default();
        self
    }

    /// Add an empty container
    pub fn with_container(self, namespace: &str, container: &str) -> Self {
        self.state()
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .entry(container.to_string())
            .or_default();
        self
    }

    /// Add resources to a container, creating it if needed
    pub fn with_resources(self, namespace: &str, container: &str, names: &[&str]) -> Self {
        {
            let mut state = self.state();
            let resources = state
                .namespaces
                .entry(namespace.to_string())
                .or_default()
                .entry(container.to_string())
                .or_default();
            for name in names {
                if !resources.iter().any(|r| r == name) {
                    resources.push(name.to_string());
                }
            }
        }
        self
    }

    /// Mark a container as one the warehouse never drops
    pub fn with_permanent_container(self, namespace: &str, container: &str) -> Self {
        self.state()
            .permanent_containers
            .insert((namespace.to_string(), container.to_string()));
        self.with_container(namespace, container)
    }

    /// Make listing containers in `namespace` fail
    pub fn fail_namespace(self, namespace: &str) -> Self {
        self.state().failing_namespaces.insert(namespace.to_string());
        self
    }

    /// Make listing resources in `namespace.container` fail
    pub fn fail_listing(self, namespace: &str, container: &str) -> Self {
        self.state()
            .failing_listings
            .insert((namespace.to_string(), container.to_string()));
        self
    }

    /// Make deleting `namespace.container.name` fail
    pub fn fail_delete(self, namespace: &str, container: &str, name: &str) -> Self {
        self.state().failing_deletes.insert((
            namespace.to_string(),
            container.to_string(),
            name.to_string(),
        ));
        self
    }

    /// Make deleting the container `namespace.container` fail
    pub fn fail_container_delete(self, namespace: &str, container: &str) -> Self {
        self.state()
            .failing_container_deletes
            .insert((namespace.to_string(), container.to_string()));
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Whether any call touched `namespace`
    pub fn touched_namespace(&self, namespace: &str) -> bool {
        self.state().calls.iter().any(|call| match call {
            Call::ListContainers(ns)
            | Call::ListResources(ns, _)
            | Call::DeleteResource(ns, _, _)
            | Call::DeleteContainer(ns, _) => ns == namespace,
        })
    }

    /// Current resources of a container, `None` if the container does not exist
    pub fn resources(&self, namespace: &str, container: &str) -> Option<Vec<String>> {
        self.state()
            .namespaces
            .get(namespace)?
            .get(container)
            .cloned()
    }

    /// Whether the container exists
    pub fn has_container(&self, namespace: &str, container: &str) -> bool {
        self.resources(namespace, container).is_some()
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn list_containers(&self, namespace: &str) -> WarehouseResult<Vec<String>> {
        let mut state = self.lock()?;
        state.calls.push(Call::ListContainers(namespace.to_string()));

        if state.failing_namespaces.contains(namespace) {
            return Err(WarehouseError::AccessDenied(format!("project {}", namespace)));
        }
        state
            .namespaces
            .get(namespace)
            .map(|containers| containers.keys().cloned().collect())
            .ok_or_else(|| WarehouseError::NotFound(format!("project {}", namespace)))
    }

    async fn list_resources(
        &self,
        namespace: &str,
        container: &str,
    ) -> WarehouseResult<Vec<String>> {
        let mut state = self.lock()?;
        state
            .calls
            .push(Call::ListResources(namespace.to_string(), container.to_string()));

        if state
            .failing_listings
            .contains(&(namespace.to_string(), container.to_string()))
        {
            return Err(WarehouseError::Request(format!(
                "list tables in {}.{}",
                namespace, container
            )));
        }
        state
            .namespaces
            .get(namespace)
            .and_then(|containers| containers.get(container))
            .cloned()
            .ok_or_else(|| WarehouseError::NotFound(format!("dataset {}.{}", namespace, container)))
    }

    async fn delete_resource(
        &self,
        namespace: &str,
        container: &str,
        name: &str,
    ) -> WarehouseResult<()> {
        let mut state = self.lock()?;
        state.calls.push(Call::DeleteResource(
            namespace.to_string(),
            container.to_string(),
            name.to_string(),
        ));

        let key = (namespace.to_string(), container.to_string(), name.to_string());
        if state.failing_deletes.contains(&key) {
            return Err(WarehouseError::Request(format!(
                "delete table {}.{}.{}",
                namespace, container, name
            )));
        }

        let resources = state
            .namespaces
            .get_mut(namespace)
            .and_then(|containers| containers.get_mut(container))
            .ok_or_else(|| WarehouseError::NotFound(format!("dataset {}.{}", namespace, container)))?;
        let before = resources.len();
        resources.retain(|r| r != name);
        if resources.len() == before {
            return Err(WarehouseError::NotFound(format!(
                "table {}.{}.{}",
                namespace, container, name
            )));
        }
        Ok(())
    }

    async fn delete_container(&self, namespace: &str, container: &str) -> WarehouseResult<()> {
        let mut state = self.lock()?;
        state
            .calls
            .push(Call::DeleteContainer(namespace.to_string(), container.to_string()));

        if state
            .failing_container_deletes
            .contains(&(namespace.to_string(), container.to_string()))
        {
            return Err(WarehouseError::Request(format!(
                "delete dataset {}.{}",
                namespace, container
            )));
        }

        let containers = state
            .namespaces
            .get_mut(namespace)
            .ok_or_else(|| WarehouseError::NotFound(format!("project {}", namespace)))?;
        match containers.get(container) {
            None => Err(WarehouseError::NotFound(format!(
                "dataset {}.{}",
                namespace, container
            ))),
            Some(resources) if !resources.is_empty() => Err(WarehouseError::Request(format!(
                "dataset {}.{} is not empty",
                namespace, container
            ))),
            Some(_) => {
                containers.remove(container);
                Ok(())
            }
        }
    }

    fn is_permanent_container(&self, namespace: &str, container: &str) -> bool {
        self.state()
            .permanent_containers
            .contains(&(namespace.to_string(), container.to_string()))
    }

    fn warehouse_type(&self) -> &'static str {
        "memory"
    }
}
