//! Execution handle and device capability snapshot

use super::Queue;
use crate::error::{Error, Result};

/// Environment variable overriding the number of clusters
pub const ENV_CLUSTER_COUNT: &str = "KERNELGATE_CLUSTER_COUNT";
/// Environment variable overriding the cores per cluster
pub const ENV_CORES_PER_CLUSTER: &str = "KERNELGATE_CORES_PER_CLUSTER";
/// Environment variable capping the clusters a single job may use
pub const ENV_CLUSTER_LIMIT: &str = "KERNELGATE_CLUSTER_LIMIT";

/// Capability information of the bound device.
///
/// This is an immutable snapshot taken when the handle is created. Launch
/// planning only ever reads it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceCapability {
    /// Number of clusters on the device
    pub cluster_count: u32,
    /// Processing cores in each cluster
    pub cores_per_cluster: u32,
    /// Upper bound on clusters usable by one job, if configured
    pub cluster_limit: Option<u32>,
}

impl DeviceCapability {
    /// Create a capability snapshot with no cluster limit
    pub const fn new(cluster_count: u32, cores_per_cluster: u32) -> Self {
        Self {
            cluster_count,
            cores_per_cluster,
            cluster_limit: None,
        }
    }

    /// Cap the number of clusters a single job may occupy
    pub const fn with_cluster_limit(mut self, limit: u32) -> Self {
        self.cluster_limit = Some(limit);
        self
    }

    /// Clusters a single job may use: the device's cluster count, lowered to
    /// the configured limit when one is set.
    pub fn cluster_limit_capability(&self) -> u32 {
        match self.cluster_limit {
            Some(limit) => self.cluster_count.min(limit),
            None => self.cluster_count,
        }
    }

    /// Total processing cores on the device
    pub fn total_cores(&self) -> u32 {
        self.cluster_count.saturating_mul(self.cores_per_cluster)
    }

    /// Default capability with `KERNELGATE_*` environment overrides applied.
    ///
    /// Unparseable or zero values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |name: &str| positive_u32(name, var(name)?);
        let mut capability = Self::default();
        if let Some(count) = positive(ENV_CLUSTER_COUNT) {
            capability.cluster_count = count;
        }
        if let Some(cores) = positive(ENV_CORES_PER_CLUSTER) {
            capability.cores_per_cluster = cores;
        }
        if let Some(limit) = positive(ENV_CLUSTER_LIMIT) {
            capability.cluster_limit = Some(limit);
        }
        capability
    }

    fn check(&self) -> Result<()> {
        if self.cluster_count == 0 {
            return Err(Error::invalid_argument("cluster_count", "must be at least 1"));
        }
        if self.cores_per_cluster == 0 {
            return Err(Error::invalid_argument(
                "cores_per_cluster",
                "must be at least 1",
            ));
        }
        if self.cluster_limit == Some(0) {
            return Err(Error::invalid_argument("cluster_limit", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for DeviceCapability {
    fn default() -> Self {
        Self::new(8, 4)
    }
}

fn positive_u32(name: &str, raw: String) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => {
            log::warn!("ignoring {name}={raw:?}: expected a positive integer");
            None
        }
        Ok(value) => Some(value),
    }
}

/// A bound device execution context.
///
/// Owned by the caller. Operators borrow it for the duration of one call and
/// only read its capability fields; work is submitted to its queue.
#[derive(Debug)]
pub struct Handle {
    capability: DeviceCapability,
    queue: Queue,
}

impl Handle {
    /// Create a handle with its own execution queue
    pub fn new(capability: DeviceCapability) -> Result<Self> {
        capability.check()?;
        let queue = Queue::new()?;
        log::debug!(
            "created handle: {} clusters x {} cores, limit {:?}, queue {}",
            capability.cluster_count,
            capability.cores_per_cluster,
            capability.cluster_limit,
            queue.id()
        );
        Ok(Self { capability, queue })
    }

    /// Create a handle from [`DeviceCapability::from_env`]
    pub fn from_env() -> Result<Self> {
        Self::new(DeviceCapability::from_env())
    }

    /// Device capability snapshot
    #[inline]
    pub fn capability(&self) -> &DeviceCapability {
        &self.capability
    }

    /// Processing cores per cluster
    #[inline]
    pub fn cores_per_cluster(&self) -> u32 {
        self.capability.cores_per_cluster
    }

    /// Execution queue work is submitted to
    #[inline]
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Wait for all submitted work. See [`Queue::synchronize`].
    pub fn synchronize(&self) -> Result<()> {
        self.queue.synchronize()
    }
}
