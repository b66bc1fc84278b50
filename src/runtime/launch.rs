//! Launch configuration planning
//!
//! Turns the handle's capability snapshot into a grid shape and kernel kind.
//! Planning is a pure function of the capability; it never looks at data.

use super::Handle;
use std::fmt;

/// How a launched job is mapped onto the device's processing units
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KernelKind {
    /// Tasks gang-scheduled one cluster at a time
    Union1,
}

impl KernelKind {
    /// Clusters occupied together by one scheduling unit
    pub const fn clusters(self) -> u32 {
        match self {
            Self::Union1 => 1,
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNION{}", self.clusters())
    }
}

/// Parameters a kernel is launched with
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LaunchConfig {
    /// Grid dimensions `(x, y, z)`
    pub grid: (u32, u32, u32),
    /// Scheduling kind
    pub kind: KernelKind,
}

impl LaunchConfig {
    /// Total number of parallel workers the grid describes
    pub fn parallelism(&self) -> usize {
        let (x, y, z) = self.grid;
        (x as usize) * (y as usize) * (z as usize)
    }
}

impl fmt::Display for LaunchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.grid;
        write!(f, "[{x}, {y}, {z}] {}", self.kind)
    }
}

/// Plan a launch for an operator over `element_count` elements.
///
/// The grid is `(cores_per_cluster, cluster_limit_capability, 1)` with
/// [`KernelKind::Union1`], independent of `element_count`.
pub fn plan(handle: &Handle, element_count: usize) -> LaunchConfig {
    debug_assert!(element_count > 0, "empty launches are skipped before planning");
    let capability = handle.capability();
    let config = LaunchConfig {
        grid: (
            capability.cores_per_cluster,
            capability.cluster_limit_capability(),
            1,
        ),
        kind: KernelKind::Union1,
    };
    log::debug!("launch {config} for {element_count} elements");
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::DeviceCapability;

    #[test]
    fn grid_follows_capability() {
        let handle = Handle::new(DeviceCapability::new(6, 4).with_cluster_limit(3)).unwrap();
        let config = plan(&handle, 1000);
        assert_eq!(config.grid, (4, 3, 1));
        assert_eq!(config.kind, KernelKind::Union1);
        assert_eq!(config.parallelism(), 12);
        assert_eq!(config.to_string(), "[4, 3, 1] UNION1");
    }

    #[test]
    fn grid_ignores_element_count() {
        let handle = Handle::new(DeviceCapability::default()).unwrap();
        assert_eq!(plan(&handle, 1), plan(&handle, 1 << 20));
    }

    #[test]
    fn kind_names() {
        assert_eq!(KernelKind::Union1.to_string(), "UNION1");
        assert_eq!(KernelKind::Union1.clusters(), 1);
    }
}
