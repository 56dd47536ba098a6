//! Type definitions and enums.

use std::fmt;

use crate::error::{Error, Result};

/// Category of a native resource, selecting its finalize routine.
///
/// The integer tags match the values host code passes across the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceCategory {
    /// No resource; the handle is empty.
    #[default]
    None,
    /// `rcl_node_t`.
    Node,
    /// `rcl_publisher_t`, finalized with its node.
    Publisher,
    /// `rcl_subscription_t`, finalized with its node.
    Subscription,
    /// `rcl_service_t`, finalized with its node.
    Service,
    /// `rcl_client_t`, finalized with its node.
    Client,
    /// `rcl_timer_t`.
    Timer,
    /// `rosidl_runtime_c__String` buffer; memory release only.
    StringBuffer,
    /// Plain `malloc` allocation; memory release only.
    RawAllocation,
    /// Range sentinel. Never assigned to a live handle.
    Count,
}

impl ResourceCategory {
    /// The eight categories a bound handle can carry.
    pub const LIVE: [ResourceCategory; 8] = [
        ResourceCategory::Node,
        ResourceCategory::Publisher,
        ResourceCategory::Subscription,
        ResourceCategory::Service,
        ResourceCategory::Client,
        ResourceCategory::Timer,
        ResourceCategory::StringBuffer,
        ResourceCategory::RawAllocation,
    ];

    /// Human-readable label shown to host code.
    pub fn label(self) -> &'static str {
        match self {
            ResourceCategory::None | ResourceCategory::Count => "Unknown",
            ResourceCategory::Node => "ROS Node",
            ResourceCategory::Publisher => "ROS Publisher",
            ResourceCategory::Subscription => "ROS Subscription",
            ResourceCategory::Service => "ROS Service",
            ResourceCategory::Client => "ROS Client",
            ResourceCategory::Timer => "ROS Timer",
            ResourceCategory::StringBuffer => "ROS String",
            ResourceCategory::RawAllocation => "Memory",
        }
    }

    /// Whether finalizing this category needs the owning node.
    pub fn requires_owner(self) -> bool {
        matches!(
            self,
            ResourceCategory::Publisher
                | ResourceCategory::Subscription
                | ResourceCategory::Service
                | ResourceCategory::Client
        )
    }

    /// Whether a bound handle can carry this category.
    pub fn is_live(self) -> bool {
        !matches!(self, ResourceCategory::None | ResourceCategory::Count)
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<ResourceCategory> for u32 {
    fn from(category: ResourceCategory) -> u32 {
        match category {
            ResourceCategory::None => 0,
            ResourceCategory::Node => 1,
            ResourceCategory::Publisher => 2,
            ResourceCategory::Subscription => 3,
            ResourceCategory::Service => 4,
            ResourceCategory::Client => 5,
            ResourceCategory::Timer => 6,
            ResourceCategory::StringBuffer => 7,
            ResourceCategory::RawAllocation => 8,
            ResourceCategory::Count => 9,
        }
    }
}

impl TryFrom<u32> for ResourceCategory {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(ResourceCategory::None),
            1 => Ok(ResourceCategory::Node),
            2 => Ok(ResourceCategory::Publisher),
            3 => Ok(ResourceCategory::Subscription),
            4 => Ok(ResourceCategory::Service),
            5 => Ok(ResourceCategory::Client),
            6 => Ok(ResourceCategory::Timer),
            7 => Ok(ResourceCategory::StringBuffer),
            8 => Ok(ResourceCategory::RawAllocation),
            9 => Ok(ResourceCategory::Count),
            _ => Err(Error::InvalidCategory(tag)),
        }
    }
}

/// Options for a host binding.
#[derive(Debug, Clone)]
pub struct BindingOptions {
    /// Class name reported to host code (default: "RclHandle").
    pub class_name: String,
    /// Emit debug events for create, destroy and dismiss (default: true).
    pub log_lifecycle: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            class_name: "RclHandle".to_string(),
            log_lifecycle: true,
        }
    }
}
