//! State machine for product publishing
//!
//! `unpublished → publishing → published`, with `publishing → unpublished`
//! when the Graph API fails before anything went live. A claim left in
//! `publishing` by a crashed request can be taken over once it is stale.
//! `published` is terminal.

use shoppost_common::StateError;

use crate::domain::entities::ProductStatus;

/// Events that move a product through its publishing lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishEvent {
    /// A publish request claims the product
    Begin,
    /// A publish request takes over a stale claim
    Reclaim,
    /// The post is live and recorded
    Succeed,
    /// The Graph API failed before the post went live
    Abort,
}

impl std::fmt::Display for PublishEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Begin => write!(f, "begin"),
            Self::Reclaim => write!(f, "reclaim"),
            Self::Succeed => write!(f, "succeed"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

impl ProductStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [ProductStatus] {
        match self {
            Self::Unpublished => &[Self::Publishing],
            Self::Publishing => &[Self::Publishing, Self::Published, Self::Unpublished],
            Self::Published => &[],
        }
    }
}

/// Publish state machine
pub struct PublishStateMachine;

impl PublishStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: ProductStatus,
        event: PublishEvent,
    ) -> Result<ProductStatus, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (current, event) {
            (ProductStatus::Unpublished, PublishEvent::Begin) => ProductStatus::Publishing,
            (ProductStatus::Publishing, PublishEvent::Reclaim) => ProductStatus::Publishing,
            (ProductStatus::Publishing, PublishEvent::Succeed) => ProductStatus::Published,
            (ProductStatus::Publishing, PublishEvent::Abort) => ProductStatus::Unpublished,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: ProductStatus, event: PublishEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
