//! Order State Machine
//!
//! Maps `(status, event)` to the next status. Fill completion and the status
//! to restore after a rejected or confirmed pending request are supplied by
//! the caller; everything else is decided by the table below.

use kestrel_core::OrderStatus;

use crate::events::OrderEvent;

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Next status for `event`, or `None` if the transition is illegal
    ///
    /// `previous` is the status held before the order entered a pending
    /// state; `fill_completes` says whether a fill leaves nothing open.
    #[must_use]
    pub fn next_status(
        from: OrderStatus,
        previous: Option<OrderStatus>,
        event: &OrderEvent,
        fill_completes: bool,
    ) -> Option<OrderStatus> {
        use OrderStatus::*;

        let restore = || match from {
            PendingUpdate | PendingCancel => previous.unwrap_or(from),
            _ => from,
        };

        match event {
            OrderEvent::Initialized(_) => None,
            OrderEvent::Denied(_) => matches!(from, Initialized).then_some(Denied),
            OrderEvent::Submitted(_) => matches!(from, Initialized).then_some(Submitted),
            OrderEvent::Accepted(_) => {
                matches!(from, Initialized | Submitted | PendingUpdate | PendingCancel)
                    .then_some(Accepted)
            }
            OrderEvent::Rejected(_) => {
                matches!(from, Submitted | Accepted | PendingUpdate | PendingCancel)
                    .then_some(Rejected)
            }
            OrderEvent::PendingUpdate(_) => {
                matches!(from, Submitted | Accepted | PartiallyFilled | PendingUpdate)
                    .then_some(PendingUpdate)
            }
            OrderEvent::PendingCancel(_) => matches!(
                from,
                Submitted | Accepted | PartiallyFilled | PendingUpdate | PendingCancel
            )
            .then_some(PendingCancel),
            OrderEvent::ModifyRejected(_) | OrderEvent::CancelRejected(_) => matches!(
                from,
                Submitted | Accepted | PartiallyFilled | PendingUpdate | PendingCancel
            )
            .then(restore),
            OrderEvent::Updated(_) => {
                if !Self::is_amendable(from) {
                    return None;
                }
                Some(if from == PendingUpdate { restore() } else { from })
            }
            OrderEvent::Canceled(_) => Self::is_amendable(from).then_some(Canceled),
            OrderEvent::Expired(_) => Self::is_amendable(from).then_some(Expired),
            OrderEvent::Triggered(_) => {
                matches!(
                    from,
                    Initialized | Submitted | Accepted | PendingUpdate | PendingCancel
                )
                .then_some(from)
            }
            OrderEvent::Filled(_) => matches!(
                from,
                Submitted | Accepted | PartiallyFilled | PendingUpdate | PendingCancel
            )
            .then_some(if fill_completes { Filled } else { PartiallyFilled }),
        }
    }

    /// Check if `event` may be applied in `from`
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, event: &OrderEvent) -> bool {
        Self::next_status(from, None, event, false).is_some()
    }

    /// Statuses in which the order can still be amended, canceled or expired
    fn is_amendable(status: OrderStatus) -> bool {
        !status.is_terminal()
    }
}
