//! Appointment status rules
//!
//! `Pending -> Confirmed -> Completed` is driven by the payment lifecycle.
//! `Cancelled` is only ever set by an explicit request, and only from an open
//! appointment. Each function here answers "what should the appointment
//! become" for one kind of event and returns `None` when nothing changes.

use crate::domain::{AppointmentStatus, PaymentStatus};

/// Statuses a user may move an appointment to directly
pub fn manual_targets(current: AppointmentStatus) -> &'static [AppointmentStatus] {
    match current {
        AppointmentStatus::Pending | AppointmentStatus::Confirmed => &[AppointmentStatus::Cancelled],
        AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
    }
}

/// Status stored for a new booking
///
/// A new appointment starts Pending. Only Cancelled may be requested up front;
/// any other requested value is dropped.
pub fn initial_status(requested: Option<AppointmentStatus>) -> AppointmentStatus {
    match requested {
        Some(AppointmentStatus::Cancelled) => AppointmentStatus::Cancelled,
        _ => AppointmentStatus::Pending,
    }
}

/// Outcome of a status submitted with an appointment edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDecision {
    /// Status that will be stored
    pub status: AppointmentStatus,
    /// The requested status, when it was not allowed and has been dropped
    pub discarded: Option<AppointmentStatus>,
}

/// Decide what happens to a status submitted with an appointment edit
///
/// Disallowed requests are not errors: the current status is kept and the
/// request is reported back as discarded.
pub fn resolve_manual_status(
    current: AppointmentStatus,
    requested: Option<AppointmentStatus>,
) -> StatusDecision {
    match requested {
        Some(target) if target == current => StatusDecision {
            status: current,
            discarded: None,
        },
        Some(target) if manual_targets(current).contains(&target) => StatusDecision {
            status: target,
            discarded: None,
        },
        Some(target) => StatusDecision {
            status: current,
            discarded: Some(target),
        },
        None => StatusDecision {
            status: current,
            discarded: None,
        },
    }
}

/// A payment was recorded against the appointment
pub fn on_payment_recorded(
    current: AppointmentStatus,
    payment: PaymentStatus,
) -> Option<AppointmentStatus> {
    match (current, payment) {
        (AppointmentStatus::Pending, PaymentStatus::Unpaid) => Some(AppointmentStatus::Confirmed),
        (AppointmentStatus::Pending, PaymentStatus::Paid) => Some(AppointmentStatus::Completed),
        // Confirmed without a payment happens after an unpaid payment was deleted
        (AppointmentStatus::Confirmed, PaymentStatus::Paid) => Some(AppointmentStatus::Completed),
        _ => None,
    }
}

/// An existing payment was edited or marked paid
///
/// A payment left Paid always completes its appointment, so a Cancelled
/// appointment is revived to Completed.
pub fn on_payment_revised(
    current: AppointmentStatus,
    before: PaymentStatus,
    after: PaymentStatus,
) -> Option<AppointmentStatus> {
    match (before, after) {
        (_, PaymentStatus::Paid) if current != AppointmentStatus::Completed => {
            Some(AppointmentStatus::Completed)
        }
        (PaymentStatus::Paid, PaymentStatus::Unpaid) if current == AppointmentStatus::Completed => {
            Some(AppointmentStatus::Confirmed)
        }
        _ => None,
    }
}

/// A payment was deleted
pub fn on_payment_deleted(
    current: AppointmentStatus,
    deleted: PaymentStatus,
) -> Option<AppointmentStatus> {
    match deleted {
        PaymentStatus::Paid if current != AppointmentStatus::Pending => {
            Some(AppointmentStatus::Pending)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use AppointmentStatus::{Cancelled, Completed, Confirmed, Pending};
    use PaymentStatus::{Paid, Unpaid};

    #[test_case(None, Pending ; "default")]
    #[test_case(Some(Confirmed), Pending ; "confirmed dropped")]
    #[test_case(Some(Completed), Pending ; "completed dropped")]
    #[test_case(Some(Cancelled), Cancelled ; "cancelled honoured")]
    fn test_initial_status(requested: Option<AppointmentStatus>, expected: AppointmentStatus) {
        assert_eq!(initial_status(requested), expected);
    }

    #[test_case(Pending, Some(Cancelled), Cancelled, None ; "cancel pending")]
    #[test_case(Confirmed, Some(Cancelled), Cancelled, None ; "cancel confirmed")]
    #[test_case(Pending, Some(Confirmed), Pending, Some(Confirmed) ; "manual confirm dropped")]
    #[test_case(Confirmed, Some(Completed), Confirmed, Some(Completed) ; "manual complete dropped")]
    #[test_case(Completed, Some(Cancelled), Completed, Some(Cancelled) ; "completed is terminal")]
    #[test_case(Cancelled, Some(Pending), Cancelled, Some(Pending) ; "cancelled is terminal")]
    #[test_case(Confirmed, Some(Confirmed), Confirmed, None ; "unchanged")]
    #[test_case(Completed, None, Completed, None ; "not submitted")]
    fn test_resolve_manual_status(
        current: AppointmentStatus,
        requested: Option<AppointmentStatus>,
        status: AppointmentStatus,
        discarded: Option<AppointmentStatus>,
    ) {
        assert_eq!(
            resolve_manual_status(current, requested),
            StatusDecision { status, discarded }
        );
    }

    #[test_case(Pending, Unpaid, Some(Confirmed) ; "unpaid confirms")]
    #[test_case(Pending, Paid, Some(Completed) ; "paid completes")]
    #[test_case(Confirmed, Paid, Some(Completed) ; "orphaned confirmed completes")]
    #[test_case(Confirmed, Unpaid, None ; "orphaned confirmed stays")]
    #[test_case(Cancelled, Paid, None ; "cancelled untouched")]
    #[test_case(Completed, Unpaid, None ; "completed untouched")]
    fn test_on_payment_recorded(
        current: AppointmentStatus,
        payment: PaymentStatus,
        expected: Option<AppointmentStatus>,
    ) {
        assert_eq!(on_payment_recorded(current, payment), expected);
    }

    #[test_case(Confirmed, Unpaid, Paid, Some(Completed) ; "settled")]
    #[test_case(Cancelled, Unpaid, Paid, Some(Completed) ; "settled after cancel")]
    #[test_case(Cancelled, Paid, Paid, Some(Completed) ; "paid edit after cancel")]
    #[test_case(Completed, Paid, Paid, None ; "already complete")]
    #[test_case(Completed, Paid, Unpaid, Some(Confirmed) ; "reopened")]
    #[test_case(Confirmed, Unpaid, Unpaid, None ; "amount edit only")]
    fn test_on_payment_revised(
        current: AppointmentStatus,
        before: PaymentStatus,
        after: PaymentStatus,
        expected: Option<AppointmentStatus>,
    ) {
        assert_eq!(on_payment_revised(current, before, after), expected);
    }

    #[test_case(Completed, Paid, Some(Pending) ; "paid deletion reverts")]
    #[test_case(Cancelled, Paid, Some(Pending) ; "paid deletion reverts cancelled")]
    #[test_case(Confirmed, Unpaid, None ; "unpaid deletion keeps status")]
    #[test_case(Pending, Paid, None ; "already pending")]
    fn test_on_payment_deleted(
        current: AppointmentStatus,
        deleted: PaymentStatus,
        expected: Option<AppointmentStatus>,
    ) {
        assert_eq!(on_payment_deleted(current, deleted), expected);
    }

    #[test]
    fn test_manual_targets() {
        assert_eq!(manual_targets(Pending), &[Cancelled]);
        assert!(manual_targets(Completed).is_empty());
    }
}
