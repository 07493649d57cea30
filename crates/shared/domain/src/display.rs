//! Status presentation: labels, badge classes and colours.

use crate::profile::PaymentStatus;

/// Badge colours used by the admin resident table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColors {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

/// Spanish label shown on status badges
pub fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "Pagado",
        PaymentStatus::Pending => "Pendiente",
        PaymentStatus::Overdue => "Vencido",
    }
}

/// CSS class of the resident dashboard badge
pub fn status_class(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "status-paid",
        PaymentStatus::Pending => "status-pending",
        PaymentStatus::Overdue => "status-error",
    }
}

/// Green for paid, amber for pending, rose for overdue
pub fn status_colors(status: PaymentStatus) -> StatusColors {
    match status {
        PaymentStatus::Paid => StatusColors {
            background: "rgba(16, 185, 129, 0.2)",
            text: "#34d399",
            border: "rgba(16, 185, 129, 0.3)",
        },
        PaymentStatus::Pending => StatusColors {
            background: "rgba(245, 158, 11, 0.2)",
            text: "#fbbf24",
            border: "rgba(245, 158, 11, 0.3)",
        },
        PaymentStatus::Overdue => StatusColors {
            background: "rgba(244, 63, 94, 0.2)",
            text: "#fb7185",
            border: "rgba(244, 63, 94, 0.3)",
        },
    }
}
