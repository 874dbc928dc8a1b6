//! At most one dialog is open at a time; opening another replaces it.

use crate::resources::customers::Customer;
use crate::resources::orders::Order;

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    InventoryReport,
    NewMaterial,
    NewAdjustment,
    SearchAdjustment,
    Replenishment,
    FuelReset,
    TripsReport,
    EditPendingTrip { trip_id: i64 },
    EditTripDate { trip_id: i64, date: String },
    ViewCustomer { customer_id: i64 },
    /// `None` opens the form empty, for creation.
    CustomerForm { customer: Option<Box<Customer>> },
    DeleteCustomer { customer: Box<Customer> },
    ViewOrder { order_id: i64 },
    OrderForm { order: Option<Box<Order>> },
    DeleteOrder { order: Box<Order> },
    OrderStatus { order: Box<Order> },
    AssignOrder { order: Box<Order> },
}

/// Payload-free identity of a [`Dialog`], for `is_open` checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    InventoryReport,
    NewMaterial,
    NewAdjustment,
    SearchAdjustment,
    Replenishment,
    FuelReset,
    TripsReport,
    EditPendingTrip,
    EditTripDate,
    ViewCustomer,
    CustomerForm,
    DeleteCustomer,
    ViewOrder,
    OrderForm,
    DeleteOrder,
    OrderStatus,
    AssignOrder,
}

impl Dialog {
    pub fn kind(&self) -> DialogKind {
        match self {
            Dialog::InventoryReport => DialogKind::InventoryReport,
            Dialog::NewMaterial => DialogKind::NewMaterial,
            Dialog::NewAdjustment => DialogKind::NewAdjustment,
            Dialog::SearchAdjustment => DialogKind::SearchAdjustment,
            Dialog::Replenishment => DialogKind::Replenishment,
            Dialog::FuelReset => DialogKind::FuelReset,
            Dialog::TripsReport => DialogKind::TripsReport,
            Dialog::EditPendingTrip { .. } => DialogKind::EditPendingTrip,
            Dialog::EditTripDate { .. } => DialogKind::EditTripDate,
            Dialog::ViewCustomer { .. } => DialogKind::ViewCustomer,
            Dialog::CustomerForm { .. } => DialogKind::CustomerForm,
            Dialog::DeleteCustomer { .. } => DialogKind::DeleteCustomer,
            Dialog::ViewOrder { .. } => DialogKind::ViewOrder,
            Dialog::OrderForm { .. } => DialogKind::OrderForm,
            Dialog::DeleteOrder { .. } => DialogKind::DeleteOrder,
            Dialog::OrderStatus { .. } => DialogKind::OrderStatus,
            Dialog::AssignOrder { .. } => DialogKind::AssignOrder,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogStore {
    open: Option<Dialog>,
}

impl DialogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `dialog`, closing whichever one was open.
    pub fn open(&mut self, dialog: Dialog) {
        self.open = Some(dialog);
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn current(&self) -> Option<&Dialog> {
        self.open.as_ref()
    }

    pub fn is_open(&self, kind: DialogKind) -> bool {
        self.open.as_ref().is_some_and(|d| d.kind() == kind)
    }

    /// Close and hand back the open dialog.
    pub fn take(&mut self) -> Option<Dialog> {
        self.open.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_replaces_current_dialog() {
        let mut store = DialogStore::new();
        assert!(store.current().is_none());

        store.open(Dialog::FuelReset);
        assert!(store.is_open(DialogKind::FuelReset));

        store.open(Dialog::EditTripDate {
            trip_id: 12,
            date: "2024-05-03".into(),
        });
        assert!(!store.is_open(DialogKind::FuelReset));
        assert!(store.is_open(DialogKind::EditTripDate));
        assert_eq!(
            store.current(),
            Some(&Dialog::EditTripDate {
                trip_id: 12,
                date: "2024-05-03".into()
            })
        );

        store.close();
        assert!(store.current().is_none());
        assert!(!store.is_open(DialogKind::EditTripDate));
    }

    #[test]
    fn customer_form_carries_optional_payload() {
        let mut store = DialogStore::new();
        store.open(Dialog::CustomerForm { customer: None });
        assert!(store.is_open(DialogKind::CustomerForm));

        match store.take() {
            Some(Dialog::CustomerForm { customer }) => assert!(customer.is_none()),
            other => panic!("unexpected dialog {other:?}"),
        }
        assert!(store.current().is_none());
    }
}
