//! Domain events

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    Selection(SelectionEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEvent {
    Seeded { product_id: String, variant_id: Option<String>, from_query: bool },
    Resolved { product_id: String, variant_id: String },
    Snapped { product_id: String, key: String, requested: String, variant_id: String },
    Unresolved { product_id: String, key: String, value: String },
}
