/// A single status prepared for display. The list of items is built once
/// from the fetched statuses and stays fixed for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub display_name: String,
    pub body: String,
    pub url: String,
}
