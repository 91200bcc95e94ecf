use std::collections::HashMap;

use super::row::OrderRow;

/// Rows sharing an order identifier, in file order.
#[derive(Debug, Clone)]
pub struct OrderGroup {
    pub order_id: String,
    pub rows: Vec<OrderRow>,
}

/// Mapping from order identifier to its rows. Groups keep the order in
/// which their identifiers first appeared.
#[derive(Debug, Default)]
pub struct OrderGroups {
    groups: Vec<OrderGroup>,
    index: HashMap<String, usize>,
}

impl OrderGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: OrderRow) {
        match self.index.get(&row.order_id) {
            Some(&i) => self.groups[i].rows.push(row),
            None => {
                self.index.insert(row.order_id.clone(), self.groups.len());
                self.groups.push(OrderGroup {
                    order_id: row.order_id.clone(),
                    rows: vec![row],
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, order_id: &str) -> Option<&OrderGroup> {
        self.index.get(order_id).map(|&i| &self.groups[i])
    }
}

impl IntoIterator for OrderGroups {
    type Item = OrderGroup;
    type IntoIter = std::vec::IntoIter<OrderGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl FromIterator<OrderRow> for OrderGroups {
    fn from_iter<I: IntoIterator<Item = OrderRow>>(iter: I) -> Self {
        let mut groups = Self::new();
        for row in iter {
            groups.insert(row);
        }
        groups
    }
}
