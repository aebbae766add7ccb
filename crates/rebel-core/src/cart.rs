use crate::catalog::Product;

/// Products added during this session. Owned by whoever renders the
/// storefront; nothing is persisted and there is no checkout.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: &Product) {
        self.items.push(product.clone());
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.items.iter().map(|p| p.price).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
