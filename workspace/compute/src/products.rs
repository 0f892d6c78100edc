use model::entities::product;

/// Whether a product is at or below its low-stock threshold.
///
/// Products without a threshold never count as low.
pub fn is_low_stock(product: &product::Model) -> bool {
    product
        .low_stock_threshold
        .is_some_and(|threshold| product.current_stock <= threshold)
}

/// Selects products running low on stock, keeping input order.
pub fn evaluate_low_stock(products: &[product::Model]) -> Vec<product::Model> {
    products.iter().filter(|p| is_low_stock(p)).cloned().collect()
}
