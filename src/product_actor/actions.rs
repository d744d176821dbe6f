use uuid::Uuid;

/// Custom actions for Product entities.
///
/// These run inside the products actor, so each one is a single
/// read-modify-write on the current stock level.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Takes units out of stock for a sale and marks the product with the
    /// checkout that took them.
    ///
    /// Leaves stock untouched and answers `Insufficient` when fewer units
    /// are available than requested.
    DecrementStock { checkout_id: Uuid, quantity: u32 },
    /// Puts units back, but only if this checkout's decrement landed and has
    /// not been released yet. Answers `NotApplied` otherwise, so repeating a
    /// release is harmless.
    ReleaseStock { checkout_id: Uuid, quantity: u32 },
}

/// Results from ProductActions
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    StockLevel(u32),
    Insufficient { available: u32 },
    NotApplied { level: u32 },
}
