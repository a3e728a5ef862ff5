mod portfolio;
mod position;
mod transaction;

pub use portfolio::Portfolio;
pub use position::AssetPosition;
pub use transaction::{NewPurchase, PurchaseError, Transaction};
