//! Trade reconciliation and tariff policy logic lives here.

pub mod catalog;
pub mod entities;
pub mod join;
pub mod names;
pub mod reconcile;

#[allow(unused_imports)]
pub use catalog::{CatalogError, TariffCatalog};
#[allow(unused_imports)]
pub use entities::{CountryCode, JoinedRow, PolicyCategory, TariffEntry, TradeRecord};
#[allow(unused_imports)]
pub use join::{join_policies, totals, TradeTotals};
#[allow(unused_imports)]
pub use names::normalize;
#[allow(unused_imports)]
pub use reconcile::{merge_flows, FlowRow};
