// crates/catalog/src/lib.rs
//! Book collection state controller
//!
//! [`CatalogController`] mediates between UI intents (search, filter, sort,
//! paginate and the add/edit/delete dialogs) and the remote collection behind
//! a [`BookGateway`](libris_network::BookGateway). It owns the only copy of
//! the [`CollectionView`] and publishes snapshots through a watch channel.
//!
//! # Example
//!
//! ```rust,no_run
//! use libris_catalog::CatalogController;
//! use libris_config::Config;
//!
//! # async fn demo() -> Result<(), libris_core::CatalogError> {
//! let controller = CatalogController::from_config(&Config::default())?;
//! controller.load().await;
//! controller.set_search_term("dune");
//!
//! let view = controller.snapshot();
//! println!("{} of {} books", view.items.len(), view.total);
//! # Ok(())
//! # }
//! ```

mod controller;
mod view;

pub use controller::{CatalogController, ControllerConfig};
pub use view::{CollectionView, DialogKind};
