/// State management module
///
/// This module handles everything on the persistence side of the core:
/// - Catalog database for projects and photos (store.rs)
/// - Shared record structures (data.rs)
/// - The ordered series list and its navigation cursor (series.rs)
/// - User-tunable settings with JSON persistence (settings.rs)

pub mod data;
pub mod series;
pub mod settings;
pub mod store;
