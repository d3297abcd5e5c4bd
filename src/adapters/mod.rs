// Adapters layer: turning files on disk into raw tables, and locating the
// input file among the data directory listing.

pub mod discovery;
pub mod tabular;
