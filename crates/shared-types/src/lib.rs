pub mod types;

pub use types::{ClauseFault, Finding, ScanResult};
