pub mod builtins;
mod clike;
mod css;
pub mod cycles;
pub mod extract;
pub mod fingerprint;
mod go;
pub mod graph;
pub mod issues;
mod js;
pub mod manifests;
pub mod metrics;
mod py;
pub(crate) mod regexes;
pub mod report;
pub mod resolvers;
pub mod risk;
mod runner;
mod rust;
mod scan;

pub use clike::CExtractor;
pub use css::CssExtractor;
pub use go::GoExtractor;
pub use js::JsExtractor;
pub use py::PythonExtractor;
pub use runner::{AnalysisInput, Analyzer};
pub use rust::RustExtractor;
