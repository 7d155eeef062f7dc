pub mod backend;
pub mod context;
pub mod device;
pub mod error;
pub mod offline;

pub use backend::AudioBackend;
pub use context::{AudioContext, ContextState, Destination, OutputChain, Renderer};
pub use device::{CpalBackend, DeviceConfig};
pub use error::EngineError;
pub use offline::{OfflineBackend, OfflineConfig};
