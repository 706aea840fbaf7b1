pub use anyhow::{Context, Result, bail};
pub use log::{debug, error, warn};
