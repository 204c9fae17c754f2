mod device_handle;
mod sensor_handle;
mod sse_handle;

pub use device_handle::*;
pub use sensor_handle::*;
pub use sse_handle::*;
