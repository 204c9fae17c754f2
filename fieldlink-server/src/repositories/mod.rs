mod device;
mod sensor_reading;
mod user;

pub use device::DeviceRepository;
pub use sensor_reading::SensorReadingRepository;
pub use user::UserRepository;
