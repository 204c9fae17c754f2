mod command;
mod device;
mod device_id;
mod sensor_reading;
mod user;

pub use command::CommandMessage;
pub use device::{Device, DeviceTable};
pub use device_id::DeviceId;
pub use sensor_reading::{NewSensorReading, SensorReading, SensorReadingTable};
pub use user::{Role, User, UserTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The dependencies of the table
    fn dependencies(&self) -> Vec<&'static str>;
}
