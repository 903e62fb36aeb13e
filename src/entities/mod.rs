pub mod prelude;

pub mod emergency_contacts;
pub mod gas_alerts;
pub mod gas_readings;
pub mod gas_regulators;
pub mod gas_sensors;
pub mod maintenance_schedules;
pub mod pipeline_sections;
pub mod user_profiles;
pub mod users;
