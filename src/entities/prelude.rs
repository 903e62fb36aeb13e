pub use super::emergency_contacts::Entity as EmergencyContacts;
pub use super::gas_alerts::Entity as GasAlerts;
pub use super::gas_readings::Entity as GasReadings;
pub use super::gas_regulators::Entity as GasRegulators;
pub use super::gas_sensors::Entity as GasSensors;
pub use super::maintenance_schedules::Entity as MaintenanceSchedules;
pub use super::pipeline_sections::Entity as PipelineSections;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::users::Entity as Users;
