pub mod alert;
pub mod contact;
pub mod pipeline;
pub mod regulator;
pub mod sensor;
pub mod user;
