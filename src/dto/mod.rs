pub mod auth_dto;
pub mod patient_dto;
