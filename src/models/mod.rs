pub mod application;
pub mod category;
pub mod help_request;
pub mod job;
pub mod notification;
pub mod school;
pub mod setting;
pub mod skill;
pub mod student;
pub mod user;
