pub mod application_service;
pub mod category_service;
pub mod email_service;
pub mod export_service;
pub mod help_service;
pub mod import_service;
pub mod job_service;
pub mod notification_service;
pub mod school_service;
pub mod settings_service;
pub mod skill_service;
pub mod student_service;
pub mod user_service;
