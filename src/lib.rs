pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    application_service::ApplicationService, category_service::CategoryService,
    email_service::EmailService, help_service::HelpService, job_service::JobService,
    notification_service::NotificationService, school_service::SchoolService,
    settings_service::SettingsService, skill_service::SkillService,
    student_service::StudentService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub student_service: StudentService,
    pub school_service: SchoolService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub skill_service: SkillService,
    pub category_service: CategoryService,
    pub notification_service: NotificationService,
    pub help_service: HelpService,
    pub settings_service: SettingsService,
    pub email_service: EmailService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let settings_service = SettingsService::new(pool.clone());
        let email_service = EmailService::new(settings_service.clone());

        Self {
            user_service: UserService::new(pool.clone()),
            student_service: StudentService::new(pool.clone()),
            school_service: SchoolService::new(pool.clone()),
            job_service: JobService::new(pool.clone()),
            application_service: ApplicationService::new(pool.clone()),
            skill_service: SkillService::new(pool.clone()),
            category_service: CategoryService::new(pool.clone()),
            notification_service: NotificationService::new(pool.clone()),
            help_service: HelpService::new(pool.clone()),
            settings_service,
            email_service,
            pool,
        }
    }
}
