// Business logic services

pub mod assignment_service;
pub mod backup_service;
pub mod check_in_service;
pub mod diet_plan_service;
pub mod email_service;
pub mod goal_service;
pub mod log_service;
pub mod message_service;
pub mod notification_service;
pub mod plan_generator;
pub mod profile_service;
pub mod schedule_service;
pub mod system_log_service;
pub mod user_service;
pub mod workout_plan_service;

pub use assignment_service::AssignmentService;
pub use backup_service::{BackupResult, BackupService};
pub use check_in_service::CheckInService;
pub use diet_plan_service::DietPlanService;
pub use email_service::EmailService;
pub use goal_service::GoalService;
pub use log_service::LogService;
pub use message_service::MessageService;
pub use notification_service::NotificationService;
pub use profile_service::ProfileService;
pub use schedule_service::ScheduleService;
pub use system_log_service::SystemLogService;
pub use user_service::UserService;
pub use workout_plan_service::WorkoutPlanService;
