pub mod add_complaint;
pub mod complaint_detail;
pub mod complaint_list;
pub mod login;
pub mod main_window;
pub mod notifications;
pub mod onboarding;
pub mod profile;
pub mod register;
