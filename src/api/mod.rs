// API routes and handlers

pub mod admin;
pub mod auth;
pub mod coach;
pub mod engagement;
pub mod goals;
pub mod health;
pub mod logs;
pub mod notifications;
pub mod plans;
pub mod profile;
pub mod routes;
pub mod schedules;
