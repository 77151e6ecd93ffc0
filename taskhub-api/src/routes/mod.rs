/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, and profile endpoints
/// - `tasks`: Personal task endpoints
/// - `categories`: Category endpoints
/// - `groups`: Group and membership endpoints
/// - `group_tasks`: Group task endpoints
/// - `notifications`: Notification endpoints

pub mod auth;
pub mod categories;
pub mod group_tasks;
pub mod groups;
pub mod health;
pub mod notifications;
pub mod tasks;
