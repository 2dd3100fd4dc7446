// Interview scheduling: calendar event creation, candidate notification,
// meeting-link generation. The calendar and mail collaborators sit behind
// traits and are optional at runtime.

pub mod calendar;
pub mod handlers;
pub mod meet_link;
pub mod notify;
