mod appointment;
mod notification;
mod state;
mod user;

pub use appointment::{Appointment, AppointmentForCancellation, AppointmentListRow};
pub use notification::Notification;
pub use state::AppState;
pub use user::{Avatar, UserWithAvatar, is_provider, user_name};
