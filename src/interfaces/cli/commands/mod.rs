//! CLI command implementations

mod config_gen;
mod content;
mod helpers;
mod location;
mod mosques;
mod prayer;
mod remind;

pub use config_gen::config_generate;
pub use content::{random_hadith, show_adkar, show_quran};
pub use location::{locate, search_cities};
pub use mosques::{show_mosques, show_route};
pub use prayer::{next_prayer, prayer_times, show_timezone, weekly_times};
pub use remind::run_reminders;
