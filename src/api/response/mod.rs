pub mod get_layout;
pub mod get_summary;
pub mod get_systems;
pub mod login;
pub mod view;
