pub mod uploads;

pub use uploads::configure_upload_routes;
