pub mod home_controller;
pub mod user_controller;
pub mod order_controller;
pub mod api_controller;
