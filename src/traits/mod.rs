pub mod vision_api;
