pub mod class_collector;
pub mod html_sink;
